//! In-memory transport and fixtures shared by unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::token_store::TokenStore;
use crate::transport::{HttpRequest, HttpResponse, Transport};

pub(crate) const BASE_URL: &str = "http://api.test";

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, ClientError>>;

/// Transport that answers from a closure and records every request.
///
/// Each exchange yields to the scheduler once before answering so that
/// concurrently joined requests interleave. `hold` parks the next request to a
/// path until the returned sender fires.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    log: RefCell<Vec<HttpRequest>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
}

impl ScriptedTransport {
    pub fn new(handler: impl Fn(&HttpRequest) -> Result<HttpResponse, ClientError> + 'static) -> Rc<Self> {
        Rc::new(Self { handler: Box::new(handler), log: RefCell::new(Vec::new()), gates: RefCell::new(HashMap::new()) })
    }

    pub fn hold(&self, path: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(path.to_owned(), rx);
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.borrow().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.log.borrow().iter().filter(|r| path_of(r) == path).count()
    }

    pub fn bearers_for(&self, path: &str) -> Vec<Option<String>> {
        self.log
            .borrow()
            .iter()
            .filter(|r| path_of(r) == path)
            .map(|r| r.bearer.clone())
            .collect()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.log.borrow_mut().push(request.clone());
        tokio::task::yield_now().await;
        let gate = self.gates.borrow_mut().remove(path_of(&request));
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        (self.handler)(&request)
    }
}

pub(crate) fn path_of(request: &HttpRequest) -> &str {
    request.url.strip_prefix(BASE_URL).unwrap_or(&request.url)
}

pub(crate) fn client_for(transport: &Rc<ScriptedTransport>) -> ApiClient<Rc<ScriptedTransport>> {
    ApiClient::new(ClientConfig::new(BASE_URL).unwrap(), TokenStore::in_memory(), Rc::clone(transport))
}

pub(crate) fn respond(status: u16, body: &Value) -> Result<HttpResponse, ClientError> {
    Ok(HttpResponse { status, body: body.to_string() })
}

pub(crate) fn unauthorized() -> Result<HttpResponse, ClientError> {
    respond(401, &json!({ "message": "Unauthorized" }))
}

pub(crate) fn user_json(id: &str) -> Value {
    json!({ "id": id, "name": "Alice", "email": "alice@example.com" })
}

pub(crate) fn not_found() -> Result<HttpResponse, ClientError> {
    respond(404, &json!({ "message": "not found" }))
}
