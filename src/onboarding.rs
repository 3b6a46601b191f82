//! Learning-assistant onboarding questionnaire.
//!
//! Four steps (year of study, major, favourite topics, topics to explore),
//! each gated on its own answer, submitted once through the authenticated
//! client.

#[cfg(test)]
#[path = "onboarding_test.rs"]
mod onboarding_test;

use serde::Serialize;

use crate::client::RequestOptions;
use crate::error::ClientError;
use crate::session::SessionManager;
use crate::transport::Transport;

pub const ONBOARDING_ENDPOINT: &str = "/users/onboarding";
pub const TOTAL_STEPS: u8 = 4;

/// In-progress answers, as typed into the form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OnboardingDraft {
    pub year: String,
    pub major: String,
    pub favorite_topics: Vec<String>,
    pub interested_topics: Vec<String>,
}

/// `POST /users/onboarding` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub number_of_years: u32,
    pub major: String,
    pub favorite_topics: Vec<String>,
    pub interested_topics: Vec<String>,
}

impl OnboardingDraft {
    /// Whether `step` (1-based) has enough input to move on.
    pub fn can_proceed(&self, step: u8) -> bool {
        match step {
            1 => !self.year.trim().is_empty(),
            2 => !self.major.trim().is_empty(),
            3 => !self.favorite_topics.is_empty(),
            4 => !self.interested_topics.is_empty(),
            _ => false,
        }
    }

    /// Add `topic` to the favourites, or remove it if already present.
    pub fn toggle_favorite(&mut self, topic: &str) {
        toggle(&mut self.favorite_topics, topic);
    }

    pub fn toggle_interest(&mut self, topic: &str) {
        toggle(&mut self.interested_topics, topic);
    }

    /// Validate every step and build the request body.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message naming the first incomplete answer.
    pub fn to_request(&self) -> Result<OnboardingRequest, &'static str> {
        if !(1..=TOTAL_STEPS).all(|step| self.can_proceed(step)) {
            return Err("Please answer every step before finishing.");
        }
        let number_of_years = self
            .year
            .trim()
            .parse::<u32>()
            .map_err(|_| "Year of study must be a whole number.")?;
        Ok(OnboardingRequest {
            number_of_years,
            major: self.major.trim().to_owned(),
            favorite_topics: self.favorite_topics.clone(),
            interested_topics: self.interested_topics.clone(),
        })
    }
}

fn toggle(topics: &mut Vec<String>, topic: &str) {
    if let Some(pos) = topics.iter().position(|t| t == topic) {
        topics.remove(pos);
    } else {
        topics.push(topic.to_owned());
    }
}

/// Submit the questionnaire and mark the signed-in user as onboarded.
///
/// # Errors
///
/// Returns the backend or transport error; the user record is unchanged on
/// failure.
pub async fn submit<T: Transport + 'static>(
    session: &SessionManager<T>,
    request: &OnboardingRequest,
) -> Result<(), ClientError> {
    session
        .client()
        .post(ONBOARDING_ENDPOINT, request, RequestOptions::default())
        .await?;
    session.update_user(|user| user.onboarding = true);
    tracing::info!("onboarding completed");
    Ok(())
}
