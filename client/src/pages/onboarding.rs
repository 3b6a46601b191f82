//! Four-step study-profile questionnaire.
//!
//! Each step gates "Next" on its own answer; the last step submits through
//! the authenticated client and returns home.

#[cfg(test)]
#[path = "onboarding_test.rs"]
mod onboarding_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use vibecoders::guard::DEFAULT_LANDING;
use vibecoders::onboarding::{self, OnboardingDraft, TOTAL_STEPS};

use crate::app::Session;
use crate::util::auth::replace_history;

const YEAR_OPTIONS: &[(&str, &str)] = &[("1", "Year 1"), ("2", "Year 2"), ("3", "Year 3"), ("4", "Year 4"), ("5", "Year 5+")];

const MAJOR_OPTIONS: &[&str] = &[
    "Computer Science",
    "Software Engineering",
    "Economics",
    "Business Administration",
    "Accounting",
    "Marketing",
    "Law",
    "Medicine",
];

const FAVORITE_TOPIC_OPTIONS: &[&str] = &[
    "Programming",
    "Design",
    "Marketing",
    "Business",
    "Data Science",
    "Artificial Intelligence",
    "Cybersecurity",
    "Web Development",
    "App Development",
    "Game Development",
    "Blockchain",
    "Cloud Computing",
];

const INTEREST_TOPIC_OPTIONS: &[&str] = &[
    "Startups",
    "Investing",
    "Technology",
    "Art",
    "Music",
    "Sports",
    "Travel",
    "Cooking",
    "Books",
    "Movies",
    "Photography",
    "Fitness",
    "Meditation",
    "Personal Finance",
    "Self Improvement",
    "Languages",
];

/// Progress bar fill for 1-based `step`.
fn progress_percent(step: u8) -> u8 {
    let step = step.clamp(1, TOTAL_STEPS);
    u8::try_from(u16::from(step) * 100 / u16::from(TOTAL_STEPS)).unwrap_or(100)
}

fn step_title(step: u8) -> &'static str {
    match step {
        1 => "Which year are you in?",
        2 => "What is your major?",
        3 => "Which topics do you enjoy most?",
        _ => "What else would you like to explore?",
    }
}

#[component]
pub fn OnboardingPage() -> impl IntoView {
    let session = expect_context::<Session>();
    let navigate = use_navigate();

    let step = RwSignal::new(1_u8);
    let draft = RwSignal::new(OnboardingDraft::default());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let can_proceed = move || draft.with(|d| d.can_proceed(step.get()));

    let on_next = move |_| {
        if can_proceed() && step.get() < TOTAL_STEPS {
            step.update(|s| *s += 1);
        }
    };
    let on_back = move |_| {
        if step.get() > 1 {
            step.update(|s| *s -= 1);
        }
    };
    let on_finish = move |_| {
        if busy.get() {
            return;
        }
        let request = match draft.with(OnboardingDraft::to_request) {
            Ok(request) => request,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match onboarding::submit(&session.get(), &request).await {
                Ok(()) => navigate(DEFAULT_LANDING, replace_history()),
                Err(e) => {
                    info.set(e.user_message());
                    busy.set(false);
                }
            }
        });
    };

    let choice = move |label: &'static str, selected: Signal<bool>, on_pick: Callback<()>| {
        view! {
            <button
                type="button"
                class="onboarding-choice"
                class:onboarding-choice--selected=move || selected.get()
                on:click=move |_| on_pick.run(())
            >
                {label}
            </button>
        }
    };

    let step_body = move || match step.get() {
        1 => YEAR_OPTIONS
            .iter()
            .map(|&(id, label)| {
                choice(
                    label,
                    Signal::derive(move || draft.with(|d| d.year == id)),
                    Callback::new(move |()| draft.update(|d| d.year = id.to_owned())),
                )
            })
            .collect_view()
            .into_any(),
        2 => view! {
            <input
                class="onboarding-input"
                type="text"
                placeholder="Type or pick your major"
                prop:value=move || draft.with(|d| d.major.clone())
                on:input=move |ev| draft.update(|d| d.major = event_target_value(&ev))
            />
            {MAJOR_OPTIONS
                .iter()
                .map(|&major| {
                    choice(
                        major,
                        Signal::derive(move || draft.with(|d| d.major == major)),
                        Callback::new(move |()| draft.update(|d| d.major = major.to_owned())),
                    )
                })
                .collect_view()}
        }
        .into_any(),
        3 => FAVORITE_TOPIC_OPTIONS
            .iter()
            .map(|&topic| {
                choice(
                    topic,
                    Signal::derive(move || draft.with(|d| d.favorite_topics.iter().any(|t| t == topic))),
                    Callback::new(move |()| draft.update(|d| d.toggle_favorite(topic))),
                )
            })
            .collect_view()
            .into_any(),
        _ => INTEREST_TOPIC_OPTIONS
            .iter()
            .map(|&topic| {
                choice(
                    topic,
                    Signal::derive(move || draft.with(|d| d.interested_topics.iter().any(|t| t == topic))),
                    Callback::new(move |()| draft.update(|d| d.toggle_interest(topic))),
                )
            })
            .collect_view()
            .into_any(),
    };

    view! {
        <div class="onboarding-page">
            <div class="onboarding-progress">
                <div class="onboarding-progress__bar" style:width=move || format!("{}%", progress_percent(step.get()))></div>
            </div>
            <p class="onboarding-step">{move || format!("Step {} of {TOTAL_STEPS}", step.get())}</p>
            <h2>{move || step_title(step.get())}</h2>
            <div class="onboarding-options">{step_body}</div>
            <div class="onboarding-nav">
                <button type="button" on:click=on_back disabled=move || step.get() == 1>"Back"</button>
                <button
                    type="button"
                    hidden=move || step.get() == TOTAL_STEPS
                    on:click=on_next
                    disabled=move || !can_proceed()
                >
                    "Next"
                </button>
                <button
                    type="button"
                    hidden=move || step.get() < TOTAL_STEPS
                    on:click=on_finish
                    disabled=move || busy.get() || !can_proceed()
                >
                    "Finish"
                </button>
            </div>
            <Show when=move || !info.get().is_empty()>
                <p class="onboarding-message">{move || info.get()}</p>
            </Show>
        </div>
    }
}
