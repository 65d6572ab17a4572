//! Query-to-reply flow
//!
//! A query runs in three steps so the event loop can keep rendering while
//! the network calls are in flight:
//!
//! 1. [`submit_query`] records the user message and enters the waiting state.
//! 2. [`run_sequence`] performs search then details and always yields a reply
//!    text (errors are already converted to their user-facing message).
//! 3. [`complete`] appends the bot reply and leaves the waiting state.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::error::ChatError;
use crate::recipes::{RecipeDetail, RecipeService};
use crate::state::{ChatMessage, SessionState};

const NO_INSTRUCTIONS: &str = "No instructions available.";

/// Record a user query. Returns the query text to run, or `None` when the
/// input is blank or a sequence is already in flight.
pub fn submit_query(state: &mut SessionState, raw_text: &str) -> Option<String> {
    if raw_text.trim().is_empty() || state.is_waiting() {
        return None;
    }

    let query = raw_text.to_string();
    state.push(ChatMessage::user(query.clone()));
    state.clear_input();
    state.set_waiting(true);
    Some(query)
}

/// Search for one recipe, fetch its details and render the reply
pub async fn run_sequence<S: RecipeService + ?Sized>(service: &S, query: &str) -> String {
    match fetch_reply(service, query).await {
        Ok(reply) => reply,
        Err(err) => {
            match &err {
                ChatError::NoResults => info!(query, "no recipes found"),
                ChatError::Transport(cause) => error!(query, "recipe lookup failed: {cause:#}"),
            }
            err.to_string()
        }
    }
}

async fn fetch_reply<S: RecipeService + ?Sized>(service: &S, query: &str) -> Result<String, ChatError> {
    let results = service.search(query, 1).await.map_err(ChatError::Transport)?;
    let first = results.first().ok_or(ChatError::NoResults)?;
    debug!(id = first.id, title = first.title.as_deref().unwrap_or("?"), "using first search hit");

    let detail = service.details(first.id).await.map_err(ChatError::Transport)?;
    Ok(format_reply(&detail))
}

/// Finish the in-flight sequence. Safe to call on every exit path.
pub fn complete(state: &mut SessionState, reply: String) {
    if !state.is_waiting() {
        warn!("completing a query while idle");
    }
    state.push(ChatMessage::bot(reply));
    state.set_waiting(false);
}

pub fn format_reply(detail: &RecipeDetail) -> String {
    let instructions = detail
        .instructions
        .as_deref()
        .filter(|text| !text.is_empty())
        .map(strip_markup)
        .unwrap_or_else(|| NO_INSTRUCTIONS.to_string());

    format!(
        "🍽️ {}\n\n🕒 Ready in: {} minutes\n👥 Servings: {}\n\n📝 Instructions:\n{}",
        detail.title, detail.ready_in_minutes, detail.servings, instructions
    )
}

/// Remove every `<...>` tag, keeping the text between them
pub fn strip_markup(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));
    tag.replace_all(text, "").into_owned()
}
