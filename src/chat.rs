//! HTTP surface of the assistant: a static page and a form-post endpoint.

use crate::llm::{ChatMessage, ChatModel, SamplingParams};
use axum::{
    extract::{rejection::FormRejection, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const SYSTEM_PROMPT: &str = "You are MedicalBot, a helpful medical information assistant. \
Answer concisely, cite common symptoms/causes/next steps when appropriate, \
and add: 'This is general information, not medical advice.'";

pub const EMPTY_INPUT_REPLY: &str = "Please type something.";

pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn’t reach the medical model right now. Please try again in a moment.";

const CHAT_PAGE: &str = include_str!("../templates/chat.html");

#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn ChatModel>,
    pub sampling: SamplingParams,
}

impl AppState {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self {
            llm,
            sampling: SamplingParams::default(),
        }
    }
}

/// First `msg` value of a form body; later duplicates are ignored.
fn first_msg(pairs: Vec<(String, String)>) -> String {
    pairs
        .into_iter()
        .find(|(key, _)| key == "msg")
        .map(|(_, value)| value)
        .unwrap_or_default()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/get", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn home() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// Always answers 200 with plain text; failures become the fallback reply.
async fn chat(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> impl IntoResponse {
    let msg = match form {
        Ok(Form(pairs)) => first_msg(pairs),
        Err(rejection) => {
            tracing::debug!("unreadable chat form treated as empty: {}", rejection);
            String::new()
        }
    };
    let reply = answer(&state, msg.trim()).await;
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], reply)
}

pub async fn answer(state: &AppState, msg: &str) -> String {
    if msg.is_empty() {
        return EMPTY_INPUT_REPLY.to_string();
    }

    let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(msg)];
    match state.llm.complete(&messages, &state.sampling).await {
        Ok(text) => text.trim().to_string(),
        Err(e) if e.is_provider() => {
            tracing::error!("LLM call failed: {}", e);
            FALLBACK_REPLY.to_string()
        }
        Err(e) => {
            tracing::error!("chat model is misconfigured: {}", e);
            FALLBACK_REPLY.to_string()
        }
    }
}
