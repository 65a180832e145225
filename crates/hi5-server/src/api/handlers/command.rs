use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::stream;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn, Instrument, Span};

use crate::domain::{help_text, Command, MessagePayload, SlashCommand};
use crate::error::{AppError, Result};
use crate::AppState;

/// Work left for the delivery phase after the request is acknowledged.
struct Invocation {
    command: Command,
    response_url: String,
    user_name: String,
}

/// Slash-command webhook.
///
/// Decoding, parsing and the token check happen before anything is sent; their
/// failures get their own responses. Past that point the handler commits a 200
/// right away and the delivery phase runs detached from the connection; it can
/// only report failures in the body text and in the logs.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    let body = body.map_err(|e| {
        warn!(error = %e, "failed to read request body");
        AppError::BadRequest(e.to_string())
    })?;

    let request = SlashCommand::decode(&body).map_err(|e| {
        warn!(error = %e, "failed to decode request body");
        AppError::from(e)
    })?;

    let command = Command::parse(&request.text).map_err(|e| {
        info!(user_name = %request.user_name, reason = %e, "rejected command");
        AppError::from(e)
    })?;

    if !state.config.verify_token(&request.token) {
        warn!(user_name = %request.user_name, "unauthorized request");
        return Err(AppError::Unauthorized);
    }

    let invocation = Invocation {
        command,
        response_url: request.response_url,
        user_name: request.user_name,
    };
    let delivery = deliver(state, invocation).instrument(Span::current());

    Ok(acknowledge(delivery))
}

/// Sends status and headers immediately. `delivery` runs on its own task so
/// that it finishes even if the caller hangs up; whatever it resolves to
/// becomes the body if the connection is still open.
fn acknowledge<F>(delivery: F) -> Response
where
    F: Future<Output = String> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        if tx.send(delivery.await).is_err() {
            debug!("caller disconnected before the inline reply was written");
        }
    });

    let body = stream::once(async move { Ok::<_, Infallible>(rx.await.unwrap_or_default()) });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response()
}

async fn deliver(state: Arc<AppState>, invocation: Invocation) -> String {
    match run(&state, &invocation).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, user_name = %invocation.user_name, "delivery failed");
            e.body_text()
        }
    }
}

async fn run(state: &AppState, invocation: &Invocation) -> Result<String> {
    let query = match &invocation.command {
        Command::Help => return Ok(help_text()),
        Command::Search(query) => query,
    };

    let businesses = state.search.search(query).await?;

    let payload = if businesses.is_empty() {
        info!(category = %query.category, location = %query.location, "no results found");
        MessagePayload::not_found(query)
    } else {
        MessagePayload::results(&invocation.user_name, query, &businesses)
    };

    state
        .publisher
        .publish(&invocation.response_url, &payload)
        .await?;

    Ok(String::new())
}
