use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::backend::HttpChatBackend;
use crate::config::AppConfig;
use crate::ui::{WidgetUpdate, WidgetView, html_shell, render_widget, sse_event};
use crate::widget::{ChatWidgetController, Message, UiEvent, WidgetError, WidgetStore};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    info!(
        name: "backend.config.loaded",
        url = %config.backend.url,
        timeout_ms = ?config.backend.request_timeout_ms,
        "Chat backend configured"
    );

    let backend = HttpChatBackend::new(
        config.backend.url.clone(),
        config.backend.request_timeout(),
    )?;
    let widgets = WidgetStore::new(config.widget.settings(), Arc::new(backend));
    widgets.spawn_idle_sweeper(config.widget.idle_timeout());

    let state = AppState {
        widgets,
        config: Arc::clone(&config),
    };

    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/", get(index_handler))
        .route("/widget/{id}", get(widget_fragment).delete(delete_widget))
        .route("/widget/{id}/events", post(widget_event))
        .route("/widget/{id}/stream", get(widget_stream))
        .route("/widget/{id}/messages", get(widget_messages))
        .nest_service("/static", static_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Page with a freshly loaded widget.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let widget = state.widgets.create();
    Html(html_shell("Chat", &widget_html(&widget)))
}

/// GET /widget/:id - Widget fragment for the current state.
async fn widget_fragment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let widget = find_widget(&state, &id)?;
    Ok(Html(widget_html(&widget)))
}

fn widget_html(widget: &ChatWidgetController) -> String {
    render_widget(widget.id(), &widget.view(), &widget.transcript())
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /widget/:id/events - Apply a browser event.
async fn widget_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(event): Json<UiEvent>,
) -> Result<Json<WidgetView>, StatusCode> {
    let widget = find_widget(&state, &id)?;
    tracing::debug!(widget_id = %id, event = ?event, "Widget event received");

    match widget.dispatch(event.into()) {
        Ok(view) => Ok(Json(view)),
        Err(WidgetError::SubmissionIgnored(reason)) => {
            tracing::debug!(widget_id = %id, reason = %reason, "Submission ignored");
            Ok(Json(widget.view()))
        }
        Err(e) => {
            tracing::warn!(widget_id = %id, error = %e, "Widget event failed");
            Ok(Json(widget.view()))
        }
    }
}

/// GET /widget/:id/stream - SSE stream of widget updates.
async fn widget_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, StatusCode> {
    let widget = find_widget(&state, &id)?;
    let mut updates = widget.subscribe();
    let initial = WidgetUpdate::State(widget.view());

    tracing::info!(widget_id = %id, "Starting widget update stream");

    let sse_stream = async_stream::stream! {
        yield Ok::<String, std::convert::Infallible>(sse_event(&initial));
        loop {
            match updates.recv().await {
                Ok(update) => yield Ok(sse_event(&update)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(widget_id = %id, skipped, "Update stream lagged");
                    yield Ok(sse_event(&WidgetUpdate::State(widget.view())));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Ok(build_sse_response(Body::from_stream(sse_stream)))
}

/// GET /widget/:id/messages - Transcript in render order.
async fn widget_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    let widget = find_widget(&state, &id)?;
    Ok(Json(widget.transcript()))
}

/// DELETE /widget/:id - Drop a widget.
async fn delete_widget(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.widgets.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn find_widget(state: &AppState, id: &str) -> Result<Arc<ChatWidgetController>, StatusCode> {
    state.widgets.get(id).ok_or_else(|| {
        tracing::debug!(widget_id = %id, "Widget not found");
        StatusCode::NOT_FOUND
    })
}

fn build_sse_response(body: Body) -> Response {
    let mut resp = body.into_response();
    let h = resp.headers_mut();
    h.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    h.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    h.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    h.insert("X-Accel-Buffering", HeaderValue::from_static("no"));
    resp
}
