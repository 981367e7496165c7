use crate::auth::{self, Guard, Session};
use crate::dates::text_to_date_input_value;
use crate::forms::{ProductForm, ProductInput};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, info, warn};

async fn index() -> &'static str {
    "storefront"
}

async fn storefront(Path(slug): Path<String>) -> String {
    format!("storefront: {slug}")
}

async fn sign_in() -> &'static str {
    "sign in"
}

async fn webhook(Path(source): Path<String>, Json(body): Json<Value>) -> StatusCode {
    let event_type = body.get("type").and_then(|v| v.as_str());
    info!(source = %source, event_type = ?event_type, "Webhook received");
    StatusCode::ACCEPTED
}

async fn dashboard(Extension(session): Extension<Session>) -> String {
    format!("dashboard for {}", session.user_id)
}

/// Signed in is enough here; merchant setup is what this page is for.
async fn onboarding(Extension(session): Extension<Session>) -> String {
    format!("onboarding for {}", session.user_id)
}

#[derive(Debug, Deserialize)]
struct NormalizeParams {
    value: Option<String>,
}

async fn normalize_date(Query(params): Query<NormalizeParams>) -> Json<Value> {
    Json(json!({ "date": text_to_date_input_value(params.value.as_deref()) }))
}

async fn preview_product(Json(form): Json<ProductForm>) -> Response {
    match ProductInput::try_from(form) {
        Ok(input) => {
            debug!(
                name = %input.name,
                attributes = ?input.attributes.to_column(),
                "Product form accepted"
            );
            let form = ProductForm::from_input(&input);
            Json(json!({ "product": input, "form": form })).into_response()
        }
        Err(err) => {
            warn!(error = %err, "Rejected product form");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

pub fn router(guard: Arc<Guard>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/s/{slug}", get(storefront))
        .route("/sign-in", get(sign_in))
        .route("/api/webhooks/{source}", post(webhook))
        .route("/dashboard", get(dashboard))
        .route("/onboarding", get(onboarding))
        .route("/api/dates/normalize", get(normalize_date))
        .route("/api/products/preview", post(preview_product))
        .layer(middleware::from_fn_with_state(guard, auth::require_session))
}

/// Serve the app until `running` is cleared. Blocks the calling thread.
pub fn start(port: u16, guard: Guard, running: Arc<AtomicBool>) -> Result<()> {
    let app = router(Arc::new(guard));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime for web server")?;

    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("Web server failed to bind port {port}"))?;

        info!(port, "Web server listening");

        let shutdown = async move {
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
            info!("Web server shutting down");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Web server stopped unexpectedly")
    })
}
