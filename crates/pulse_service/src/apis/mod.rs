use std::sync::Arc;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_scalar::{Scalar, Servable};

use crate::AppState;

pub mod api_models;
pub mod token_handlers;
pub mod ws_handlers;

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "tokens", description = "Token discovery API")
    )
)]
pub struct ApiDoc;

pub fn setup_routes() -> Router<Arc<AppState>> {
    let api_doc = ApiDoc::openapi();

    let token_router = OpenApiRouter::new()
        .routes(routes!(
            token_handlers::get_tokens,
            token_handlers::create_token
        ))
        .routes(routes!(token_handlers::get_token));

    let token_router = OpenApiRouter::with_openapi(api_doc).nest("/tokens", token_router);

    let (api_router, api_openapi) = OpenApiRouter::new()
        .nest("/api", token_router)
        .split_for_parts();

    Router::new()
        .merge(Scalar::with_url("/docs", api_openapi))
        .merge(api_router)
        .route("/ws", get(ws_handlers::price_updates))
}
