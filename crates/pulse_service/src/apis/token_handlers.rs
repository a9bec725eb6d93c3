use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    models::tokens::{Token, TokenDetail},
    utils::errors::{app_error::AppError, error_payload::ErrorPayload},
    AppState,
};

use super::api_models::{
    query::TokensQuery, request::CreateTokenRequest, response::TokensPageResponse,
};

pub const TAG: &str = "tokens";

/// List tokens with tab filter, search, multi-key sort and pagination
#[utoipa::path(
    get,
    tag = TAG,
    path = "/",
    operation_id = "listTokens",
    responses(
        (status = 200, description = "One page of tokens", body = TokensPageResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(TokensQuery)
)]
pub(super) async fn get_tokens(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<TokensQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<TokensPageResponse>), AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = app_state.token_service.list_tokens(query).await?;
    Ok((StatusCode::OK, Json(page.into())))
}

/// Get one token with a synthesized 24h price history
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{id}",
    operation_id = "getToken",
    responses(
        (status = 200, description = "Token details", body = TokenDetail),
        (status = 404, description = "Token not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = String, Path, description = "Token id")
    )
)]
pub(super) async fn get_token(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TokenDetail>), AppError> {
    let detail = app_state.token_service.get_token_detail(&id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

/// Create a token
#[utoipa::path(
    post,
    tag = TAG,
    path = "/",
    operation_id = "createToken",
    responses(
        (status = 201, description = "Token created", body = Token),
        (status = 400, description = "Invalid token", body = ErrorPayload),
        (status = 409, description = "Token id already exists", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    request_body(content = CreateTokenRequest, content_type = "application/json")
)]
pub(super) async fn create_token(
    State(app_state): State<Arc<AppState>>,
    body: Result<Json<CreateTokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Token>), AppError> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let token = app_state.token_service.create_token(body).await?;
    Ok((StatusCode::CREATED, Json(token)))
}
