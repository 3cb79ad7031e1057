use crate::error::{AppError, Result};
use crate::model::DELETE_WITH_HEADER;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use burrow_core::{CreateParams, Credential, RegistryError, Token};

/// Parses a token taken from the request path. Anything that could never
/// have been registered is reported as unknown.
fn path_token(raw: String) -> Result<Token> {
    Token::new(raw.clone()).map_err(|_| AppError::Registry(RegistryError::NotFound(raw)))
}

async fn create(state: AppState, token: Option<String>, body: String) -> Result<Response> {
    let params = CreateParams {
        target: body.trim().to_string(),
        requested_token: token,
    };
    let record = state.registry.create(params).await?;

    Ok((
        StatusCode::FOUND,
        [(DELETE_WITH_HEADER, record.credential.as_str().to_string())],
        record.token.to_url(&state.public_url),
    )
        .into_response())
}

pub async fn create_generated_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Response> {
    create(state, None, body).await
}

pub async fn create_requested_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
    body: String,
) -> Result<Response> {
    create(state, Some(token), body).await
}

pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    let token = path_token(token)?;
    let record = state.registry.resolve(&token).await?;
    Ok(Redirect::permanent(&record.target))
}

pub async fn delete_link_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
    body: String,
) -> Result<StatusCode> {
    let credential = body.trim();
    if credential.is_empty() {
        return Err(AppError::BadRequest(
            "Must include deletion key in DELETE body.\n",
        ));
    }

    let token = path_token(token)?;
    state
        .registry
        .delete(&token, &Credential::new(credential))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
