use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    dto::auth_dto::RegisterPayload,
    error::{Error, Result},
    middleware::auth::{AuthClaims, RequestContext, Role},
    AppState,
};

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "User registered", body = MeResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let role = claims.role()?;
    let me = state.user_service.register(&claims.sub, role, payload).await?;
    Ok((StatusCode::CREATED, Json(me)))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not registered")
    )
)]
#[axum::debug_handler]
pub async fn me(State(state): State<AppState>, ctx: RequestContext) -> Result<impl IntoResponse> {
    Ok(Json(state.user_service.me(ctx.user).await?))
}

pub async fn list_recruiters(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    if ctx.role == Role::Candidate {
        return Err(Error::Forbidden("Recruiter or admin role required".into()));
    }
    Ok(Json(state.user_service.list_recruiters().await?))
}
