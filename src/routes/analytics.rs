use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    dto::analytics_dto::NeedingActionQuery,
    error::{Error, Result},
    middleware::auth::{AdminContext, RecruiterContext, RequestContext, Role},
    services::analytics_service::Scope,
    AppState,
};

/// Admins see everything, recruiters their owned and shared jobs.
async fn scope_for(state: &AppState, ctx: &RequestContext) -> Result<Scope> {
    match ctx.role {
        Role::Admin => Ok(Scope::All),
        Role::Recruiter => {
            let recruiter = state
                .user_service
                .recruiter_for_user(ctx.user.id)
                .await?
                .ok_or_else(|| Error::Forbidden("Recruiter profile not found".into()))?;
            Ok(Scope::Recruiter(recruiter.id))
        }
        Role::Candidate => Err(Error::Forbidden("Analytics are not available to candidates".into())),
    }
}

pub async fn applications_per_job(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> Result<impl IntoResponse> {
    Ok(Json(
        state
            .analytics_service
            .applications_per_job(Scope::All)
            .await?,
    ))
}

pub async fn recruiter_applications_per_job(
    State(state): State<AppState>,
    ctx: RecruiterContext,
) -> Result<impl IntoResponse> {
    Ok(Json(
        state
            .analytics_service
            .applications_per_job(Scope::Recruiter(ctx.recruiter_id()))
            .await?,
    ))
}

#[axum::debug_handler]
pub async fn application_status_summary(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let scope = scope_for(&state, &ctx).await?;
    Ok(Json(state.analytics_service.status_summary(scope).await?))
}

pub async fn upcoming_interviews(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let scope = scope_for(&state, &ctx).await?;
    Ok(Json(
        state.analytics_service.upcoming_interviews(scope).await?,
    ))
}

pub async fn recent_resumes(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> Result<impl IntoResponse> {
    Ok(Json(state.analytics_service.recent_resumes().await?))
}

pub async fn job_performance(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let scope = scope_for(&state, &ctx).await?;
    Ok(Json(state.analytics_service.job_performance(scope).await?))
}

pub async fn candidates_needing_action(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<NeedingActionQuery>,
) -> Result<impl IntoResponse> {
    let scope = scope_for(&state, &ctx).await?;
    Ok(Json(
        state
            .analytics_service
            .candidates_needing_action(scope, query.older_than_days)
            .await?,
    ))
}
