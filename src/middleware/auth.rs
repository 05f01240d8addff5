//! Bearer-token authentication and per-request role contexts.
//!
//! Tokens are minted by the external identity gateway (HS256). The `sub`
//! claim identifies the local user row, the `role` claim selects which
//! context extractor a handler may use.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{Recruiter, User};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Candidate,
    Recruiter,
    Admin,
}

impl Role {
    pub fn from_claim(raw: Option<&str>) -> Option<Self> {
        match raw?.trim().to_ascii_lowercase().as_str() {
            "candidate" | "user" => Some(Role::Candidate),
            "recruiter" => Some(Role::Recruiter),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }
}

impl Claims {
    pub fn role(&self) -> Result<Role> {
        Role::from_claim(self.role.as_deref())
            .ok_or_else(|| Error::Forbidden("Unsupported role".into()))
    }
}

pub fn decode_token(token: &str) -> Result<Claims> {
    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    if let Some(issuer) = &config.jwt_issuer {
        validation.set_issuer(&[issuer]);
    }
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        Error::Unauthorized("Invalid or expired token".into())
    })
}

pub fn authenticate(headers: &HeaderMap) -> Result<Claims> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("Missing authorization header".into()))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| Error::Unauthorized("Malformed authorization header".into()))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("Unsupported authorization scheme".into()))?;
    decode_token(token.trim())
}

/// Rejects unauthenticated requests for a whole route group and stashes the claims.
pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match authenticate(req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Verified token claims; no local user is required.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(AuthClaims(claims.clone()));
        }
        authenticate(&parts.headers).map(AuthClaims)
    }
}

/// The registered user behind the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: User,
    pub role: Role,
}

impl RequestContext {
    async fn load(parts: &mut Parts, state: &AppState, required: Option<Role>) -> Result<Self> {
        let AuthClaims(claims) = AuthClaims::from_request_parts(parts, state).await?;
        let role = claims.role()?;
        if let Some(required) = required {
            if role != required {
                return Err(Error::Forbidden(format!(
                    "This action requires the {} role",
                    required.as_str()
                )));
            }
        }
        let user = state
            .user_service
            .find_by_sub(&claims.sub)
            .await?
            .ok_or_else(|| Error::Unauthorized("User not found".into()))?;
        Ok(Self { user, role })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        Self::load(parts, state, None).await
    }
}

#[derive(Debug, Clone)]
pub struct CandidateContext {
    pub user: User,
    pub candidate_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for CandidateContext {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let ctx = RequestContext::load(parts, state, Some(Role::Candidate)).await?;
        let profile = state
            .user_service
            .ensure_candidate_profile(ctx.user.id)
            .await?;
        Ok(Self {
            user: ctx.user,
            candidate_id: profile.id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecruiterContext {
    pub user: User,
    pub recruiter: Recruiter,
}

impl RecruiterContext {
    pub fn recruiter_id(&self) -> Uuid {
        self.recruiter.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RecruiterContext {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let ctx = RequestContext::load(parts, state, Some(Role::Recruiter)).await?;
        let recruiter = state
            .user_service
            .recruiter_for_user(ctx.user.id)
            .await?
            .ok_or_else(|| Error::Forbidden("Recruiter profile not found".into()))?;
        Ok(Self {
            user: ctx.user,
            recruiter,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminContext {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let ctx = RequestContext::load(parts, state, Some(Role::Admin)).await?;
        Ok(Self { user: ctx.user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_with_legacy_alias() {
        assert_eq!(Role::from_claim(Some("user")), Some(Role::Candidate));
        assert_eq!(Role::from_claim(Some(" Recruiter ")), Some(Role::Recruiter));
        assert_eq!(Role::from_claim(Some("ADMIN")), Some(Role::Admin));
        assert_eq!(Role::from_claim(Some("hr")), None);
        assert_eq!(Role::from_claim(None), None);
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let headers = HeaderMap::new();
        assert!(matches!(authenticate(&headers), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(matches!(authenticate(&headers), Err(Error::Unauthorized(_))));
    }
}
