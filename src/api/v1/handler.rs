use super::error::*;
use crate::application_impl::TenantGuard;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::SessionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Credential verification happens upstream; by the time this endpoint is
/// called the subject has already been authenticated.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub subject_id: String,
    pub tenant_id: String,
    pub auth_method: Option<String>,
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

pub async fn login(
    body: LoginRequest,
    authority: Arc<dyn SessionAuthority>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let metadata = SessionMetadata {
        auth_method: body.auth_method.unwrap_or_else(|| "password".to_string()),
        provider: None,
        extra: body.metadata.unwrap_or_default(),
    };
    let grant = authority
        .login(LoginInput {
            subject_id: SubjectId::new(body.subject_id),
            tenant_id: TenantId::new(body.tenant_id),
            metadata,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(grant)))
}

#[derive(Debug, Deserialize)]
pub struct OAuthCompleteRequest {
    pub provider: String,
    pub external_id: String,
    pub tenant_id: String,
    pub profile: Option<BTreeMap<String, serde_json::Value>>,
}

pub async fn oauth_complete(
    body: OAuthCompleteRequest,
    authority: Arc<dyn SessionAuthority>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let grant = authority
        .complete_oauth(OAuthUserInfo {
            provider: body.provider,
            external_id: body.external_id,
            tenant_id: TenantId::new(body.tenant_id),
            profile: body.profile.unwrap_or_default(),
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(grant)))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub session_id: SessionId,
    pub refresh_token: String,
}

pub async fn refresh(
    body: RefreshRequest,
    authority: Arc<dyn SessionAuthority>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pair = authority
        .rotate(&RefreshToken(body.refresh_token), body.session_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(pair)))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub deleted: bool,
}

pub async fn logout(
    body: LogoutRequest,
    authority: Arc<dyn SessionAuthority>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let deleted = authority
        .logout(body.session_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse { deleted })))
}

pub async fn introspect(
    token: AccessToken,
    authority: Arc<dyn SessionAuthority>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let claims = authority
        .validate(&token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(claims)))
}

/// Session listing without the token material; raw tokens never leave the
/// store through this endpoint.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub tenant_id: TenantId,
    pub auth_method: String,
    pub provider: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionSummary {
    fn from(session: Session) -> Self {
        SessionSummary {
            session_id: session.session_id,
            tenant_id: session.tenant_id,
            auth_method: session.metadata.auth_method,
            provider: session.metadata.provider,
            created_at: session.created_at,
            last_activity_at: session.last_activity_at,
            expires_at: session.expires_at,
        }
    }
}

/// The sample tenant-scoped resource: the caller's own sessions within one
/// tenant. Validation first, then the tenant guard; the guard has no
/// bypass.
pub async fn list_tenant_sessions(
    tenant_id: String,
    token: AccessToken,
    authority: Arc<dyn SessionAuthority>,
    tenant_guard: Arc<TenantGuard>,
    session_store: Arc<dyn SessionStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let claims = authority
        .validate(&token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let resource_tenant = TenantId::new(tenant_id);
    tenant_guard
        .authorize(&token, &resource_tenant)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let sessions = session_store
        .list_by_subject(&claims.subject_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let summaries: Vec<SessionSummary> = sessions
        .into_iter()
        .filter(|session| session.tenant_id == resource_tenant)
        .map(SessionSummary::from)
        .collect();

    Ok(warp::reply::json(&ApiResponse::ok(summaries)))
}
