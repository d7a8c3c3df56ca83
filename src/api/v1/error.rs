use crate::api::v1::handler::ApiResponse;
use crate::application_port::AuthError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err.clone(), err.to_string()));
        Ok(warp::reply::with_status(json, err.status()))
    } else {
        let json = warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                code: ApiErrorCode::InternalError,
                message: format!("Unhandled error: {:?}", err),
            }),
        });
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Token is expired")]
    TokenExpired,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token has been revoked")]
    TokenRevoked,
    #[error("Session not found")]
    SessionNotFound,
    /// One code for cross-tenant and missing-claim denials: the response
    /// must not reveal whether the other tenant exists.
    #[error("Access to this tenant is forbidden")]
    TenantForbidden,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::TokenExpired
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::TokenRevoked
            | ApiErrorCode::SessionNotFound => StatusCode::UNAUTHORIZED,
            ApiErrorCode::TenantForbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::TokenExpired => ApiErrorCode::TokenExpired,
            AuthError::TokenMalformed | AuthError::WrongTokenKind => ApiErrorCode::InvalidToken,
            AuthError::TokenRevoked => ApiErrorCode::TokenRevoked,
            AuthError::SessionNotFound => ApiErrorCode::SessionNotFound,
            AuthError::CrossTenantAccess | AuthError::MissingTenantClaim => {
                ApiErrorCode::TenantForbidden
            }
            AuthError::Store(e) | AuthError::Internal(e) => ApiErrorCode::internal(e),
        }
    }
}
