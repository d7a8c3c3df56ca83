use super::error::*;
use super::handler;
use crate::domain_model::AccessToken;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.authority.clone()))
        .and_then(handler::login);

    let oauth_complete = warp::post()
        .and(warp::path("oauth"))
        .and(warp::path("complete"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.authority.clone()))
        .and_then(handler::oauth_complete);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.authority.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.authority.clone()))
        .and_then(handler::logout);

    let introspect = warp::get()
        .and(warp::path("introspect"))
        .and(warp::path::end())
        .and(with_bearer())
        .and(with(server.authority.clone()))
        .and_then(handler::introspect);

    let tenant_sessions = warp::get()
        .and(warp::path("tenants"))
        .and(warp::path::param::<String>())
        .and(warp::path("sessions"))
        .and(warp::path::end())
        .and(with_bearer())
        .and(with(server.authority.clone()))
        .and(with(server.tenant_guard.clone()))
        .and(with(server.session_store.clone()))
        .and_then(handler::list_tenant_sessions);

    login
        .or(oauth_complete)
        .or(refresh)
        .or(logout)
        .or(introspect)
        .or(tenant_sessions)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_bearer() -> impl Filter<Extract = (AccessToken,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(
        |header: String| async move {
            if let Some(token) = header.strip_prefix("Bearer ") {
                Ok(AccessToken(token.to_string()))
            } else {
                Err(reject::custom(ApiErrorCode::InvalidToken))
            }
        },
    )
}
