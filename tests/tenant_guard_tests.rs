//! Tenant isolation tests: same-tenant access passes, any mismatch is a
//! hard failure, and a token without a tenant claim is rejected outright.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use vestibule::application_impl::{JwtHs256Codec, TenantGuard, TokenCodecConfig};
use vestibule::application_port::{AuthError, TokenCodec};
use vestibule::domain_model::{AccessToken, SubjectId, TenantId};

const ACCESS_SECRET: &[u8] = b"test-access-secret";

fn codec() -> Arc<dyn TokenCodec> {
    Arc::new(JwtHs256Codec::new(TokenCodecConfig {
        issuer: "vestibule.test".to_string(),
        audience: "test-client".to_string(),
        access_ttl: chrono::Duration::seconds(900),
        refresh_ttl: chrono::Duration::seconds(604_800),
        leeway_secs: 0,
        access_secret: ACCESS_SECRET.to_vec(),
        refresh_secret: b"test-refresh-secret".to_vec(),
    }))
}

async fn token_for(codec: &Arc<dyn TokenCodec>, tenant: &str) -> AccessToken {
    let (token, _) = codec
        .issue_access_token(&SubjectId::new("u1"), &TenantId::new(tenant), None)
        .await
        .unwrap();
    token
}

#[tokio::test]
async fn same_tenant_access_is_authorized() {
    let codec = codec();
    let guard = TenantGuard::new(codec.clone());
    let token = token_for(&codec, "orgA").await;

    guard.authorize(&token, &TenantId::new("orgA")).await.unwrap();

    let tenant = guard.extract_tenant(&token).await.unwrap();
    assert_eq!(tenant, TenantId::new("orgA"));

    let ctx = guard.session_context(&token).await.unwrap();
    assert_eq!(ctx.tenant_id, TenantId::new("orgA"));
}

#[tokio::test]
async fn cross_tenant_access_is_always_blocked() {
    let codec = codec();
    let guard = TenantGuard::new(codec.clone());
    let token = token_for(&codec, "orgA").await;

    let err = guard
        .authorize(&token, &TenantId::new("orgB"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::CrossTenantAccess));
}

/// An upstream issuer minting tenantless tokens is a misconfiguration the
/// guard has to catch: such a token must not default to any tenant.
#[tokio::test]
async fn token_without_tenant_claim_is_rejected() {
    #[derive(Serialize)]
    struct BareClaims {
        sub: String,
        kind: String,
        exp: i64,
        iat: i64,
        iss: String,
        aud: String,
    }

    let now = chrono::Utc::now();
    let claims = BareClaims {
        sub: "u1".to_string(),
        kind: "access".to_string(),
        exp: (now + chrono::Duration::seconds(900)).timestamp(),
        iat: now.timestamp(),
        iss: "vestibule.test".to_string(),
        aud: "test-client".to_string(),
    };
    let raw = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(ACCESS_SECRET),
    )
    .unwrap();
    let token = AccessToken(raw);

    let codec = codec();
    let guard = TenantGuard::new(codec.clone());

    // The codec decodes it fine; it is the guard that refuses it.
    let decoded = codec.verify_access_token(&token).await.unwrap();
    assert!(decoded.tenant_id.is_none());

    let err = guard.extract_tenant(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::MissingTenantClaim));

    let err = guard
        .authorize(&token, &TenantId::new("orgA"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::MissingTenantClaim));
}

#[tokio::test]
async fn guard_propagates_verification_failures() {
    let codec = codec();
    let guard = TenantGuard::new(codec);

    let err = guard
        .authorize(&AccessToken("garbage".to_string()), &TenantId::new("orgA"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenMalformed));
}
