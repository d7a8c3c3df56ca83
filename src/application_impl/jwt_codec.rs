use crate::application_port::{AuthError, TokenClaims, TokenCodec};
use crate::domain_model::{AccessToken, RefreshToken, SubjectId, TenantId, TokenKind};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TokenCodecConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: chrono::Duration,
    pub refresh_ttl: chrono::Duration,
    /// Tolerated clock skew between issuer and verifier, in seconds.
    pub leeway_secs: u64,
    /// Distinct secrets per token kind, so a leaked access secret cannot
    /// forge refresh tokens.
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    /// Owning tenant. Optional on decode so a token minted without one
    /// surfaces as data for the guard to reject, not as a parse failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tid: Option<String>,
    kind: TokenKind,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    extra: BTreeMap<String, serde_json::Value>,
}

fn encode_claims(claims: &Claims, secret: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(e.to_string()))
}

fn decode_claims(token: &str, secret: &[u8], cfg: &TokenCodecConfig) -> Result<Claims, AuthError> {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.leeway = cfg.leeway_secs;
    v.set_audience(&[cfg.audience.clone()]);
    v.set_issuer(&[cfg.issuer.clone()]);
    let data =
        decode::<Claims>(token, &DecodingKey::from_secret(secret), &v).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenMalformed,
            }
        })?;
    Ok(data.claims)
}

fn to_token_claims(claims: Claims) -> Result<TokenClaims, AuthError> {
    let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(AuthError::TokenMalformed)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::TokenMalformed)?;
    Ok(TokenClaims {
        subject_id: SubjectId(claims.sub),
        tenant_id: claims.tid.map(TenantId),
        kind: claims.kind,
        issued_at,
        expires_at,
        token_id: claims.jti,
        extra: claims.extra,
    })
}

/// HS256 signer/verifier over the shared-secret pair in the config. Pure
/// function library; every call stands alone.
pub struct JwtHs256Codec {
    cfg: TokenCodecConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: TokenCodecConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    fn build_claims(
        &self,
        subject_id: &SubjectId,
        tenant_id: &TenantId,
        kind: TokenKind,
        ttl: chrono::Duration,
        jti: Option<String>,
        extra: Option<&BTreeMap<String, serde_json::Value>>,
    ) -> (Claims, DateTime<Utc>) {
        let iat_dt = Utc::now();
        let exp_dt = iat_dt + ttl;
        let claims = Claims {
            sub: subject_id.0.clone(),
            tid: Some(tenant_id.0.clone()),
            kind,
            exp: exp_dt.timestamp(),
            iat: iat_dt.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti,
            extra: extra.cloned().unwrap_or_default(),
        };
        (claims, exp_dt)
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_access_token(
        &self,
        subject_id: &SubjectId,
        tenant_id: &TenantId,
        extra: Option<&BTreeMap<String, serde_json::Value>>,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let (claims, exp_dt) = self.build_claims(
            subject_id,
            tenant_id,
            TokenKind::Access,
            self.cfg.access_ttl,
            None,
            extra,
        );
        let token = encode_claims(&claims, &self.cfg.access_secret)?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn issue_refresh_token(
        &self,
        subject_id: &SubjectId,
        tenant_id: &TenantId,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError> {
        let jti = Uuid::new_v4().to_string();
        let (claims, exp_dt) = self.build_claims(
            subject_id,
            tenant_id,
            TokenKind::Refresh,
            self.cfg.refresh_ttl,
            Some(jti),
            None,
        );
        let token = encode_claims(&claims, &self.cfg.refresh_secret)?;
        Ok((RefreshToken(token), exp_dt))
    }

    async fn verify_access_token(&self, token: &AccessToken) -> Result<TokenClaims, AuthError> {
        let claims = decode_claims(&token.0, &self.cfg.access_secret, &self.cfg)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::WrongTokenKind);
        }
        to_token_claims(claims)
    }

    async fn verify_refresh_token(&self, token: &RefreshToken) -> Result<TokenClaims, AuthError> {
        let claims = decode_claims(&token.0, &self.cfg.refresh_secret, &self.cfg)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::WrongTokenKind);
        }
        to_token_claims(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenCodecConfig {
        TokenCodecConfig {
            issuer: "vestibule.test".to_string(),
            audience: "test-client".to_string(),
            access_ttl: chrono::Duration::seconds(900),
            refresh_ttl: chrono::Duration::seconds(604_800),
            leeway_secs: 0,
            access_secret: b"test-access-secret".to_vec(),
            refresh_secret: b"test-refresh-secret".to_vec(),
        }
    }

    fn subject() -> SubjectId {
        SubjectId::new("u1")
    }

    fn tenant() -> TenantId {
        TenantId::new("orgA")
    }

    #[tokio::test]
    async fn access_round_trip_returns_matching_claims() {
        let codec = JwtHs256Codec::new(test_config());
        let (token, exp) = codec
            .issue_access_token(&subject(), &tenant(), None)
            .await
            .unwrap();

        let claims = codec.verify_access_token(&token).await.unwrap();
        assert_eq!(claims.subject_id, subject());
        assert_eq!(claims.tenant_id, Some(tenant()));
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.expires_at.timestamp(), exp.timestamp());
        assert!(claims.token_id.is_none());
    }

    #[tokio::test]
    async fn refresh_tokens_carry_unique_token_ids() {
        let codec = JwtHs256Codec::new(test_config());
        let (t1, _) = codec
            .issue_refresh_token(&subject(), &tenant())
            .await
            .unwrap();
        let (t2, _) = codec
            .issue_refresh_token(&subject(), &tenant())
            .await
            .unwrap();

        let c1 = codec.verify_refresh_token(&t1).await.unwrap();
        let c2 = codec.verify_refresh_token(&t2).await.unwrap();
        assert!(c1.token_id.is_some());
        assert_ne!(c1.token_id, c2.token_id);
    }

    #[tokio::test]
    async fn expired_token_fails_with_token_expired() {
        let mut cfg = test_config();
        cfg.access_ttl = chrono::Duration::seconds(-5);
        let codec = JwtHs256Codec::new(cfg);
        let (token, _) = codec
            .issue_access_token(&subject(), &tenant(), None)
            .await
            .unwrap();

        let err = codec.verify_access_token(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn garbage_and_tampered_tokens_fail_as_malformed() {
        let codec = JwtHs256Codec::new(test_config());
        let err = codec
            .verify_access_token(&AccessToken("not-a-jwt".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenMalformed));

        let (token, _) = codec
            .issue_access_token(&subject(), &tenant(), None)
            .await
            .unwrap();
        let tampered = AccessToken(format!("{}x", token.0));
        let err = codec.verify_access_token(&tampered).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenMalformed));
    }

    #[tokio::test]
    async fn cross_kind_presentation_is_rejected() {
        // Distinct secrets: the signature check rejects the wrong kind.
        let codec = JwtHs256Codec::new(test_config());
        let (refresh, _) = codec
            .issue_refresh_token(&subject(), &tenant())
            .await
            .unwrap();
        let err = codec
            .verify_access_token(&AccessToken(refresh.0.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenMalformed));

        // Same secret for both kinds: the kind claim check still rejects.
        let mut cfg = test_config();
        cfg.refresh_secret = cfg.access_secret.clone();
        let codec = JwtHs256Codec::new(cfg);
        let (refresh, _) = codec
            .issue_refresh_token(&subject(), &tenant())
            .await
            .unwrap();
        let err = codec
            .verify_access_token(&AccessToken(refresh.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongTokenKind));

        let (access, _) = codec
            .issue_access_token(&subject(), &tenant(), None)
            .await
            .unwrap();
        let err = codec
            .verify_refresh_token(&RefreshToken(access.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongTokenKind));
    }

    #[tokio::test]
    async fn extra_claims_survive_the_round_trip() {
        let codec = JwtHs256Codec::new(test_config());
        let mut extra = BTreeMap::new();
        extra.insert("plan".to_string(), serde_json::json!("enterprise"));
        let (token, _) = codec
            .issue_access_token(&subject(), &tenant(), Some(&extra))
            .await
            .unwrap();

        let claims = codec.verify_access_token(&token).await.unwrap();
        assert_eq!(claims.extra.get("plan"), Some(&serde_json::json!("enterprise")));
    }
}
