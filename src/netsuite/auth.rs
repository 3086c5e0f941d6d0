// src/netsuite/auth.rs

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::common::error::AppError;

const TOKEN_PATH: &str = "/services/rest/auth/oauth2/v1/token";
const ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
// Renova o token um pouco antes de ele expirar no NetSuite.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Como o serviço se autentica no NetSuite.
#[derive(Clone)]
pub enum NetSuiteAuth {
    /// Token de acesso fixo (útil em desenvolvimento e nos testes).
    AccessToken(String),
    /// OAuth 2.0 client credentials (M2M) com client assertion assinada.
    ClientCredentials {
        client_id: String,
        certificate_id: String,
        private_key_pem: String,
    },
}

// Nunca imprime segredos nos logs.
impl fmt::Debug for NetSuiteAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetSuiteAuth::AccessToken(_) => f.write_str("AccessToken(***)"),
            NetSuiteAuth::ClientCredentials { client_id, certificate_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("certificate_id", certificate_id)
                .field("private_key_pem", &"***")
                .finish(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct AssertionClaims {
    iss: String,
    scope: Vec<&'static str>,
    aud: String,
    iat: i64,
    exp: i64,
}

impl AssertionClaims {
    pub(crate) fn new(client_id: &str, token_url: &str, now: i64) -> Self {
        Self {
            iss: client_id.to_string(),
            scope: vec!["restlets", "rest_webservices"],
            aud: token_url.to_string(),
            iat: now,
            // O NetSuite recusa assertions com validade maior que 1h.
            exp: now + 3600,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    // O NetSuite devolve "3600" (texto), mas aceitamos número também.
    #[serde(default)]
    expires_in: Option<Value>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Entrega o bearer token atual, renovando pelo fluxo M2M quando necessário.
#[derive(Clone)]
pub struct TokenProvider {
    auth: NetSuiteAuth,
    token_url: String,
    http: reqwest::Client,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenProvider {
    pub fn new(auth: NetSuiteAuth, base_url: &str, http: reqwest::Client) -> Self {
        Self {
            auth,
            token_url: format!("{}{}", base_url, TOKEN_PATH),
            http,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn bearer(&self) -> Result<String, AppError> {
        let (client_id, certificate_id, private_key_pem) = match &self.auth {
            NetSuiteAuth::AccessToken(token) => return Ok(token.clone()),
            NetSuiteAuth::ClientCredentials { client_id, certificate_id, private_key_pem } => {
                (client_id, certificate_id, private_key_pem)
            }
        };

        // O lock fica preso durante a troca para não pedir dois tokens ao mesmo tempo.
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.value.clone());
            }
        }

        let assertion = sign_assertion(client_id, certificate_id, private_key_pem, &self.token_url)?;
        let token = self.exchange(&assertion).await?;
        let value = token.value.clone();
        *cache = Some(token);

        Ok(value)
    }

    // Descarta o token em cache (ex.: revogado antes de expirar).
    pub async fn invalidate(&self) {
        self.cache.lock().await.take();
    }

    #[cfg(test)]
    pub(crate) async fn prime(&self, value: &str, ttl: Duration) {
        *self.cache.lock().await = Some(CachedToken {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        });
    }

    #[cfg(test)]
    pub(crate) async fn cached(&self) -> Option<String> {
        self.cache.lock().await.as_ref().map(|t| t.value.clone())
    }

    async fn exchange(&self, assertion: &str) -> Result<CachedToken, AppError> {
        tracing::debug!("Solicitando novo access token ao NetSuite");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_assertion_type", ASSERTION_TYPE),
                ("client_assertion", assertion),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("NetSuite recusou a troca de token (HTTP {}): {}", status, body);
            return Err(AppError::NetSuiteUnauthorized(format!(
                "falha ao obter access token (HTTP {})",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = token
            .expires_in
            .as_ref()
            .and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .unwrap_or(3600);

        let lifetime = Duration::from_secs(lifetime).saturating_sub(EXPIRY_SKEW);
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}

fn sign_assertion(
    client_id: &str,
    certificate_id: &str,
    private_key_pem: &str,
    token_url: &str,
) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::PS256);
    header.kid = Some(certificate_id.to_string());

    let claims = AssertionClaims::new(client_id, token_url, Utc::now().timestamp());
    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;

    Ok(jsonwebtoken::encode(&header, &claims, &key)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Chave inválida: qualquer tentativa de renovar o token falha ao assinar.
    fn m2m_provider() -> TokenProvider {
        TokenProvider::new(
            NetSuiteAuth::ClientCredentials {
                client_id: "client".into(),
                certificate_id: "cert".into(),
                private_key_pem: "sem chave".into(),
            },
            "http://127.0.0.1:1",
            reqwest::Client::new(),
        )
    }

    #[test]
    fn assertion_claims_match_netsuite_requirements() {
        let claims = AssertionClaims::new("client-1", "https://acct.suitetalk.api.netsuite.com/t", 1_000);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["iss"], "client-1");
        assert_eq!(json["aud"], "https://acct.suitetalk.api.netsuite.com/t");
        assert_eq!(json["scope"], serde_json::json!(["restlets", "rest_webservices"]));
        assert_eq!(json["exp"].as_i64().unwrap() - json["iat"].as_i64().unwrap(), 3600);
    }

    #[test]
    fn invalid_private_key_is_a_jwt_error() {
        let err = sign_assertion("c", "k", "isto não é um PEM", "http://x/token").unwrap_err();
        assert!(matches!(err, AppError::JwtError(_)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let auth = NetSuiteAuth::ClientCredentials {
            client_id: "client".into(),
            certificate_id: "cert".into(),
            private_key_pem: "SEGREDO".into(),
        };
        let printed = format!("{:?}", auth);
        assert!(printed.contains("client"));
        assert!(!printed.contains("SEGREDO"));
        assert_eq!(format!("{:?}", NetSuiteAuth::AccessToken("tok".into())), "AccessToken(***)");
    }

    #[tokio::test]
    async fn static_token_skips_token_endpoint() {
        let provider = TokenProvider::new(
            NetSuiteAuth::AccessToken("fixo".into()),
            "http://127.0.0.1:1",
            reqwest::Client::new(),
        );
        assert_eq!(provider.bearer().await.unwrap(), "fixo");
    }

    #[tokio::test]
    async fn rejected_exchange_maps_to_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", TOKEN_PATH)
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new(
            NetSuiteAuth::AccessToken("unused".into()),
            &server.url(),
            reqwest::Client::new(),
        );
        let err = provider.exchange("assertion").await.err().unwrap();

        assert!(matches!(err, AppError::NetSuiteUnauthorized(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_reads_string_expiry() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", TOKEN_PATH)
            .match_body(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                "client_credentials".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"novo","expires_in":"3600","token_type":"bearer"}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new(
            NetSuiteAuth::AccessToken("unused".into()),
            &server.url(),
            reqwest::Client::new(),
        );
        let token = provider.exchange("assertion").await.unwrap();

        assert_eq!(token.value, "novo");
        assert!(token.expires_at > Instant::now() + Duration::from_secs(3000));
    }

    #[tokio::test]
    async fn cached_token_is_reused() {
        let provider = m2m_provider();
        provider.prime("em-cache", Duration::from_secs(600)).await;

        assert_eq!(provider.bearer().await.unwrap(), "em-cache");
        assert_eq!(provider.bearer().await.unwrap(), "em-cache");
    }

    #[tokio::test]
    async fn expired_token_is_renewed() {
        let provider = m2m_provider();
        provider.prime("vencido", Duration::ZERO).await;

        let err = provider.bearer().await.unwrap_err();
        assert!(matches!(err, AppError::JwtError(_)));
    }

    #[tokio::test]
    async fn invalidate_drops_cached_token() {
        let provider = m2m_provider();
        provider.prime("revogado", Duration::from_secs(600)).await;

        provider.invalidate().await;

        assert_eq!(provider.cached().await, None);
        assert!(provider.bearer().await.is_err());
    }

    #[tokio::test]
    async fn expiry_keeps_refresh_margin() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", TOKEN_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"curto","expires_in":60}"#)
            .create_async()
            .await;

        let provider = TokenProvider::new(
            NetSuiteAuth::AccessToken("unused".into()),
            &server.url(),
            reqwest::Client::new(),
        );
        let token = provider.exchange("assertion").await.unwrap();

        // 60s de validade menos 60s de margem: já nasce vencido.
        assert!(token.expires_at <= Instant::now());
    }
}
