//! Google service-account authentication (OAuth2 JWT bearer grant).

use std::path::Path;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use dailybread_shared::{DailyBreadError, Result};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime; Google rejects anything above one hour.
const ASSERTION_TTL_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

/// The fields of a service-account JSON key file that matter here.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DailyBreadError::io(path, e))?;
        Self::from_json(&content).map_err(|e| {
            DailyBreadError::config(format!("invalid credentials file {}: {e}", path.display()))
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DailyBreadError::parse(e.to_string()))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Sign the RS256 assertion exchanged for an access token.
fn sign_assertion(key: &ServiceAccountKey, scopes: &[&str], now: i64) -> Result<String> {
    let claims = Claims {
        iss: &key.client_email,
        scope: scopes.join(" "),
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_TTL_SECS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| DailyBreadError::auth(format!("invalid private key: {e}")))?;

    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| DailyBreadError::auth(format!("failed to sign assertion: {e}")))
}

/// Exchange a signed assertion for a short-lived bearer token.
#[instrument(skip_all, fields(client_email = %key.client_email))]
pub(crate) async fn fetch_access_token(
    client: &Client,
    key: &ServiceAccountKey,
    scopes: &[&str],
) -> Result<String> {
    let assertion = sign_assertion(key, scopes, Utc::now().timestamp())?;

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| DailyBreadError::Network(format!("{}: {e}", key.token_uri)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DailyBreadError::auth(format!(
            "token exchange returned HTTP {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| DailyBreadError::auth(format!("malformed token response: {e}")))?;

    debug!("access token obtained");
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    fn fixture_key(token_uri: &str) -> ServiceAccountKey {
        let json = std::fs::read_to_string("../../../fixtures/keys/service_account.json")
            .expect("read service account fixture");
        let mut key = ServiceAccountKey::from_json(&json).expect("parse fixture");
        key.token_uri = token_uri.to_string();
        key
    }

    #[derive(Deserialize)]
    struct DecodedClaims {
        iss: String,
        scope: String,
    }

    #[test]
    fn token_uri_defaults_when_absent() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"bot@example.iam.gserviceaccount.com","private_key":"x"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn assertion_is_verifiable_rs256() {
        let key = fixture_key("https://oauth2.example.test/token");
        let jwt = sign_assertion(&key, &["scope-a", "scope-b"], Utc::now().timestamp())
            .expect("sign");

        let public = std::fs::read("../../../fixtures/keys/service_account.pub.pem")
            .expect("read public key");
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.example.test/token"]);
        let decoded = decode::<DecodedClaims>(
            &jwt,
            &DecodingKey::from_rsa_pem(&public).unwrap(),
            &validation,
        )
        .expect("verify");

        assert_eq!(decoded.claims.iss, key.client_email);
        assert_eq!(decoded.claims.scope, "scope-a scope-b");
    }

    #[test]
    fn garbage_private_key_is_auth_error() {
        let key = ServiceAccountKey {
            client_email: "bot@example.com".into(),
            private_key: "not a pem".into(),
            token_uri: default_token_uri(),
        };
        let err = sign_assertion(&key, &["s"], 0).unwrap_err();
        assert!(matches!(err, DailyBreadError::Auth { .. }));
    }

    #[tokio::test]
    async fn exchanges_assertion_for_token() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/token"))
            .and(wiremock::matchers::body_string_contains("grant_type=urn"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "access_token": "ya29.test-token",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                })),
            )
            .mount(&server)
            .await;

        let key = fixture_key(&format!("{}/token", server.uri()));
        let token = fetch_access_token(&Client::new(), &key, &["scope"]).await.unwrap();
        assert_eq!(token, "ya29.test-token");
    }

    #[tokio::test]
    async fn rejected_exchange_is_auth_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let key = fixture_key(&format!("{}/token", server.uri()));
        let err = fetch_access_token(&Client::new(), &key, &["scope"]).await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}
