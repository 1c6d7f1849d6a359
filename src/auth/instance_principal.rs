//! Instance principal authentication for OCI compute instances.
//!
//! The instance metadata service (IMDS) hands out a leaf certificate that
//! identifies the instance, the certificate's private key and an
//! intermediate certificate. These are exchanged at the regional auth
//! service (`/v1/x509`) for a security token bound to a freshly generated
//! session key, and requests are then signed with `ST$<token>`.
//!
//! Tokens are cached in-memory and refreshed before expiration.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use rsa::RsaPrivateKey;
use rsa::pkcs8::EncodePublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::OciAuthProvider;
use super::signer::RequestSigner;
use crate::error::LlmError;

pub const METADATA_BASE_URL_DEFAULT: &str = "http://169.254.169.254/opc/v2";
const METADATA_AUTHORIZATION: &str = "Bearer Oracle";
const TENANT_MARKER: &[u8] = b"opc-tenant:";
const EXPIRY_SAFETY_WINDOW: i64 = 300; // 5 minutes
const DEFAULT_TOKEN_LIFETIME: i64 = 1200;
const SESSION_KEY_BITS: usize = 2048;
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

struct CachedSession {
    signer: Arc<RequestSigner>,
    exp_unix: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct X509FederationRequest<'a> {
    certificate: &'a str,
    public_key: String,
    intermediate_certificates: Vec<&'a str>,
    purpose: &'static str,
    fingerprint_algorithm: &'static str,
}

#[derive(Deserialize)]
struct X509FederationResponse {
    token: String,
}

/// Signs requests as the compute instance the process runs on.
pub struct InstancePrincipalAuthProvider {
    http: reqwest::Client,
    metadata_base_url: String,
    federation_endpoint: Option<String>,
    session_key_bits: usize,
    // Held across a refresh so concurrent callers federate once.
    session: Mutex<Option<CachedSession>>,
}

impl std::fmt::Debug for InstancePrincipalAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstancePrincipalAuthProvider")
            .field("metadata_base_url", &self.metadata_base_url)
            .field("federation_endpoint", &self.federation_endpoint)
            .finish_non_exhaustive()
    }
}

impl InstancePrincipalAuthProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            metadata_base_url: METADATA_BASE_URL_DEFAULT.to_string(),
            federation_endpoint: None,
            session_key_bits: SESSION_KEY_BITS,
            session: Mutex::new(None),
        }
    }

    /// Provider with an HTTP client that gives up quickly when no metadata
    /// service is reachable.
    pub fn default_client() -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(METADATA_TIMEOUT)
            .build()?;
        Ok(Self::new(http))
    }

    pub fn with_metadata_base_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL of the `/v1/x509` federation endpoint. Derived from the
    /// instance's region when not set.
    pub fn with_federation_endpoint(mut self, url: impl Into<String>) -> Self {
        self.federation_endpoint = Some(url.into());
        self
    }

    /// Key id of the current session (`ST$<token>`), federating if needed.
    pub async fn session_key_id(&self) -> Result<String, LlmError> {
        Ok(self.signer().await?.key_id().to_string())
    }

    async fn signer(&self) -> Result<Arc<RequestSigner>, LlmError> {
        let mut session = self.session.lock().await;
        let now = chrono::Utc::now().timestamp();
        if let Some(cached) = session.as_ref()
            && cached.exp_unix - EXPIRY_SAFETY_WINDOW > now
        {
            return Ok(cached.signer.clone());
        }

        let fresh = self.federate().await?;
        let signer = fresh.signer.clone();
        *session = Some(fresh);
        Ok(signer)
    }

    async fn metadata(&self, path: &str) -> Result<String, LlmError> {
        let url = format!("{}/{path}", self.metadata_base_url);
        let failed = |e: reqwest::Error| {
            LlmError::AuthenticationError(format!("Instance metadata request to {url} failed: {e}"))
        };
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, METADATA_AUTHORIZATION)
            .send()
            .await
            .map_err(failed)?;
        let status = response.status();
        let body = response.text().await.map_err(failed)?;
        if !status.is_success() {
            return Err(LlmError::AuthenticationError(format!(
                "Instance metadata service returned {status} for {path}"
            )));
        }
        Ok(body)
    }

    async fn resolve_federation_endpoint(&self) -> Result<String, LlmError> {
        if let Some(endpoint) = &self.federation_endpoint {
            return Ok(endpoint.clone());
        }
        let region = self.metadata("instance/canonicalRegionName").await?;
        Ok(format!(
            "https://auth.{}.oraclecloud.com/v1/x509",
            region.trim()
        ))
    }

    /// Exchange the instance certificate for a new session token.
    async fn federate(&self) -> Result<CachedSession, LlmError> {
        let leaf_pem = self.metadata("identity/cert.pem").await?;
        let key_pem = self.metadata("identity/key.pem").await?;
        let intermediate_pem = self.metadata("identity/intermediate.pem").await?;
        let endpoint = self.resolve_federation_endpoint().await?;

        let leaf = pem_body(&leaf_pem);
        let leaf_der = STANDARD.decode(&leaf).map_err(|e| {
            LlmError::AuthenticationError(format!("Invalid instance certificate: {e}"))
        })?;
        let tenancy = tenancy_from_certificate(&leaf_der)?;
        let instance_signer = RequestSigner::new(
            format!(
                "{tenancy}/fed-x509-sha256/{}",
                certificate_fingerprint(&leaf_der)
            ),
            &key_pem,
        )?;

        let session_key = generate_session_key(self.session_key_bits).await?;
        let public_key = session_key
            .to_public_key()
            .to_public_key_der()
            .map_err(|e| {
                LlmError::AuthenticationError(format!("Failed to encode session public key: {e}"))
            })?;
        let intermediate = pem_body(&intermediate_pem);
        let body = serde_json::to_vec(&X509FederationRequest {
            certificate: &leaf,
            public_key: STANDARD.encode(public_key.as_bytes()),
            intermediate_certificates: vec![intermediate.as_str()],
            purpose: "DEFAULT",
            fingerprint_algorithm: "SHA256",
        })?;

        let failed = |e: reqwest::Error| {
            LlmError::AuthenticationError(format!("Federation request to {endpoint} failed: {e}"))
        };
        let mut request = self
            .http
            .post(&endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .build()
            .map_err(failed)?;
        instance_signer.sign(&mut request)?;
        let response = self.http.execute(request).await.map_err(failed)?;
        let status = response.status();
        let text = response.text().await.map_err(failed)?;
        if !status.is_success() {
            return Err(LlmError::AuthenticationError(format!(
                "Federation endpoint returned {status}: {}",
                text.trim()
            )));
        }

        let token = serde_json::from_str::<X509FederationResponse>(&text)
            .map_err(|e| LlmError::AuthenticationError(format!("Invalid federation response: {e}")))?
            .token;
        let exp_unix = token_expiry(&token)
            .unwrap_or_else(|| chrono::Utc::now().timestamp() + DEFAULT_TOKEN_LIFETIME);
        tracing::debug!(
            tenancy = %tenancy,
            expires_at = exp_unix,
            "Obtained OCI instance principal security token"
        );

        Ok(CachedSession {
            signer: Arc::new(RequestSigner::from_private_key(
                format!("ST${token}"),
                session_key,
            )),
            exp_unix,
        })
    }
}

#[async_trait]
impl OciAuthProvider for InstancePrincipalAuthProvider {
    fn name(&self) -> &'static str {
        "instance_principal"
    }

    async fn sign_request(&self, request: &mut reqwest::Request) -> Result<(), LlmError> {
        self.signer().await?.sign(request)
    }
}

/// Base64 payload of a PEM document, without armor lines.
fn pem_body(pem: &str) -> String {
    pem.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect()
}

/// Tenancy OCID from the `OU=opc-tenant:<ocid>` subject attribute of a DER
/// encoded instance certificate.
pub fn tenancy_from_certificate(der: &[u8]) -> Result<String, LlmError> {
    let missing = || {
        LlmError::AuthenticationError(
            "Instance certificate has no opc-tenant subject attribute".to_string(),
        )
    };
    let start = der
        .windows(TENANT_MARKER.len())
        .position(|window| window == TENANT_MARKER)
        .ok_or_else(missing)?;
    if start < 2 {
        return Err(missing());
    }

    // The marker starts the value of a DER string; the length precedes it.
    let len = match (der[start - 2], der[start - 1]) {
        (0x81, len) => usize::from(len),
        (_, len) if len < 0x80 => usize::from(len),
        _ => return Err(missing()),
    };
    let value = der
        .get(start..start + len)
        .and_then(|value| value.strip_prefix(TENANT_MARKER))
        .ok_or_else(missing)?;
    let tenancy = std::str::from_utf8(value).map_err(|_| missing())?;
    if tenancy.is_empty() {
        return Err(missing());
    }
    Ok(tenancy.to_string())
}

/// Colon separated upper-case SHA-256 fingerprint.
pub fn certificate_fingerprint(der: &[u8]) -> String {
    Sha256::digest(der)
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// `exp` claim of a JWT security token.
fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()?
        .get("exp")?
        .as_i64()
}

async fn generate_session_key(bits: usize) -> Result<RsaPrivateKey, LlmError> {
    let failed =
        |e: String| LlmError::AuthenticationError(format!("Session key generation failed: {e}"));
    tokio::task::spawn_blocking(move || RsaPrivateKey::new(&mut rand::thread_rng(), bits))
        .await
        .map_err(|e| failed(e.to_string()))?
        .map_err(|e| failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = include_str!("../../tests/fixtures/oci_test_key.pem");
    const TENANCY: &str = "ocid1.tenancy.oc1..aaaainstance";

    /// DER-shaped bytes carrying an `OU=opc-tenant:` attribute followed by
    /// another RDN.
    fn leaf_der() -> Vec<u8> {
        let value = format!("opc-tenant:{TENANCY}");
        let mut der = vec![0x30, 0x82, 0x01, 0x00, 0x06, 0x03, 0x55, 0x04, 0x0b, 0x0c];
        der.push(u8::try_from(value.len()).unwrap());
        der.extend_from_slice(value.as_bytes());
        der.extend_from_slice(&[0x31, 0x0b, 0x30, 0x09, 0x06, 0x03, 0x55, 0x04, 0x03]);
        der
    }

    fn pem(label: &str, der: &[u8]) -> String {
        format!(
            "-----BEGIN {label}-----\n{}\n-----END {label}-----\n",
            STANDARD.encode(der)
        )
    }

    fn jwt(exp: i64) -> String {
        let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"instance","exp":{exp}}}"#));
        format!("eyJhbGciOiJSUzI1NiJ9.{claims}.c2ln")
    }

    async fn mock_imds(server: &MockServer, token: &str) {
        for (route, body) in [
            ("/opc/v2/identity/cert.pem", pem("CERTIFICATE", &leaf_der())),
            ("/opc/v2/identity/key.pem", TEST_KEY.to_string()),
            (
                "/opc/v2/identity/intermediate.pem",
                pem("CERTIFICATE", b"intermediate"),
            ),
        ] {
            Mock::given(method("GET"))
                .and(path(route))
                .and(header("authorization", METADATA_AUTHORIZATION))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/v1/x509"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": token })),
            )
            .mount(server)
            .await;
    }

    fn mock_provider(server: &MockServer) -> InstancePrincipalAuthProvider {
        let mut provider = InstancePrincipalAuthProvider::new(reqwest::Client::new())
            .with_metadata_base_url(format!("{}/opc/v2/", server.uri()))
            .with_federation_endpoint(format!("{}/v1/x509", server.uri()));
        provider.session_key_bits = 1024;
        provider
    }

    async fn federation_calls(server: &MockServer) -> Vec<wiremock::Request> {
        server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.url.path() == "/v1/x509")
            .collect()
    }

    #[test]
    fn tenancy_is_read_from_the_subject_attribute() {
        assert_eq!(tenancy_from_certificate(&leaf_der()).unwrap(), TENANCY);
        let err = tenancy_from_certificate(b"no tenant here").unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationError(_)));
    }

    #[test]
    fn fingerprint_is_colon_separated_sha256() {
        let fingerprint = certificate_fingerprint(b"abc");
        assert!(fingerprint.starts_with("BA:78:16:BF"));
        assert_eq!(fingerprint.split(':').count(), 32);
    }

    #[test]
    fn token_expiry_reads_exp_claim() {
        assert_eq!(token_expiry(&jwt(1_900_000_000)), Some(1_900_000_000));
        assert_eq!(token_expiry("opaque-token"), None);
    }

    #[tokio::test]
    async fn federates_and_signs_with_session_token() {
        let server = MockServer::start().await;
        let token = jwt(chrono::Utc::now().timestamp() + 3600);
        mock_imds(&server, &token).await;
        let provider = mock_provider(&server);

        let mut request = reqwest::Request::new(
            reqwest::Method::GET,
            "https://inference.example.com/20231130/models".parse().unwrap(),
        );
        provider.sign_request(&mut request).await.unwrap();
        let auth = request.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.contains(&format!("keyId=\"ST${token}\"")), "{auth}");

        let calls = federation_calls(&server).await;
        assert_eq!(calls.len(), 1);
        let federation_auth = calls[0].headers.get("authorization").unwrap().to_str().unwrap();
        assert!(federation_auth.contains(&format!(
            "keyId=\"{TENANCY}/fed-x509-sha256/{}\"",
            certificate_fingerprint(&leaf_der())
        )));
        let body: serde_json::Value = serde_json::from_slice(&calls[0].body).unwrap();
        assert_eq!(body["certificate"], STANDARD.encode(leaf_der()));
        assert_eq!(body["intermediateCertificates"][0], STANDARD.encode(b"intermediate"));
        assert_eq!(body["purpose"], "DEFAULT");
        assert!(!body["publicKey"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cached_token_is_reused_until_close_to_expiry() {
        let server = MockServer::start().await;
        mock_imds(&server, &jwt(chrono::Utc::now().timestamp() + 3600)).await;
        let provider = mock_provider(&server);

        provider.session_key_id().await.unwrap();
        provider.session_key_id().await.unwrap();
        assert_eq!(federation_calls(&server).await.len(), 1);

        let server = MockServer::start().await;
        mock_imds(&server, &jwt(chrono::Utc::now().timestamp() + 60)).await;
        let provider = mock_provider(&server);

        provider.session_key_id().await.unwrap();
        provider.session_key_id().await.unwrap();
        assert_eq!(federation_calls(&server).await.len(), 2);
    }

    #[tokio::test]
    async fn unreachable_metadata_service_is_an_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = mock_provider(&server).session_key_id().await.unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationError(ref m) if m.contains("404")));
    }

    #[tokio::test]
    async fn rejected_federation_is_an_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/x509"))
            .respond_with(ResponseTemplate::new(401).set_body_string("NotAuthenticated"))
            .mount(&server)
            .await;
        mock_imds(&server, "unused").await;

        let err = mock_provider(&server).session_key_id().await.unwrap_err();
        assert!(
            matches!(err, LlmError::AuthenticationError(ref m) if m.contains("NotAuthenticated"))
        );
    }
}
