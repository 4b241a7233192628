//! CLC API client.
//!
//! Low-level HTTP client that handles login, the bearer token and raw calls.
//! Resource operations live on the model types and go through [`ClcClient::call`].

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Certificate, Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{ClcError, ErrorBody, Result};
use crate::session::{Credentials, Session};

const DEFAULT_API_URL: &str = "https://api.ctl.io/";
const USER_AGENT: &str = concat!("clcapi/", env!("CARGO_PKG_VERSION"));
const LOGIN_PATH: &str = "v2/authentication/login";

/// Certificate bundle looked up next to the running executable.
const BUNDLED_CA_PATH: &str = "clc/cacert.pem";

/// Request body for [`ClcClient::call`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    None,
    /// Key/value pairs: query string on GET, form-encoded body otherwise.
    Form(Vec<(String, String)>),
    /// Pre-serialized JSON body.
    Json(String),
}

impl Payload {
    /// Serialize a value as a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_string(value)?))
    }

    /// Build form/query pairs.
    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Low-level CLC API client.
///
/// Holds the HTTP connection pool, the login credentials and the session
/// obtained on the first authenticated call. Cloning is cheap and clones
/// share the session, so a login performed through one clone is reused by
/// all of them. Independent clients hold independent sessions.
///
/// # Example
///
/// ```no_run
/// use clcapi::{ClcClient, Credentials};
///
/// # async fn example() -> clcapi::Result<()> {
/// // Credentials from CLC_V2_API_USERNAME / CLC_V2_API_PASSWD
/// let client = ClcClient::from_env()?;
///
/// // Or configure manually
/// let client = ClcClient::new("https://api.ctl.io", Credentials::new("user", "secret"))?;
/// println!("alias: {}", client.alias().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClcClient {
    http: Client,
    base_url: Arc<Url>,
    credentials: Arc<Credentials>,
    session: Arc<OnceCell<Session>>,
    ca_bundles: Vec<PathBuf>,
    debug: bool,
}

impl fmt::Debug for ClcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClcClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.session.initialized())
            .finish_non_exhaustive()
    }
}

impl ClcClient {
    /// Create a client from environment variables.
    ///
    /// Credentials come from `CLC_V2_API_USERNAME` and `CLC_V2_API_PASSWD`;
    /// the endpoint from `CLC_V2_API_URL` (defaults to `https://api.ctl.io/`)
    /// and an optional certificate bundle from `CLC_CA_BUNDLE`.
    ///
    /// Missing credentials are reported on the first authenticated call,
    /// not here.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the certificate
    /// bundle cannot be read.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("CLC_V2_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let client = Self::new(&base_url, Credentials::from_env())?;

        match env::var_os("CLC_CA_BUNDLE") {
            Some(path) => client.with_ca_bundle(PathBuf::from(path)),
            None => Ok(client),
        }
    }

    /// Create a new client that logs in with `credentials` on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let base_url = Self::normalize_base(base_url)?;
        let ca_bundles: Vec<PathBuf> = bundled_ca_path().into_iter().collect();
        let http = Self::build_http(&ca_bundles)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            credentials: Arc::new(credentials),
            session: Arc::new(OnceCell::new()),
            ca_bundles,
            debug: false,
        })
    }

    /// Create a client around an existing session; no login is performed.
    pub fn with_session(base_url: &str, session: Session) -> Result<Self> {
        let mut client = Self::new(base_url, Credentials::default())?;
        client.session = Arc::new(OnceCell::new_with(Some(session)));
        Ok(client)
    }

    /// Trust the PEM certificates in `path` in addition to the system roots
    /// and any bundle already configured, including the one shipped next to
    /// the executable.
    ///
    /// # Errors
    ///
    /// [`ClcError::Io`] if the file cannot be read, [`ClcError::HttpError`]
    /// if a certificate in it cannot be parsed.
    pub fn with_ca_bundle(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let mut ca_bundles = self.ca_bundles.clone();
        ca_bundles.push(path.as_ref().to_path_buf());
        self.http = Self::build_http(&ca_bundles)?;
        self.ca_bundles = ca_bundles;
        Ok(self)
    }

    /// Certificate bundles trusted on top of the system roots.
    pub fn ca_bundles(&self) -> &[PathBuf] {
        &self.ca_bundles
    }

    /// Dump every request and response to stderr.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The current session, logging in first if needed.
    ///
    /// Concurrent callers share a single login.
    pub async fn session(&self) -> Result<&Session> {
        self.session.get_or_try_init(|| self.login()).await
    }

    /// Returns true once a session has been established.
    pub fn is_authenticated(&self) -> bool {
        self.session.initialized()
    }

    /// Account alias of the session.
    pub async fn alias(&self) -> Result<String> {
        Ok(self.session().await?.account_alias().to_string())
    }

    /// Default location alias of the session.
    pub async fn location(&self) -> Result<String> {
        Ok(self.session().await?.location_alias().to_string())
    }

    /// Make a GET request.
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.call(Method::GET, path, Payload::None, false).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_query<I, K, V>(&self, path: &str, query: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.call(Method::GET, path, Payload::form(query), false)
            .await
    }

    /// Make a POST request with JSON body.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.call(Method::POST, path, Payload::json(body)?, false)
            .await
    }

    /// Make a PUT request with JSON body.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.call(Method::PUT, path, Payload::json(body)?, false)
            .await
    }

    /// Make a PATCH request with JSON body.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.call(Method::PATCH, path, Payload::json(body)?, false)
            .await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.call(Method::DELETE, path, Payload::None, false).await
    }

    /// Execute an API call and return the decoded JSON result.
    ///
    /// `path` is either absolute (leading `/`, as in links returned by the
    /// API) or relative to the versioned `v2/` base. A successful response
    /// with an empty or non-JSON body yields an empty object.
    ///
    /// # Errors
    ///
    /// Login errors on first use, [`ClcError::Api`] for any non-2xx status,
    /// and transport errors.
    #[tracing::instrument(skip(self, payload, debug), fields(url))]
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        debug: bool,
    ) -> Result<Value> {
        let session = self.session().await?;
        let url = self.resolve(path)?;
        tracing::Span::current().record("url", url.as_str());

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(session.bearer_token());

        builder = match &payload {
            Payload::None => builder,
            Payload::Form(pairs) if method == Method::GET => builder.query(pairs),
            Payload::Form(pairs) => builder.form(pairs),
            Payload::Json(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone()),
        };

        let request = builder.build()?;
        let request_dump = (debug || self.debug).then(|| format_request(&request));

        tracing::debug!(%method, %url, "sending request");
        let response = self.http.execute(request).await?;
        let status = response.status();
        let text = response.text().await?;

        if let Some(request_dump) = request_dump {
            eprintln!("{request_dump}");
            eprintln!("{}", format_response(status, &text));
        }

        if status.is_success() {
            return Ok(parse_success_body(&text));
        }

        let body = ErrorBody::parse(&text);
        let message = match &body {
            ErrorBody::Json(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .map_or_else(|| text.clone(), str::to_string),
            ErrorBody::Text(raw) => raw.clone(),
        };

        tracing::debug!(status = status.as_u16(), %message, "API call failed");
        Err(ClcError::Api {
            status_code: status.as_u16(),
            message,
            body,
            method: method.to_string(),
            url: url.to_string(),
        })
    }

    /// Retrieve a bearer token along with the account and location aliases.
    #[tracing::instrument(skip(self))]
    async fn login(&self) -> Result<Session> {
        let (username, password) = self.credentials.require()?;
        let url = self.base_url.join(LOGIN_PATH)?;

        let response = self
            .http
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let session: Session = serde_json::from_str(&text).map_err(|e| {
                ClcError::MalformedResponse(format!("login response: {e}"))
            })?;
            tracing::info!(alias = session.account_alias(), "logged into V2 API");
            return Ok(session);
        }

        let message = ErrorBody::parse(&text).message();
        if status == StatusCode::BAD_REQUEST {
            Err(ClcError::InvalidCredentials(message))
        } else {
            Err(ClcError::AuthenticationFailed {
                status_code: status.as_u16(),
                message,
            })
        }
    }

    /// Resolve an API path against the endpoint.
    fn resolve(&self, path: &str) -> Result<Url> {
        let url = match path.strip_prefix('/') {
            Some(absolute) => self.base_url.join(absolute)?,
            None => self.base_url.join(&format!("v2/{path}"))?,
        };
        Ok(url)
    }

    fn normalize_base(base_url: &str) -> Result<Url> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Url::parse(&base_url_str)?)
    }

    fn build_http(ca_bundles: &[PathBuf]) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300));

        for path in ca_bundles {
            let pem = std::fs::read(path)?;
            for cert in Certificate::from_pem_bundle(&pem)? {
                builder = builder.add_root_certificate(cert);
            }
            tracing::debug!(path = %path.display(), "using certificate bundle");
        }

        builder.build().map_err(ClcError::HttpError)
    }
}

/// Certificate bundle shipped next to the executable, if present.
fn bundled_ca_path() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let candidate = exe.parent()?.join(BUNDLED_CA_PATH);
    candidate.is_file().then_some(candidate)
}

fn parse_success_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

fn format_request(request: &reqwest::Request) -> String {
    let headers = request
        .headers()
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join("\n");
    let body = request
        .body()
        .and_then(|b| b.as_bytes())
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default();

    format!(
        "-----------REQUEST-----------\n{} {}\n{}\n\n{}\n",
        request.method(),
        request.url(),
        headers,
        body
    )
}

fn format_response(status: StatusCode, body: &str) -> String {
    format!(
        "-----------RESPONSE-----------\nstatus: {}\n\n{}",
        status.as_u16(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ClcClient {
        ClcClient::with_session("https://api.ctl.io", Session::new("tok", "ACME", "WA1")).unwrap()
    }

    #[test]
    fn test_client_debug() {
        let client = client();
        let debug = format!("{:?}", client);
        assert!(debug.contains("ClcClient"));
        assert!(debug.contains("base_url"));
        // Token should not be in debug output
        assert!(!debug.contains("tok"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = ClcClient::new("https://api.ctl.io", Credentials::default()).unwrap();
        let client2 = ClcClient::new("https://api.ctl.io/", Credentials::default()).unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
    }

    #[test]
    fn test_resolve_relative_and_absolute_paths() {
        let client = client();
        assert_eq!(
            client.resolve("servers/ACME/WA1SRV01").unwrap().as_str(),
            "https://api.ctl.io/v2/servers/ACME/WA1SRV01"
        );
        assert_eq!(
            client
                .resolve("/v2/operations/ACME/status/wa1-123")
                .unwrap()
                .as_str(),
            "https://api.ctl.io/v2/operations/ACME/status/wa1-123"
        );
    }

    #[test]
    fn test_with_session_is_authenticated() {
        assert!(client().is_authenticated());
        let fresh = ClcClient::new("https://api.ctl.io", Credentials::default()).unwrap();
        assert!(!fresh.is_authenticated());
    }

    #[test]
    fn test_success_body_fallback() {
        assert_eq!(parse_success_body(""), serde_json::json!({}));
        assert_eq!(parse_success_body("accepted"), serde_json::json!({}));
        assert_eq!(parse_success_body(r#"[1]"#), serde_json::json!([1]));
    }

    #[test]
    fn test_payload_json() {
        let payload = Payload::json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(payload, Payload::Json(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn test_format_response() {
        let dump = format_response(StatusCode::NOT_FOUND, "{}");
        assert!(dump.starts_with("-----------RESPONSE-----------"));
        assert!(dump.contains("status: 404"));
    }

    const TEST_ROOT_PEM: &str = "\
-----BEGIN CERTIFICATE-----\n\
MIIBjjCCATOgAwIBAgIULxLknxWQecq4OrsRirGvo7BsX2IwCgYIKoZIzj0EAwIw\n\
GzEZMBcGA1UEAwwQY2xjYXBpIHRlc3Qgcm9vdDAgFw0yNjEwMTkxOTM2MzJaGA8y\n\
MTI2MDkyNTE5MzYzMlowGzEZMBcGA1UEAwwQY2xjYXBpIHRlc3Qgcm9vdDBZMBMG\n\
ByqGSM49AgEGCCqGSM49AwEHA0IABLN/GWuCgWRB2WhheMtK0EXDuLSkk4kbvogP\n\
eEyzqpz6cYf6aMpoYAsbgtCo0JDwBZi8Wept5XnZWTidkDTkaM+jUzBRMB0GA1Ud\n\
DgQWBBSGdodwHG5QWhjsjc2cFvbuxIVR0zAfBgNVHSMEGDAWgBSGdodwHG5QWhjs\n\
jc2cFvbuxIVR0zAPBgNVHRMBAf8EBTADAQH/MAoGCCqGSM49BAMCA0kAMEYCIQC4\n\
y9km23bAdd+1+l3Le2rnCWGv4QSKxPqgYPlgi4JtpwIhAMOBdDeruA/Y/yPSgwjq\n\
O6MSsJNJw6TkFCW3+P7mYbER\n\
-----END CERTIFICATE-----\n";

    fn write_pem(name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("clcapi-{}-{name}.pem", std::process::id()));
        std::fs::write(&path, TEST_ROOT_PEM).unwrap();
        path
    }

    #[test]
    fn test_format_request_includes_headers_and_body() {
        let request = reqwest::Client::new()
            .post("https://api.ctl.io/v2/servers/ACME/WA1SRV01/publicIPAddresses")
            .bearer_auth("tok")
            .header(CONTENT_TYPE, "application/json")
            .body(r#"{"ports":[{"protocol":"TCP","port":22}]}"#)
            .build()
            .unwrap();

        let dump = format_request(&request);
        let mut lines = dump.lines();
        assert_eq!(lines.next(), Some("-----------REQUEST-----------"));
        assert_eq!(
            lines.next(),
            Some("POST https://api.ctl.io/v2/servers/ACME/WA1SRV01/publicIPAddresses")
        );
        assert!(dump.contains("authorization: Bearer tok"));
        assert!(dump.contains("content-type: application/json"));
        assert!(dump.ends_with("{\"ports\":[{\"protocol\":\"TCP\",\"port\":22}]}\n"));
    }

    #[test]
    fn test_format_request_without_body() {
        let request = reqwest::Client::new()
            .get("https://api.ctl.io/v2/datacenters/ACME")
            .build()
            .unwrap();
        let dump = format_request(&request);
        assert!(dump.contains("GET https://api.ctl.io/v2/datacenters/ACME"));
        assert!(dump.ends_with("\n\n\n"));
    }

    #[test]
    fn test_with_debug_toggles_dumps() {
        assert!(!client().debug);
        assert!(client().with_debug(true).debug);
        assert!(!client().with_debug(true).with_debug(false).debug);
    }

    #[test]
    fn test_ca_bundle_missing_path_is_io() {
        let missing = env::temp_dir().join("clcapi-no-such-bundle.pem");
        let err = client().with_ca_bundle(&missing).unwrap_err();
        assert!(matches!(err, ClcError::Io(_)));
    }

    #[test]
    fn test_ca_bundle_valid_pem() {
        let path = write_pem("valid");
        let client = client().with_ca_bundle(&path).unwrap();
        assert_eq!(client.ca_bundles().last(), Some(&path));
        assert!(client.is_authenticated());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_ca_bundles_accumulate() {
        let first = write_pem("first");
        let second = write_pem("second");
        let base = client().ca_bundles().len();

        let client = client()
            .with_ca_bundle(&first)
            .unwrap()
            .with_ca_bundle(&second)
            .unwrap();

        let bundles = client.ca_bundles();
        assert_eq!(bundles.len(), base + 2);
        assert_eq!(&bundles[base..], &[first.clone(), second.clone()]);
        std::fs::remove_file(first).unwrap();
        std::fs::remove_file(second).unwrap();
    }

    #[test]
    fn test_bundled_ca_path_is_next_to_executable() {
        let exe_dir = env::current_exe().unwrap().parent().unwrap().to_path_buf();
        match bundled_ca_path() {
            Some(path) => assert_eq!(path, exe_dir.join(BUNDLED_CA_PATH)),
            None => assert!(!exe_dir.join(BUNDLED_CA_PATH).is_file()),
        }
        assert_eq!(
            client().ca_bundles(),
            bundled_ca_path().into_iter().collect::<Vec<_>>().as_slice()
        );
    }

    #[test]
    fn test_missing_credentials_fail_before_network() {
        let client = ClcClient::new("http://127.0.0.1:9", Credentials::default()).unwrap();
        let result = tokio_test::block_on(client.session());
        assert!(matches!(result, Err(ClcError::ConfigMissing(_))));
    }
}
