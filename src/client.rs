use crate::challenge::strip_digest_scheme;
use crate::{
    Algorithm, AuthContext, AuthorizationHeader, Challenge, Error::*, HttpClient, NonceCounter,
    ParseMode, Result,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, WWW_AUTHENTICATE};
use http::{Method, Request, Response, StatusCode};
use tracing::{debug, trace};

#[cfg(feature = "blocking")]
use crate::ReqwestTransport;

/// Login credentials, fixed for the lifetime of a client
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of probing a URL for a digest challenge
#[derive(Debug, PartialEq)]
pub enum Probe {
    /// The server did not answer 401; send the request as it is
    NoChallenge,
    /// Raw `WWW-Authenticate` value from the 401 response
    Challenge(String),
}

/// HTTP client that answers Digest challenges transparently.
///
/// Every [`execute()`](#method.execute) first sends a bodiless probe with the same method
/// and URL. On 401 it parses the challenge, attaches an `Authorization` header to the real
/// request and sends it; otherwise the real request goes out untouched.
///
/// Create one per set of credentials and reuse it: the nonce count lives here and grows
/// with every authorization. The client is `Sync` and can be shared between threads.
pub struct DigestClient {
    credentials: Credentials,
    transport: Arc<dyn HttpClient>,
    nonce_count: NonceCounter,
    parse_mode: ParseMode,
    negotiate_algorithm: bool,
}

impl DigestClient {
    /// Client using the default reqwest-backed transport
    ///
    /// # Panics
    /// If the TLS backend cannot be initialized. Use
    /// [`builder()`](#method.builder) to get that failure as an error instead.
    #[cfg(feature = "blocking")]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_transport(username, password, Arc::new(ReqwestTransport::default()))
    }

    /// Client sending everything through a shared transport
    pub fn with_transport(
        username: impl Into<String>,
        password: impl Into<String>,
        transport: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            credentials: Credentials {
                username: username.into(),
                password: password.into(),
            },
            transport,
            nonce_count: NonceCounter::new(),
            parse_mode: ParseMode::default(),
            negotiate_algorithm: false,
        }
    }

    /// Start configuring a client; see [`DigestClientBuilder`](struct.DigestClientBuilder.html)
    pub fn builder(username: impl Into<String>, password: impl Into<String>) -> DigestClientBuilder {
        DigestClientBuilder::new(username, password)
    }

    /// Credentials this client authenticates with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Nonce count of the last computed authorization, 0 if none yet
    pub fn nonce_count(&self) -> u32 {
        self.nonce_count.current()
    }

    /// Send a request, authenticating it first if the server asks for it.
    ///
    /// # Errors
    /// - `TransportFailure` if the probe or the request itself fails
    /// - `MissingChallengeHeader` / `InvalidChallengeHeader` if the server's 401 is unusable;
    ///   the real request is not sent in that case
    pub fn execute(&self, mut request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        if let Probe::Challenge(raw) = self.probe(&request)? {
            let challenge = Challenge::parse_with(&raw, self.parse_mode)?;
            let uri = request.uri().to_string();
            let authorization = self.authorize(&challenge, request.method(), &uri)?;

            let value = HeaderValue::from_str(&authorization)
                .map_err(|e| InvalidAuthorization(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        Ok(self.transport.execute(request)?)
    }

    /// Send a bodiless copy of the request (method and URL only) and look for a challenge.
    /// Only the status and headers of the answer are read; its body is released unread.
    pub fn probe<B>(&self, request: &Request<B>) -> Result<Probe> {
        let mut probe = Request::new(Vec::new());
        *probe.method_mut() = request.method().clone();
        *probe.uri_mut() = request.uri().clone();

        let response = self.transport.probe(probe)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            debug!(status = %response.status(), uri = %request.uri(), "no challenge, passing through");
            return Ok(Probe::NoChallenge);
        }

        let raw = select_challenge(response.headers()).ok_or(MissingChallengeHeader)?;
        trace!(challenge = %raw, "received challenge");
        Ok(Probe::Challenge(raw))
    }

    /// Compute the `Authorization` value for a challenge. Takes the next nonce count.
    ///
    /// `uri` is the absolute URL exactly as it will be sent.
    pub fn authorize(&self, challenge: &Challenge, method: &Method, uri: &str) -> Result<String> {
        let algorithm = if self.negotiate_algorithm {
            challenge.algorithm.parse::<Algorithm>()?
        } else {
            Algorithm::default()
        };

        let nc = self.nonce_count.increment();
        let context = AuthContext::new(
            &self.credentials.username,
            &self.credentials.password,
            method.as_str(),
            uri,
        );
        let header = AuthorizationHeader::from_challenge(challenge, &context, nc, algorithm);

        debug!(realm = %challenge.realm, nc, %algorithm, "computed digest authorization");
        Ok(header.to_header_string())
    }
}

impl fmt::Debug for DigestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestClient")
            .field("credentials", &self.credentials)
            .field("nonce_count", &self.nonce_count.current())
            .field("parse_mode", &self.parse_mode)
            .field("negotiate_algorithm", &self.negotiate_algorithm)
            .finish()
    }
}

/// First Digest challenge among the WWW-Authenticate values, or the first value if none is Digest
fn select_challenge(headers: &HeaderMap) -> Option<String> {
    let mut values = headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    let first = values.next()?;
    if is_digest(&first) {
        return Some(first);
    }
    Some(values.find(|v| is_digest(v)).unwrap_or(first))
}

fn is_digest(value: &str) -> bool {
    strip_digest_scheme(value).is_some()
}

/// Configuration for a [`DigestClient`](struct.DigestClient.html)
pub struct DigestClientBuilder {
    credentials: Credentials,
    transport: Option<Arc<dyn HttpClient>>,
    timeout: Option<Duration>,
    parse_mode: ParseMode,
    negotiate_algorithm: bool,
}

impl DigestClientBuilder {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                username: username.into(),
                password: password.into(),
            },
            transport: None,
            timeout: None,
            parse_mode: ParseMode::default(),
            negotiate_algorithm: false,
        }
    }

    /// Send through this transport instead of the default one
    pub fn transport(mut self, transport: Arc<dyn HttpClient>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Deadline for each request made by the default transport.
    /// Has no effect on an injected transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// How challenges are split into directives (permissive by default)
    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = mode;
        self
    }

    /// Hash with the algorithm the server names instead of always using MD5
    pub fn negotiate_algorithm(mut self, enabled: bool) -> Self {
        self.negotiate_algorithm = enabled;
        self
    }

    /// # Errors
    /// `TransportFailure` if the default transport cannot be set up
    pub fn build(self) -> Result<DigestClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(self.timeout)?,
        };

        Ok(DigestClient {
            credentials: self.credentials,
            transport,
            nonce_count: NonceCounter::new(),
            parse_mode: self.parse_mode,
            negotiate_algorithm: self.negotiate_algorithm,
        })
    }
}

#[cfg(feature = "blocking")]
fn default_transport(timeout: Option<Duration>) -> Result<Arc<dyn HttpClient>> {
    let transport = match timeout {
        Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
        None => ReqwestTransport::try_new()?,
    };
    Ok(Arc::new(transport))
}

#[cfg(not(feature = "blocking"))]
fn default_transport(_timeout: Option<Duration>) -> Result<Arc<dyn HttpClient>> {
    Err(TransportFailure(
        "no transport given and the `blocking` feature is disabled".into(),
    ))
}
