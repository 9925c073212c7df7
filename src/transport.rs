use crate::TransportError;

/// The HTTP capability a [`DigestClient`](struct.DigestClient.html) sends requests through.
///
/// Implementations are shared between clients and threads, so they must be
/// `Send + Sync`; pooling clients such as reqwest's are a natural fit.
pub trait HttpClient: Send + Sync {
    /// Send one request and return the fully buffered response.
    /// Any non-HTTP failure (DNS, connect, TLS, timeout...) is an `Err`.
    fn execute(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>, TransportError>;

    /// Send one request and return only its status and headers.
    /// The response body is released without being read where the transport allows it;
    /// the default goes through [`execute()`](#tymethod.execute) and drops the body.
    fn probe(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<()>, TransportError> {
        Ok(self.execute(request)?.map(drop))
    }
}

impl<F> HttpClient for F
where
    F: Fn(http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>, TransportError> + Send + Sync,
{
    fn execute(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>, TransportError> {
        self(request)
    }
}

#[cfg(feature = "blocking")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "blocking")]
mod reqwest_transport {
    use super::HttpClient;
    use crate::TransportError;
    use std::time::Duration;

    /// Default transport, backed by `reqwest::blocking::Client`.
    ///
    /// Blocks the calling thread. Do not use it from inside an async runtime;
    /// inject an async-aware transport there instead.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::blocking::Client,
    }

    impl ReqwestTransport {
        /// # Panics
        /// If the TLS backend cannot be initialized; see [`try_new()`](#method.try_new)
        pub fn new() -> Self {
            Self::default()
        }

        /// Like [`new()`](#method.new), but reports a failed client setup instead of panicking
        pub fn try_new() -> Result<Self, TransportError> {
            let client = reqwest::blocking::Client::builder().build()?;
            Ok(Self { client })
        }

        /// Transport with a deadline applied to every request it sends
        pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
            let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
            Ok(Self { client })
        }

        /// Wrap an already configured reqwest client
        pub fn from_client(client: reqwest::blocking::Client) -> Self {
            Self { client }
        }
    }

    impl ReqwestTransport {
        fn send(&self, request: http::Request<Vec<u8>>) -> Result<reqwest::blocking::Response, TransportError> {
            let (parts, body) = request.into_parts();

            let mut outbound = self
                .client
                .request(parts.method, parts.uri.to_string())
                .version(parts.version)
                .headers(parts.headers);
            if !body.is_empty() {
                outbound = outbound.body(body);
            }
            Ok(outbound.send()?)
        }
    }

    /// Status, version and headers of a reqwest response, body not touched
    fn head_of(response: &reqwest::blocking::Response) -> http::response::Builder {
        let mut builder = http::Response::builder()
            .status(response.status())
            .version(response.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(response.headers().clone());
        }
        builder
    }

    impl HttpClient for ReqwestTransport {
        fn execute(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>, TransportError> {
            let response = self.send(request)?;
            let builder = head_of(&response);

            let body = response.bytes()?.to_vec();
            Ok(builder.body(body)?)
        }

        fn probe(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<()>, TransportError> {
            let response = self.send(request)?;
            // dropping the unread response closes the connection instead of draining it
            Ok(head_of(&response).body(())?)
        }
    }
}
