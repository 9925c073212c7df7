//! This crate wraps an HTTP client so that requests to servers protected by Digest Auth
//! (IETF RFCs 2617 and 7616) are authenticated transparently. It can be used e.g. to talk
//! to IP cameras and embedded devices that use this authentication scheme.
//!
//! For every request the client first sends a bodiless probe with the same method and URL.
//! If the server answers 401 with a `WWW-Authenticate` challenge, the challenge is parsed,
//! an `Authorization` header is computed and attached, and only then is the real request sent.
//! Anything other than 401 means no authentication is needed and the request goes out as-is.
//!
//! # Examples
//!
//! Sending a request (uses the default reqwest-backed transport):
//!
//! ```no_run
//! use digest_client::DigestClient;
//!
//! let client = DigestClient::new("john", "hello");
//!
//! let request = http::Request::get("http://camera.local/snapshot.jpg")
//!     .body(Vec::new())
//!     .unwrap();
//! let response = client.execute(request).unwrap();
//! println!("{} - {} bytes", response.status(), response.body().len());
//! ```
//!
//! The building blocks can also be used directly:
//!
//! ```
//! use digest_client::{Algorithm, AuthContext, AuthorizationHeader};
//!
//! // Value from the WWW-Authenticate HTTP header (usually in a HTTP 401 response)
//! let www_authenticate = r#"Digest realm="example.com", qop="auth", algorithm="MD5", nonce="abc123", opaque="xyz""#;
//!
//! // Parse the challenge. Its fields are public.
//! let challenge = digest_client::parse(www_authenticate).unwrap();
//! assert_eq!(challenge.realm, "example.com");
//!
//! // The URI is the absolute URL the request is sent to.
//! let mut context = AuthContext::new("john", "hello", "GET", "http://example.com/");
//! // For this test, we inject a custom cnonce. It's generated for you otherwise.
//! context.set_custom_cnonce("aaaaaaaaaaaaaaaa");
//!
//! // The nonce count is normally taken from the client; the first one is 1.
//! let answer = AuthorizationHeader::from_challenge(&challenge, &context, 1, Algorithm::default());
//! assert_eq!(answer.to_string(), r#"Digest username="john", realm="example.com", nonce="abc123", uri="http://example.com/", algorithm="MD5", qop=auth, nc=00000001, cnonce="aaaaaaaaaaaaaaaa", response="a2cd7a75929c25d59a67b9327a857ed1", opaque="xyz""#);
//! ```

mod authorization;
mod challenge;
mod client;
mod enums;
mod error;
mod transport;

pub use error::{Directives, Error, Result, TransportError};

pub use crate::authorization::{AuthContext, AuthorizationHeader, NonceCounter, CNONCE_LEN};
pub use crate::challenge::{parse_header_map, Challenge, ParseMode, REQUIRED_DIRECTIVES};
pub use crate::client::{Credentials, DigestClient, DigestClientBuilder, Probe};
pub use crate::enums::*;
pub use crate::transport::HttpClient;

#[cfg(feature = "blocking")]
pub use crate::transport::ReqwestTransport;

/// Parse the WWW-Authenticate header value.
/// It's just a convenience method to call [`Challenge::parse()`](struct.Challenge.html#method.parse).
pub fn parse(www_authenticate: &str) -> Result<Challenge> {
    Challenge::parse(www_authenticate)
}

#[test]
fn test_parse_respond() {
    let src = r#"
    Digest
       realm="http-auth@example.org",
       qop="auth, auth-int",
       algorithm=MD5,
       nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
       opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS"
    "#;

    let mut context = AuthContext::new("Mufasa", "Circle of Life", "GET", "/dir/index.html");
    context.set_custom_cnonce("f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ");

    let challenge = crate::parse(src).unwrap();
    let answer = AuthorizationHeader::from_challenge(&challenge, &context, 1, Algorithm::default());

    let str = answer.to_string().replace(", ", ",\n  ");

    assert_eq!(
        str,
        r#"
Digest username="Mufasa",
  realm="http-auth@example.org",
  nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
  uri="/dir/index.html",
  algorithm="MD5",
  qop=auth,
  nc=00000001,
  cnonce="f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ",
  response="8ca523f5e9506fed4657c9700eebdbec",
  opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS"
"#
        .trim()
    );
}
