use crate::{Algorithm, Challenge};
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the generated client nonce
pub const CNONCE_LEN: usize = 16;

/// Per-client nonce count (`nc`).
///
/// Starts at 0 and hands out 1, 2, 3... Safe to share between threads;
/// two concurrent authorizations never receive the same value.
#[derive(Debug, Default)]
pub struct NonceCounter {
    count: AtomicU32,
}

impl NonceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by one and return the new value
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    /// Last value handed out, 0 if none yet
    pub fn current(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

/// Login attempt context
///
/// All fields are borrowed; it is normally meaningful only for the one request.
#[derive(Debug)]
pub struct AuthContext<'a> {
    /// Login username
    pub username: &'a str,
    /// Login password (plain)
    pub password: &'a str,
    /// HTTP method used, e.g. `GET`
    pub method: &'a str,
    /// Requested URI, the absolute URL exactly as sent
    pub uri: &'a str,
    /// Spoofed client nonce (use only for tests; a random nonce is generated automatically)
    pub cnonce: Option<&'a str>,
}

impl<'a> AuthContext<'a> {
    pub fn new(username: &'a str, password: &'a str, method: &'a str, uri: &'a str) -> Self {
        Self {
            username,
            password,
            method,
            uri,
            cnonce: None,
        }
    }

    pub fn set_custom_cnonce(&mut self, cnonce: &'a str) {
        self.cnonce = Some(cnonce);
    }
}

/// Header sent back to the server, including password hashes.
#[derive(Debug)]
pub struct AuthorizationHeader<'ctx> {
    /// The challenge that triggered the authentication flow
    pub challenge: &'ctx Challenge,
    pub username: &'ctx str,
    pub uri: &'ctx str,
    /// Nonce count this header was computed with
    pub nc: u32,
    /// Client nonce
    pub cnonce: String,
    /// Computed digest
    pub response: String,
}

impl<'a> AuthorizationHeader<'a> {
    /// Compute the response for a challenge. `nc` must already be incremented by the caller.
    pub fn from_challenge(
        challenge: &'a Challenge,
        context: &AuthContext<'a>,
        nc: u32,
        algorithm: Algorithm,
    ) -> AuthorizationHeader<'a> {
        let h = algorithm;

        let cnonce = match context.cnonce {
            Some(cnonce) => cnonce.to_owned(),
            None => generate_cnonce(),
        };

        let ha1 = {
            let a1 = h.hash_parts(&[context.username, &challenge.realm, context.password]);
            if h.sess {
                h.hash_parts(&[&a1, &challenge.nonce, &cnonce])
            } else {
                a1
            }
        };

        let ha2 = h.hash_parts(&[context.method, context.uri]);

        let response = h.hash_parts(&[
            &ha1,
            &challenge.nonce,
            &format!("{:08x}", nc),
            &cnonce,
            &challenge.qop,
            &ha2,
        ]);

        AuthorizationHeader {
            challenge,
            username: context.username,
            uri: context.uri,
            nc,
            cnonce,
            response,
        }
    }

    /// Produce a header string (also accessible through the Display trait)
    pub fn to_header_string(&self) -> String {
        self.to_string()
    }
}

impl<'a> Display for AuthorizationHeader<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", algorithm=\"{}\", \
             qop={}, nc={:08x}, cnonce=\"{}\", response=\"{}\", opaque=\"{}\"",
            self.username,
            self.challenge.realm,
            self.challenge.nonce,
            self.uri,
            self.challenge.algorithm,
            self.challenge.qop,
            self.nc,
            self.cnonce,
            self.response,
            self.challenge.opaque,
        )
    }
}

/// Fresh random client nonce
pub fn generate_cnonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CNONCE_LEN)
        .map(char::from)
        .collect()
}
