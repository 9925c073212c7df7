use crate::error::Directives;
use crate::{Error, Error::*, Result};
use std::str::FromStr;

/// Directive names a challenge must carry, all of them non-empty
pub const REQUIRED_DIRECTIVES: [&str; 5] = ["algorithm", "nonce", "opaque", "qop", "realm"];

/// How the WWW-Authenticate value is split into directives
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ParseMode {
    /// Split on commas and match directive names by substring.
    /// Tolerant of sloppy servers; values must not contain commas.
    #[default]
    Permissive,
    /// Quote-aware tokenizer with exact, case-insensitive directive names.
    Strict,
}

/// Digest challenge parsed from a `WWW-Authenticate` header value
#[derive(Debug, PartialEq, Clone)]
pub struct Challenge {
    /// Authorization realm (i.e. hostname, serial number...)
    pub realm: String,
    /// Server nonce
    pub nonce: String,
    /// Server opaque string, echoed back verbatim
    pub opaque: String,
    /// Quality of protection, e.g. `auth`
    pub qop: String,
    /// Hashing algorithm as named by the server
    pub algorithm: String,
}

impl Challenge {
    /// Parse using the permissive algorithm.
    ///
    /// # Errors
    /// `InvalidChallengeHeader` with the partial directive map if any of
    /// the five required directives is missing or empty.
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_with(input, ParseMode::Permissive)
    }

    /// Parse using the selected [`ParseMode`](enum.ParseMode.html)
    pub fn parse_with(input: &str, mode: ParseMode) -> Result<Self> {
        let parts = match mode {
            ParseMode::Permissive => scan_directives(input),
            ParseMode::Strict => {
                let mut parts = parse_header_map(strip_scheme(input))?;
                if let Some(qop) = parts.get_mut("qop") {
                    // a list of options was offered; take the first one
                    if let Some(first) = qop.split(',').next() {
                        *qop = first.trim().to_string();
                    }
                }
                parts
            }
        };

        Self::from_directives(parts)
    }

    fn from_directives(mut parts: Directives) -> Result<Self> {
        let complete = REQUIRED_DIRECTIVES
            .iter()
            .all(|name| parts.get(*name).map_or(false, |v| !v.is_empty()));
        if !complete {
            return Err(InvalidChallengeHeader(parts));
        }

        let mut take = |name: &str| parts.remove(name).unwrap_or_default();
        Ok(Challenge {
            realm: take("realm"),
            nonce: take("nonce"),
            opaque: take("opaque"),
            qop: take("qop"),
            algorithm: take("algorithm"),
        })
    }
}

impl FromStr for Challenge {
    type Err = Error;

    /// Parse HTTP header
    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}

/// Comma-split substring scan. A segment naming a directive yields the text
/// between its first pair of quotes, or if unquoted, everything after the first `=`.
/// Later segments overwrite earlier ones.
fn scan_directives(input: &str) -> Directives {
    let mut parts = Directives::new();

    for segment in input.split(',') {
        for name in REQUIRED_DIRECTIVES.iter() {
            if !segment.contains(name) {
                continue;
            }

            if segment.contains('"') {
                if let Some(value) = segment.split('"').nth(1) {
                    parts.insert(name.to_string(), value.to_string());
                }
            } else if let Some((_, value)) = segment.split_once('=') {
                parts.insert(name.to_string(), value.to_string());
            }
        }
    }

    parts
}

fn strip_scheme(input: &str) -> &str {
    let input = input.trim();
    strip_digest_scheme(input).unwrap_or(input)
}

/// Directives following a leading `Digest` scheme token, or None if the value is
/// another scheme. The token must end at whitespace or at the end of the value.
pub(crate) fn strip_digest_scheme(value: &str) -> Option<&str> {
    let value = value.trim_start();
    let scheme = value.get(.."Digest".len())?;
    let rest = &value["Digest".len()..];

    if scheme.eq_ignore_ascii_case("Digest") && rest.chars().next().map_or(true, char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

/// Helper func that parses the key-value string received from server.
/// Names are lower-cased; quoted values may contain commas and backslash escapes.
pub fn parse_header_map(input: &str) -> Result<Directives> {
    #[derive(Debug)]
    #[allow(non_camel_case_types)]
    enum ParserState {
        P_WHITE,
        P_NAME(usize),
        P_NAME_END(usize, usize),
        P_VALUE_BEGIN,
        P_VALUE_QUOTED,
        P_VALUE_QUOTED_NEXTLITERAL,
        P_VALUE_PLAIN,
    }

    let mut state = ParserState::P_WHITE;

    let mut parsed = Directives::new();
    let mut current_token = String::new();
    let mut current_value = String::new();

    for (pos, c) in input.char_indices() {
        match state {
            ParserState::P_WHITE => {
                if c.is_alphabetic() {
                    state = ParserState::P_NAME(pos);
                }
            }
            ParserState::P_NAME(name_start) => {
                if c == '=' {
                    current_token = input[name_start..pos].to_ascii_lowercase();
                    state = ParserState::P_VALUE_BEGIN;
                } else if c == ',' {
                    // bare token without a value
                    state = ParserState::P_WHITE;
                } else if c.is_whitespace() {
                    state = ParserState::P_NAME_END(name_start, pos);
                }
            }
            ParserState::P_NAME_END(name_start, name_end) => {
                if c == '=' {
                    current_token = input[name_start..name_end].to_ascii_lowercase();
                    state = ParserState::P_VALUE_BEGIN;
                } else if c == ',' {
                    state = ParserState::P_WHITE;
                } else if c.is_alphabetic() {
                    state = ParserState::P_NAME(pos);
                }
            }
            ParserState::P_VALUE_BEGIN => {
                current_value.clear();
                state = match c {
                    '"' => ParserState::P_VALUE_QUOTED,
                    ',' => {
                        parsed.insert(current_token.clone(), String::new());
                        ParserState::P_WHITE
                    }
                    _ if c.is_whitespace() => ParserState::P_VALUE_BEGIN,
                    _ => {
                        current_value.push(c);
                        ParserState::P_VALUE_PLAIN
                    }
                };
            }
            ParserState::P_VALUE_QUOTED => {
                match c {
                    '"' => {
                        parsed.insert(current_token.clone(), current_value.clone());
                        current_value.clear();
                        state = ParserState::P_WHITE;
                    }
                    '\\' => {
                        state = ParserState::P_VALUE_QUOTED_NEXTLITERAL;
                    }
                    _ => {
                        current_value.push(c);
                    }
                };
            }
            ParserState::P_VALUE_PLAIN => {
                if c == ',' || c.is_ascii_whitespace() {
                    parsed.insert(current_token.clone(), current_value.clone());
                    current_value.clear();
                    state = ParserState::P_WHITE;
                } else {
                    current_value.push(c);
                }
            }
            ParserState::P_VALUE_QUOTED_NEXTLITERAL => {
                current_value.push(c);
                state = ParserState::P_VALUE_QUOTED
            }
        }
    }

    match state {
        ParserState::P_VALUE_PLAIN => {
            parsed.insert(current_token, current_value); // consume the value here
        }
        ParserState::P_WHITE | ParserState::P_NAME(_) | ParserState::P_NAME_END(..) => {}
        // unterminated quote or dangling '='
        _ => return Err(InvalidChallengeHeader(parsed)),
    }

    Ok(parsed)
}
