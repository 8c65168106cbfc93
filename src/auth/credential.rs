//! Credential extraction from the `Authorization` header.
//!
//! Parsing is deliberately forgiving: the scheme token is matched
//! case-insensitively and arbitrary whitespace is tolerated around and
//! between the scheme and its value (`"  BEARER  x"` and `"\tJWT   y  "`
//! both parse). Parsing never fails: a header this module cannot classify
//! is simply no credential, and the route's own auth requirement decides
//! what that means.

use base64::Engine;

/// A typed credential extracted from the `Authorization` header.
///
/// Derived once per request and immutable afterwards. This is pure scheme
/// dispatch: no signature verification or token lookup happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <token>`, an API key.
    ApiKey { token: String },

    /// `Authorization: Basic <base64(userId:token)>`, dashboard basic auth.
    Basic { user_id: String, token: String },

    /// `Authorization: JWT <raw>`, a dashboard session token. The raw
    /// compact form is carried through to the identity resolver unopened.
    Jwt { raw: String },

    /// Absent, empty, or unrecognized.
    None,
}

impl Credential {
    /// Parse an `Authorization` header value.
    pub fn from_header(header: Option<&str>) -> Self {
        let Some(raw) = header else {
            return Self::None;
        };
        let Some((scheme, value)) = split_scheme(raw.trim()) else {
            return Self::None;
        };

        if scheme.eq_ignore_ascii_case("bearer") {
            Self::ApiKey {
                token: value.to_string(),
            }
        } else if scheme.eq_ignore_ascii_case("basic") {
            decode_basic(value).unwrap_or(Self::None)
        } else if scheme.eq_ignore_ascii_case("jwt") {
            Self::Jwt {
                raw: value.to_string(),
            }
        } else {
            Self::None
        }
    }

    /// Whether any credential was presented.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Session-style credentials identify a dashboard login rather than an
    /// API key; they are CORS-trusted from the frontend origin only.
    pub fn is_session(&self) -> bool {
        matches!(self, Self::Basic { .. } | Self::Jwt { .. })
    }
}

/// Split `"<scheme> <value>"` at the first whitespace run.
fn split_scheme(raw: &str) -> Option<(&str, &str)> {
    let idx = raw.find(char::is_whitespace)?;
    let (scheme, rest) = raw.split_at(idx);
    let value = rest.trim();
    if scheme.is_empty() || value.is_empty() {
        return None;
    }
    Some((scheme, value))
}

/// Decode the `userId:token` pair of a basic credential. Values that are
/// not valid base64, not UTF-8, or missing the separator classify as no
/// credential rather than an error.
fn decode_basic(value: &str) -> Option<Credential> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(value).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (user_id, token) = decoded.split_once(':')?;
    Some(Credential::Basic {
        user_id: user_id.to_string(),
        token: token.to_string(),
    })
}
