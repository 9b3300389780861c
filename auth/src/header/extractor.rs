use http::header::AUTHORIZATION;
use http::HeaderMap;
use http::HeaderValue;

/// Authorization scheme a caller is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `Authorization: ApiKey <key>`
    ApiKey,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Bearer => "Bearer",
            Scheme::ApiKey => "ApiKey",
        }
    }
}

/// Outcome of reading a credential from the `Authorization` header.
///
/// Extraction never fails: deciding whether a missing or garbled credential is
/// an authorization failure is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// No `Authorization` header, or an empty one.
    Absent,
    /// A header is present but is not `<scheme> <value>` for the requested scheme.
    Malformed,
    /// The credential value, verbatim.
    Present(String),
}

impl Credential {
    /// The credential value, if one was present.
    pub fn value(&self) -> Option<&str> {
        match self {
            Credential::Present(value) => Some(value),
            _ => None,
        }
    }

    /// The credential value, or `""` for both absent and malformed headers.
    pub fn token_or_empty(&self) -> &str {
        self.value().unwrap_or("")
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Credential::Present(_))
    }
}

/// Extract a bearer token from request headers.
pub fn bearer_token(headers: &HeaderMap) -> Credential {
    extract_from_headers(headers, Scheme::Bearer)
}

/// Extract an API key from request headers.
pub fn api_key(headers: &HeaderMap) -> Credential {
    extract_from_headers(headers, Scheme::ApiKey)
}

/// Extract a credential of `scheme` from the `Authorization` header.
///
/// Header name lookup is case-insensitive. Only the first `Authorization`
/// header is considered.
pub fn extract_from_headers(headers: &HeaderMap, scheme: Scheme) -> Credential {
    match headers.get(AUTHORIZATION) {
        None => Credential::Absent,
        Some(value) => extract_header_value(value, scheme),
    }
}

fn extract_header_value(value: &HeaderValue, scheme: Scheme) -> Credential {
    match value.to_str() {
        Ok(value) => extract(Some(value), scheme),
        Err(_) => Credential::Malformed,
    }
}

/// Extract a credential of `scheme` from a raw `Authorization` header value.
///
/// The value must split on single spaces into exactly two parts; the first is
/// compared to the scheme keyword case-insensitively, the second is returned
/// unchanged.
pub fn extract(value: Option<&str>, scheme: Scheme) -> Credential {
    let value = match value {
        None | Some("") => return Credential::Absent,
        Some(value) => value,
    };

    let mut parts = value.split(' ');
    let (Some(keyword), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Credential::Malformed;
    };

    if !keyword.eq_ignore_ascii_case(scheme.as_str()) || token.is_empty() {
        return Credential::Malformed;
    }

    Credential::Present(token.to_string())
}
