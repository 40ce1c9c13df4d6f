//! Gate decisions and redirect targets.

use crate::cookie::SetCookie;

/// What the HTTP layer should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Forward the request unchanged
    Continue,
    /// Forward the request and set these cookies on the response
    ContinueWithRefreshedCookies(Vec<SetCookie>),
    /// Answer with a redirect instead of forwarding
    RedirectTo(Redirect),
}

impl GateDecision {
    /// Returns `true` for [`GateDecision::RedirectTo`].
    pub fn is_redirect(&self) -> bool {
        matches!(self, GateDecision::RedirectTo(_))
    }

    /// The redirect target, if this decision redirects.
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            GateDecision::RedirectTo(redirect) => Some(redirect),
            _ => None,
        }
    }

    /// Cookies to set on the response; empty unless refreshing.
    pub fn refreshed_cookies(&self) -> &[SetCookie] {
        match self {
            GateDecision::ContinueWithRefreshedCookies(cookies) => cookies,
            _ => &[],
        }
    }
}

/// A redirect target: a path plus a query string.
///
/// A query carried over with [`Redirect::with_raw_query`] is forwarded
/// byte for byte. It is only re-encoded once [`Redirect::with_param`]
/// changes it.
///
/// # Examples
///
/// ```
/// use site_gate::Redirect;
///
/// let redirect = Redirect::to("/auth/login").with_param("redirectTo", "/admin/dashboard");
///
/// assert_eq!(redirect.param("redirectTo"), Some("/admin/dashboard"));
/// assert_eq!(redirect.location(), "/auth/login?redirectTo=%2Fadmin%2Fdashboard");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    path: String,
    raw_query: Option<String>,
    query: Vec<(String, String)>,
}

impl Redirect {
    /// A redirect to `path` with no query.
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            raw_query: None,
            query: Vec::new(),
        }
    }

    /// Carries over a raw (encoded) query string unchanged.
    #[must_use]
    pub fn with_raw_query(mut self, raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return self;
        };
        self.query.extend(parse_query(raw));
        self.raw_query = Some(match self.raw_query.take() {
            Some(existing) => format!("{}&{}", existing, raw),
            None => raw.to_string(),
        });
        self
    }

    /// Sets a parameter, replacing every existing pair with the same name.
    ///
    /// The replacement takes the position of the first removed pair, or is
    /// appended if the name was absent.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();

        match self.query.iter().position(|(k, _)| *k == name) {
            Some(first) => {
                self.query[first].1 = value;
                let mut index = 0;
                self.query.retain(|(k, _)| {
                    let keep = index <= first || *k != name;
                    index += 1;
                    keep
                });
            }
            None => self.query.push((name, value)),
        }
        self.raw_query = Some(encode_query(&self.query));
        self
    }

    /// Target path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded query pairs, in order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// First decoded value of the named parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the `Location` header value.
    ///
    /// Parameters set through [`Redirect::with_param`] are form-encoded.
    pub fn location(&self) -> String {
        match &self.raw_query {
            Some(raw) => format!("{}?{}", self.path, raw),
            None => self.path.clone(),
        }
    }
}

/// Splits an `application/x-www-form-urlencoded` string into decoded pairs.
fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(name), decode_component(value))
        })
        .collect()
}

fn encode_query(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (i, (name, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        encode_component(name, &mut out);
        out.push('=');
        encode_component(value, &mut out);
    }
    out
}

fn decode_component(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Form-encodes `input` onto `out`: unreserved bytes pass through, space
/// becomes `+`, everything else is `%XX`.
fn encode_component(input: &str, out: &mut String) {
    for byte in input.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
                out.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
            }
        }
    }
}
