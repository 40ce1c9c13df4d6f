//! Cookie parsing and `Set-Cookie` instructions.
//!
//! Inbound cookies are parsed into a [`CookieJar`], which is also what the
//! gate hands to the session service as the request's session credentials.
//! Refreshed cookies come back as [`SetCookie`] values: plain data that the
//! HTTP layer renders into `Set-Cookie` headers.
//!
//! Cookie values are session tokens, so `Debug` output of both types shows
//! names only.

use std::fmt;

/// Name-to-value mapping of the cookies sent with a request.
///
/// Cookies keep the order the client sent them in.
///
/// # Examples
///
/// ```
/// use site_gate::CookieJar;
///
/// let jar = CookieJar::parse("theme=dark; sb-access=abc");
/// assert_eq!(jar.get("theme"), Some("dark"));
/// assert_eq!(jar.to_header_value(), "theme=dark; sb-access=abc");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single `Cookie` header value.
    pub fn parse(header: &str) -> Self {
        let mut jar = Self::new();
        jar.extend_from_header(header);
        jar
    }

    /// Adds every pair from a `Cookie` header value.
    ///
    /// Segments without `=` or with an empty name are skipped; a later
    /// duplicate name replaces the earlier value in place.
    pub fn extend_from_header(&mut self, header: &str) {
        for segment in header.split(';') {
            let Some((name, value)) = segment.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            self.set(name, value);
        }
    }

    /// Sets a cookie, replacing any previous value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Removes a cookie, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns the value of a cookie.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the jar holds the named cookie.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of cookies in the jar.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the jar holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in the order they were sent.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the jar as a `Cookie` header value.
    pub fn to_header_value(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Applies refreshed cookies to a raw `Cookie` header value.
///
/// Only segments naming a refreshed cookie change: a removal (`Max-Age=0`)
/// drops them, any other instruction replaces the value in place. Cookies
/// the client did not send are appended. Everything else, including order
/// and segments without `=`, is forwarded as sent. When several
/// instructions name the same cookie the last one wins.
pub fn rewrite_cookie_header(header: &str, cookies: &[SetCookie]) -> String {
    let mut applied: Vec<&str> = Vec::new();
    let mut segments: Vec<String> = Vec::new();

    for segment in header.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let refreshed = segment
            .split_once('=')
            .and_then(|(name, _)| latest(cookies, name.trim()));
        match refreshed {
            Some(cookie) => {
                if applied.contains(&cookie.name.as_str()) {
                    continue;
                }
                applied.push(&cookie.name);
                if !cookie.is_removal() {
                    segments.push(format!("{}={}", cookie.name, cookie.value));
                }
            }
            None => segments.push(segment.to_string()),
        }
    }

    for cookie in cookies {
        if applied.contains(&cookie.name.as_str()) {
            continue;
        }
        applied.push(&cookie.name);
        if let Some(cookie) = latest(cookies, &cookie.name).filter(|c| !c.is_removal()) {
            segments.push(format!("{}={}", cookie.name, cookie.value));
        }
    }

    segments.join("; ")
}

fn latest<'a>(cookies: &'a [SetCookie], name: &str) -> Option<&'a SetCookie> {
    cookies.iter().rev().find(|c| c.name == name)
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.iter().map(|(k, _)| k))
            .finish()
    }
}

/// The `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    Lax,
    /// `SameSite=None`
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// An instruction to set (or clear) one cookie on the outgoing response.
///
/// # Examples
///
/// ```
/// use site_gate::{SameSite, SetCookie};
///
/// let cookie = SetCookie::new("sb-access", "tok")
///     .path("/")
///     .max_age(3600)
///     .http_only(true)
///     .same_site(SameSite::Lax);
///
/// assert_eq!(
///     cookie.to_string(),
///     "sb-access=tok; Path=/; Max-Age=3600; HttpOnly; SameSite=Lax"
/// );
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: String,
    value: String,
    path: Option<String>,
    domain: Option<String>,
    max_age: Option<i64>,
    expires: Option<String>,
    http_only: bool,
    secure: bool,
    same_site: Option<SameSite>,
}

impl SetCookie {
    /// Creates a cookie instruction with no attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: None,
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    /// An instruction that deletes the named cookie.
    pub fn removal(name: impl Into<String>) -> Self {
        Self::new(name, "").path("/").max_age(0)
    }

    /// Sets the `Path` attribute.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the `Domain` attribute.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the `Max-Age` attribute, in seconds.
    #[must_use]
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Sets the `Expires` attribute to a preformatted HTTP date.
    #[must_use]
    pub fn expires(mut self, http_date: impl Into<String>) -> Self {
        self.expires = Some(http_date.into());
        self
    }

    /// Sets the `HttpOnly` flag.
    #[must_use]
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Sets the `Secure` flag.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the `SameSite` attribute.
    #[must_use]
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` if this instruction deletes the cookie.
    pub fn is_removal(&self) -> bool {
        matches!(self.max_age, Some(age) if age <= 0)
    }

    /// Returns `true` if the instruction renders as exactly one cookie.
    ///
    /// The name must be a token and the value a run of cookie octets,
    /// optionally double-quoted. Attribute values may not contain `;` or
    /// control characters.
    pub fn is_well_formed(&self) -> bool {
        let value = self
            .value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(&self.value);

        !self.name.is_empty()
            && self.name.bytes().all(is_token_byte)
            && value.bytes().all(is_cookie_octet)
            && [&self.path, &self.domain, &self.expires]
                .into_iter()
                .flatten()
                .all(|attr| attr.bytes().all(is_attribute_byte))
    }
}

fn is_token_byte(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7e) && !b"()<>@,;:\\\"/[]?={}".contains(&byte)
}

fn is_cookie_octet(byte: u8) -> bool {
    matches!(byte, 0x21 | 0x23..=0x2b | 0x2d..=0x3a | 0x3c..=0x5b | 0x5d..=0x7e)
}

fn is_attribute_byte(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7e) && byte != b';'
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        if let Some(expires) = &self.expires {
            write!(f, "; Expires={}", expires)?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("path", &self.path)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}
