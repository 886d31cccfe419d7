// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie and per-host cookie jar
//!
//! A [`CookieJar`] holds the cookies of a single host, keyed by name. It is a
//! plain value: the session reads one from the store, merges new cookies into
//! it and writes it back.

use chrono::{DateTime, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// A comma-separated segment starts a new cookie only if it opens with `name=`.
    /// Anything else (the day part of an `Expires` date, a comma in a value)
    /// continues the previous definition.
    static ref COOKIE_START: Regex = Regex::new(r"^\s*[^=;,\s]*=").unwrap();
}

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain attribute, if the server sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Path attribute, if the server sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Expiration time (None = session cookie)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    #[serde(default)]
    pub secure: bool,
    /// HttpOnly flag
    #[serde(default)]
    pub http_only: bool,
    /// SameSite attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    /// Cookie sent with all requests
    None,
    /// Cookie sent with same-site and top-level navigations
    Lax,
    /// Cookie only sent with same-site requests
    Strict,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Parse a single cookie definition (`name=value; Attr=val; Flag`)
    ///
    /// Returns `None` when the definition has no `=` or an empty name.
    pub fn parse(definition: &str) -> Option<Self> {
        let mut parts = definition.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name, value.trim());

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let val = val.trim();
                match attr.trim().to_lowercase().as_str() {
                    "domain" => cookie.domain = Some(val.trim_start_matches('.').to_string()),
                    "path" => cookie.path = Some(val.to_string()),
                    "expires" => {
                        // Max-Age takes precedence when both are present
                        if cookie.expires.is_none() {
                            cookie.expires = parse_expires(val);
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            // Out-of-range ages leave the cookie without an expiry
                            cookie.expires = chrono::Duration::try_seconds(secs)
                                .and_then(|age| Utc::now().checked_add_signed(age));
                        }
                    }
                    "samesite" => {
                        cookie.same_site = match val.to_lowercase().as_str() {
                            "strict" => Some(SameSite::Strict),
                            "lax" => Some(SameSite::Lax),
                            "none" => Some(SameSite::None),
                            _ => None,
                        };
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

fn parse_expires(val: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
        return Some(dt.with_timezone(&Utc));
    }
    // Netscape style: Wed, 21-Oct-2015 07:28:00 GMT
    NaiveDateTime::parse_from_str(val, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Split a raw `Set-Cookie` value into individual cookie definitions.
fn split_definitions(raw: &str) -> Vec<String> {
    let mut definitions: Vec<String> = Vec::new();
    for segment in raw.split(',') {
        match definitions.last_mut() {
            Some(last) if !COOKIE_START.is_match(segment) => {
                last.push(',');
                last.push_str(segment);
            }
            _ => definitions.push(segment.to_string()),
        }
    }
    definitions
}

/// Cookies of one host, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw `Set-Cookie` value, which may carry several cookies.
    ///
    /// Malformed definitions are skipped; the good ones are kept.
    pub fn parse_cookies_string(raw: &str) -> Self {
        let mut jar = CookieJar::new();
        for definition in split_definitions(raw) {
            if definition.trim().is_empty() {
                continue;
            }
            match Cookie::parse(&definition) {
                Some(cookie) => jar.insert(cookie),
                None => tracing::debug!(definition = %definition.trim(), "Skipping malformed cookie"),
            }
        }
        jar
    }

    /// Insert a cookie, replacing any cookie with the same name
    pub fn insert(&mut self, cookie: Cookie) {
        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    /// Merge another jar into this one; `other` wins on name collision
    pub fn merge(&mut self, other: CookieJar) {
        for cookie in other.cookies {
            self.insert(cookie);
        }
    }

    /// Get a cookie by name
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Remove a cookie by name
    pub fn remove(&mut self, name: &str) -> Option<Cookie> {
        let idx = self.cookies.iter().position(|c| c.name == name)?;
        Some(self.cookies.remove(idx))
    }

    /// Drop cookies whose expiry is in the past
    pub fn purge_expired(&mut self) {
        self.cookies.retain(|c| !c.is_expired());
    }

    /// Iterate over cookies
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Get cookie count
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Serialize as a `cookie` request header value
    pub fn serialize(&self) -> String {
        self.cookies
            .iter()
            .map(|c| c.to_header_value())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Export as JSON (the stored record format)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Import from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let mut jar = CookieJar::new();
        for cookie in cookies {
            jar.insert(cookie);
        }
        Ok(jar)
    }
}

impl FromIterator<Cookie> for CookieJar {
    fn from_iter<I: IntoIterator<Item = Cookie>>(iter: I) -> Self {
        let mut jar = CookieJar::new();
        for cookie in iter {
            jar.insert(cookie);
        }
        jar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parsing() {
        let cookie =
            Cookie::parse("session=abc123; Domain=.example.com; Path=/; Secure; HttpOnly; SameSite=Lax")
                .unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain.as_deref(), Some("example.com"));
        assert_eq!(cookie.path.as_deref(), Some("/"));
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site, Some(SameSite::Lax));
    }

    #[test]
    fn test_parse_multiple_with_expires_dates() {
        let raw = "sid=abc; Expires=Wed, 21 Oct 2099 07:28:00 GMT; Path=/,theme=dark, lang=fi; Max-Age=3600";
        let jar = CookieJar::parse_cookies_string(raw);

        assert_eq!(jar.len(), 3);
        assert_eq!(jar.serialize(), "sid=abc; theme=dark; lang=fi");
        assert!(jar.get("sid").unwrap().expires.is_some());
        assert!(!jar.get("sid").unwrap().is_expired());
    }

    #[test]
    fn test_parse_netscape_expires() {
        let cookie = Cookie::parse("old=1; expires=Thu, 01-Jan-1970 00:00:00 GMT").unwrap();
        assert!(cookie.is_expired());
    }

    #[test]
    fn test_parse_skips_malformed() {
        let jar = CookieJar::parse_cookies_string("good=1, =nameless, also_good=2");
        assert_eq!(jar.serialize(), "good=1; also_good=2");

        let jar = CookieJar::parse_cookies_string("noequals; Path=/");
        assert!(jar.is_empty());
    }

    #[test]
    fn test_parse_empty() {
        assert!(CookieJar::parse_cookies_string("").is_empty());
        assert!(CookieJar::parse_cookies_string("  ").is_empty());
    }

    #[test]
    fn test_value_with_comma_stays_whole() {
        let jar = CookieJar::parse_cookies_string("list=a,b,c; Path=/");
        assert_eq!(jar.get("list").unwrap().value, "a,b,c");
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let jar = CookieJar::parse_cookies_string("a=1, a=2");
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.serialize(), "a=2");
    }

    #[test]
    fn test_merge_is_right_biased() {
        let mut left: CookieJar = vec![Cookie::new("a", "1"), Cookie::new("b", "2")]
            .into_iter()
            .collect();
        let right: CookieJar = vec![Cookie::new("b", "20"), Cookie::new("c", "30")]
            .into_iter()
            .collect();

        left.merge(right);

        assert_eq!(left.serialize(), "a=1; b=20; c=30");
    }

    #[test]
    fn test_empty_jar_serializes_empty() {
        assert_eq!(CookieJar::new().serialize(), "");
        assert!(CookieJar::new().is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let mut jar = CookieJar::parse_cookies_string("keep=1, gone=2; Max-Age=0");
        assert_eq!(jar.len(), 2);

        jar.purge_expired();
        assert_eq!(jar.serialize(), "keep=1");
    }

    #[test]
    fn test_json_roundtrip_keeps_attributes() {
        let jar = CookieJar::parse_cookies_string("sid=x; Path=/app; HttpOnly");
        let restored = CookieJar::from_json(&jar.to_json().unwrap()).unwrap();

        assert_eq!(restored, jar);
        assert_eq!(restored.get("sid").unwrap().path.as_deref(), Some("/app"));
    }

    #[test]
    fn test_remove() {
        let mut jar = CookieJar::parse_cookies_string("a=1, b=2");
        assert_eq!(jar.remove("a").map(|c| c.value), Some("1".to_string()));
        assert!(jar.remove("missing").is_none());
        assert_eq!(jar.serialize(), "b=2");
    }
}
