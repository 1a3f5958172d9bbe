use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use studyhub_shared::constants::SESSION_COOKIE_PATH;

use crate::error::SessionError;
use crate::storage::{expiry_from_now, SessionSlot};

const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Marks values written by this jar. Anything without it is kept raw, even
/// when it happens to be valid base64.
const ENCODED_PREFIX: &str = "v1.";

/// Cookie values are JSON text; encoding keeps `;`, `,`, quotes and spaces
/// out of the header.
fn encode_value(raw: &str) -> String {
    format!(
        "{ENCODED_PREFIX}{}",
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw.as_bytes())
    )
}

fn decode_value(encoded: &str) -> String {
    encoded
        .strip_prefix(ENCODED_PREFIX)
        .and_then(|body| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(body).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| encoded.to_string())
}

/// One browser-style cookie: strict same-site, scoped to the whole app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    /// Decoded value.
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
}

impl SessionCookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        max_age: Duration,
    ) -> Result<Self, SessionError> {
        Ok(Self {
            name: name.into(),
            value: value.into(),
            expires: expiry_from_now(max_age)?,
            path: SESSION_COOKIE_PATH.to_string(),
        })
    }

    /// Empty cookie dated at the epoch (`DateTime::default()`); sending it deletes the cookie.
    pub fn removal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            expires: DateTime::<Utc>::default(),
            path: SESSION_COOKIE_PATH.to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        crate::storage::is_expired(self.expires)
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        let value = if self.value.is_empty() {
            String::new()
        } else {
            encode_value(&self.value)
        };
        format!(
            "{}={}; Expires={}; Path={}; SameSite=Strict",
            self.name,
            value,
            self.expires.format(EXPIRES_FORMAT),
            self.path
        )
    }

    /// Parse a `Set-Cookie` header value produced by [`Self::to_set_cookie`].
    ///
    /// A cookie without `Expires` is treated as never expiring.
    pub fn parse_set_cookie(header: &str) -> Option<Self> {
        let mut parts = header.split(';').map(str::trim);
        let (name, value) = parts.next()?.split_once('=')?;
        if name.is_empty() {
            return None;
        }
        let mut cookie = Self {
            name: name.to_string(),
            value: decode_value(value),
            expires: DateTime::<Utc>::MAX_UTC,
            path: SESSION_COOKIE_PATH.to_string(),
        };
        for attr in parts {
            let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
            if key.eq_ignore_ascii_case("expires") {
                cookie.expires = DateTime::parse_from_rfc2822(val)
                    .ok()?
                    .with_timezone(&Utc);
            } else if key.eq_ignore_ascii_case("path") {
                cookie.path = val.to_string();
            }
        }
        Some(cookie)
    }
}

/// In-process cookie store mirroring `document.cookie` semantics.
///
/// Every write is also queued as a `Set-Cookie` header so a server-rendered
/// target can forward it to the browser. Only the latest pending header per
/// cookie name is kept.
#[derive(Debug, Default)]
pub struct CookieJar {
    inner: Mutex<JarState>,
}

#[derive(Debug, Default)]
struct JarState {
    cookies: BTreeMap<String, SessionCookie>,
    outgoing: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar seeded from a `Cookie:` request header (`a=1; b=2`).
    ///
    /// Request headers carry no expiry; the browser has already dropped
    /// expired cookies, so every entry is treated as live.
    pub fn from_header(header: &str) -> Self {
        let jar = Self::new();
        {
            let mut state = jar.lock();
            for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                state.cookies.insert(
                    name.to_string(),
                    SessionCookie {
                        name: name.to_string(),
                        value: decode_value(value.trim()),
                        expires: DateTime::<Utc>::MAX_UTC,
                        path: SESSION_COOKIE_PATH.to_string(),
                    },
                );
            }
        }
        jar
    }

    fn lock(&self) -> MutexGuard<'_, JarState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a cookie. An already-expired cookie deletes any existing one.
    pub fn set(&self, cookie: SessionCookie) {
        let mut state = self.lock();
        state.outgoing.retain(|(name, _)| *name != cookie.name);
        state
            .outgoing
            .push((cookie.name.clone(), cookie.to_set_cookie()));
        if cookie.is_expired() {
            state.cookies.remove(&cookie.name);
        } else {
            state.cookies.insert(cookie.name.clone(), cookie);
        }
    }

    /// Apply a `Set-Cookie` header value. Returns `false` if it does not parse.
    pub fn apply_set_cookie(&self, header: &str) -> bool {
        match SessionCookie::parse_set_cookie(header) {
            Some(cookie) => {
                let mut state = self.lock();
                if cookie.is_expired() {
                    state.cookies.remove(&cookie.name);
                } else {
                    state.cookies.insert(cookie.name.clone(), cookie);
                }
                true
            }
            None => false,
        }
    }

    /// Live value for `name`. Expired cookies are dropped on access.
    pub fn get(&self, name: &str) -> Option<String> {
        let mut state = self.lock();
        if state.cookies.get(name)?.is_expired() {
            state.cookies.remove(name);
            return None;
        }
        state.cookies.get(name).map(|cookie| cookie.value.clone())
    }

    pub fn remove(&self, name: &str) {
        self.set(SessionCookie::removal(name));
    }

    /// Render live cookies as a `Cookie:` request header.
    pub fn header(&self) -> String {
        let state = self.lock();
        state
            .cookies
            .values()
            .filter(|c| !c.is_expired())
            .map(|c| format!("{}={}", c.name, encode_value(&c.value)))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Drain `Set-Cookie` headers queued by writes since the last call.
    pub fn take_set_cookie_headers(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().outgoing)
            .into_iter()
            .map(|(_, header)| header)
            .collect()
    }
}

/// Durable slot backed by one named cookie in a shared jar.
#[derive(Debug, Clone)]
pub struct CookieSlot {
    jar: Arc<CookieJar>,
    name: String,
}

impl CookieSlot {
    pub fn new(jar: Arc<CookieJar>, name: impl Into<String>) -> Self {
        Self {
            jar,
            name: name.into(),
        }
    }

    pub fn jar(&self) -> &Arc<CookieJar> {
        &self.jar
    }
}

impl SessionSlot for CookieSlot {
    fn read(&self) -> Result<Option<String>, SessionError> {
        Ok(self.jar.get(&self.name).filter(|v| !v.is_empty()))
    }

    fn write(&self, value: &str, max_age: Duration) -> Result<(), SessionError> {
        self.jar
            .set(SessionCookie::new(self.name.clone(), value, max_age)?);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.jar.remove(&self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"{"identity":"u1","displayName":"Jane Doe","role":"student"}"#;

    #[test]
    fn set_cookie_has_strict_attributes() {
        let cookie = SessionCookie::new("user", PROFILE, Duration::days(7)).unwrap();
        let header = cookie.to_set_cookie();
        assert!(header.starts_with("user="));
        assert!(header.contains("; Path=/"));
        assert!(header.ends_with("SameSite=Strict"));
        assert!(header.contains(" GMT;"));
        let value = header
            .split(';')
            .next()
            .unwrap()
            .trim_start_matches("user=");
        assert!(!value.contains(' '));
        assert!(!value.contains(','));
        assert!(!value.contains('"'));
    }

    #[test]
    fn removal_cookie_is_dated_at_epoch() {
        let header = SessionCookie::removal("user").to_set_cookie();
        assert_eq!(
            header,
            "user=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/; SameSite=Strict"
        );
    }

    #[test]
    fn set_cookie_header_parses_back() {
        let cookie = SessionCookie::new("user", PROFILE, Duration::days(7)).unwrap();
        let parsed = SessionCookie::parse_set_cookie(&cookie.to_set_cookie()).unwrap();
        assert_eq!(parsed.name, "user");
        assert_eq!(parsed.value, PROFILE);
        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.expires.timestamp(), cookie.expires.timestamp());
    }

    #[test]
    fn jar_expires_cookies() {
        let jar = CookieJar::new();
        jar.set(SessionCookie::new("user", "x", Duration::seconds(-5)).unwrap());
        assert!(jar.get("user").is_none());
    }

    #[test]
    fn jar_header_roundtrips_through_from_header() {
        let jar = CookieJar::new();
        jar.set(SessionCookie::new("user", PROFILE, Duration::days(7)).unwrap());
        jar.set(SessionCookie::new("theme", "dark", Duration::days(7)).unwrap());

        let restored = CookieJar::from_header(&jar.header());
        assert_eq!(restored.get("user").as_deref(), Some(PROFILE));
        assert_eq!(restored.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn from_header_keeps_foreign_values_raw() {
        let jar = CookieJar::from_header("user=not base64!; other=1");
        assert_eq!(jar.get("user").as_deref(), Some("not base64!"));
    }

    #[test]
    fn from_header_skips_malformed_pairs() {
        let jar = CookieJar::from_header("garbage; =nameless; ok=v1.b2s");
        assert!(jar.get("garbage").is_none());
        assert_eq!(jar.get("ok").as_deref(), Some("ok"));
    }

    #[test]
    fn unmarked_base64_values_stay_raw() {
        let jar = CookieJar::from_header("ok=b2s; theme=ZGFyaw");
        assert_eq!(jar.get("ok").as_deref(), Some("b2s"));
        assert_eq!(jar.get("theme").as_deref(), Some("ZGFyaw"));
    }

    #[test]
    fn encoded_values_carry_prefix() {
        let cookie = SessionCookie::new("user", PROFILE, Duration::days(7)).unwrap();
        assert!(cookie.to_set_cookie().starts_with("user=v1."));
    }

    #[test]
    fn apply_set_cookie_removal_deletes() {
        let jar = CookieJar::new();
        jar.set(SessionCookie::new("user", "x", Duration::days(7)).unwrap());
        assert!(jar.apply_set_cookie(&SessionCookie::removal("user").to_set_cookie()));
        assert!(jar.get("user").is_none());
        assert!(!jar.apply_set_cookie("no equals sign"));
    }

    #[test]
    fn writes_queue_set_cookie_headers() {
        let jar = Arc::new(CookieJar::new());
        let slot = CookieSlot::new(jar.clone(), "user");
        slot.write(PROFILE, Duration::days(7)).unwrap();
        slot.clear().unwrap();

        jar.set(SessionCookie::new("theme", "dark", Duration::days(7)).unwrap());

        let headers = jar.take_set_cookie_headers();
        assert_eq!(headers.len(), 2);
        assert!(headers[0].starts_with("user=;"));
        assert!(headers[0].contains("1970"));
        assert!(headers[1].starts_with("theme="));
        assert!(jar.take_set_cookie_headers().is_empty());
    }

    #[test]
    fn repeated_writes_keep_one_pending_header() {
        let jar = Arc::new(CookieJar::new());
        let slot = CookieSlot::new(jar.clone(), "user");
        for _ in 0..50 {
            slot.write(PROFILE, Duration::days(7)).unwrap();
        }
        let headers = jar.take_set_cookie_headers();
        assert_eq!(headers.len(), 1);
        assert!(headers[0].starts_with("user=v1."));
    }

    #[test]
    fn cookie_slot_roundtrip_and_clear() {
        let slot = CookieSlot::new(Arc::new(CookieJar::new()), "user");
        assert!(slot.read().unwrap().is_none());
        slot.write(PROFILE, Duration::days(7)).unwrap();
        assert_eq!(slot.read().unwrap().as_deref(), Some(PROFILE));
        slot.clear().unwrap();
        assert!(slot.read().unwrap().is_none());
    }
}
