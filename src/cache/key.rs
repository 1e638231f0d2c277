//! Deterministic cache keys derived from query parameters.

use std::fmt::{self, Display, Write};

/// Segment written for an absent optional parameter. Escaping guarantees no
/// present value renders to this text.
const ABSENT: &str = "~";

const DELIMITER: char = ':';

/// A key addressing one cached response.
///
/// Built with [`CacheKey::builder`]: the namespace first, then one segment
/// per parameter, joined by `:`. Present values have `%`, `:` and `~`
/// percent-escaped, so a value can neither forge a delimiter nor pass for the
/// absent placeholder. Two keys are equal exactly when the namespace and
/// every parameter value are.
///
/// # Examples
///
/// ```
/// use economy_api::cache::CacheKey;
///
/// let key = CacheKey::builder("item")
///     .param(3)
///     .param("Iron Ore")
///     .opt_param(None::<u32>)
///     .build();
/// assert_eq!(key.as_str(), "item:3:Iron Ore:~");
///
/// let literal = CacheKey::builder("item").param(3).param("Iron Ore").opt_param(Some("~")).build();
/// assert_ne!(key, literal);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn builder(namespace: &str) -> CacheKeyBuilder {
        let mut key = String::with_capacity(namespace.len() + 24);
        push_escaped(&mut key, namespace);
        CacheKeyBuilder { key }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> String {
        key.0
    }
}

/// Accumulates key segments; see [`CacheKey::builder`].
#[derive(Debug, Clone)]
#[must_use]
pub struct CacheKeyBuilder {
    key: String,
}

impl CacheKeyBuilder {
    /// Appends a required parameter, formatted with `Display`.
    pub fn param(mut self, value: impl Display) -> Self {
        self.key.push(DELIMITER);
        push_escaped(&mut self.key, &value.to_string());
        self
    }

    /// Appends an optional parameter; `None` becomes the placeholder segment
    /// so the key keeps the same number of segments either way.
    pub fn opt_param<T: Display>(mut self, value: Option<T>) -> Self {
        match value {
            Some(v) => self.param(v),
            None => {
                self.key.push(DELIMITER);
                self.key.push_str(ABSENT);
                self
            }
        }
    }

    pub fn build(self) -> CacheKey {
        CacheKey(self.key)
    }
}

fn push_escaped(out: &mut String, raw: &str) {
    for c in raw.chars() {
        match c {
            '%' | ':' | '~' => {
                // Writing to a String cannot fail.
                let _ = write!(out, "%{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
}
