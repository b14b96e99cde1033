//! HTTP cache control module
//!
//! Builds `Cache-Control`/`Expires` response headers from a policy and reads
//! the request-side revalidation directives.

use crate::error::ServeError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Cache-Control options, validated into a [`CacheDirective`]
///
/// Without options the response is `public` with no `Expires`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheControl {
    /// Explicit `public`; None means "public unless private/no-cache"
    pub public: Option<bool>,
    pub private: bool,
    pub no_cache: bool,
    pub no_store: bool,
    pub no_transform: bool,
    /// `max-age` in seconds
    pub max_age: Option<u64>,
    /// `s-maxage` in seconds
    pub s_maxage: Option<u64>,
}

/// When the `Expires` header should point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expires {
    /// No `Expires` header
    Omit,
    /// A time in the past, forcing revalidation
    Past,
    /// Response time plus the given duration
    After(Duration),
}

impl Expires {
    /// Absolute expiry relative to `now`, None when omitted
    pub fn at(self, now: SystemTime) -> Option<SystemTime> {
        match self {
            Self::Omit => None,
            Self::Past => Some(UNIX_EPOCH),
            Self::After(delta) => Some(now + delta),
        }
    }
}

/// Validated Cache-Control header value plus its `Expires` policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirective {
    pub header: String,
    pub expires: Expires,
}

impl CacheControl {
    /// Validate the options and render the header
    ///
    /// Token order is fixed: base token, `no-store`, `no-transform`,
    /// `max-age=N`, `s-maxage=N`.
    ///
    /// # Examples
    /// ```
    /// use fileserve::http::cache::CacheControl;
    ///
    /// let cc = CacheControl { max_age: Some(60), s_maxage: Some(30), ..Default::default() };
    /// assert_eq!(cc.build().unwrap().header, "public, max-age=60, s-maxage=30");
    /// ```
    pub fn build(&self) -> Result<CacheDirective, ServeError> {
        let public = self.public == Some(true);
        let mut tokens = Vec::with_capacity(5);

        let expires = if self.private {
            if public || self.no_cache || self.s_maxage.is_some() {
                return Err(ServeError::ConflictingCacheControl(
                    "private excludes public, no-cache and s-maxage",
                ));
            }
            tokens.push("private".to_string());
            Expires::Past
        } else if self.no_cache {
            if public || self.max_age.is_some() {
                return Err(ServeError::ConflictingCacheControl(
                    "no-cache excludes public and max-age",
                ));
            }
            tokens.push("no-cache".to_string());
            Expires::Past
        } else {
            tokens.push("public".to_string());
            self.max_age
                .map_or(Expires::Omit, |secs| Expires::After(Duration::from_secs(secs)))
        };

        if self.no_store {
            tokens.push("no-store".to_string());
        }
        if self.no_transform {
            tokens.push("no-transform".to_string());
        }
        if let Some(max_age) = self.max_age {
            tokens.push(format!("max-age={max_age}"));
        }
        if let Some(s_maxage) = self.s_maxage {
            tokens.push(format!("s-maxage={s_maxage}"));
        }

        Ok(CacheDirective {
            header: tokens.join(", "),
            expires,
        })
    }
}

/// Check whether a request `Cache-Control` header asks for end-to-end revalidation
///
/// `max-age=0` and `no-cache` both force the source to re-read its content.
pub fn requires_revalidation(cache_control: Option<&str>) -> bool {
    cache_control.is_some_and(|value| {
        value.split(',').any(|directive| {
            let directive = directive.trim().to_ascii_lowercase();
            directive == "no-cache"
                || directive
                    .strip_prefix("max-age=")
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    == Some(0)
        })
    })
}
