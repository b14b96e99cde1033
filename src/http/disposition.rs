//! Content-Disposition header synthesis

use crate::error::ServeError;
use crate::http::mime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Disposition options, validated into a [`Disposition`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentDisposition {
    /// Explicit `attachment`; attachment is also the default
    pub attachment: Option<bool>,
    pub inline: bool,
    /// Download name; only the base name is used
    pub filename: Option<String>,
}

/// A validated Content-Disposition policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    inline: bool,
    filename: Option<String>,
}

impl ContentDisposition {
    /// Validate the options
    ///
    /// `inline` and an explicit `attachment` are mutually exclusive.
    pub fn build(&self) -> Result<Disposition, ServeError> {
        if self.inline && self.attachment == Some(true) {
            return Err(ServeError::ConflictingDisposition);
        }

        let filename = self
            .filename
            .as_deref()
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .map(ToString::to_string);

        Ok(Disposition {
            inline: self.inline,
            filename,
        })
    }
}

impl Disposition {
    /// Value of the `Content-Disposition` header
    ///
    /// # Examples
    /// ```
    /// use fileserve::http::disposition::ContentDisposition;
    ///
    /// let d = ContentDisposition {
    ///     inline: true,
    ///     filename: Some("/some/path/bing.txt".into()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(d.build().unwrap().header_value(), r#"inline; filename="bing.txt""#);
    /// ```
    pub fn header_value(&self) -> String {
        let kind = if self.inline { "inline" } else { "attachment" };
        match &self.filename {
            Some(name) => format!("{kind}; filename=\"{}\"", name.replace('"', "\\\"")),
            None => kind.to_string(),
        }
    }

    /// Content type implied by the disposition
    pub fn content_type(&self) -> &'static str {
        self.filename
            .as_deref()
            .and_then(mime::guess_from_path)
            .unwrap_or(mime::OCTET_STREAM)
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}
