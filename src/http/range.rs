//! HTTP Range request parsing module
//!
//! Range header parsing for resumable downloads, compliant with RFC 7233.

/// One `first-last` entry of a Range header, before resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    /// First byte position, None for a suffix range (`-N`)
    pub start: Option<u64>,
    /// Last byte position, None means until end of content
    pub end: Option<u64>,
}

/// A range resolved against the content length (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Whether the range spans the whole content
    #[inline]
    pub const fn covers(&self, total: u64) -> bool {
        self.start == 0 && self.end + 1 == total
    }

    /// Value of the `Content-Range` header
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

impl RangeSpec {
    /// Resolve against the content length, None when not satisfiable
    pub fn resolve(&self, total: u64) -> Option<ByteRange> {
        if total == 0 {
            return None;
        }
        let last = total - 1;

        match (self.start, self.end) {
            // Suffix larger than content is valid, just covers the whole content
            (None, Some(suffix)) => {
                if suffix == 0 {
                    return None;
                }
                Some(ByteRange {
                    start: total.saturating_sub(suffix),
                    end: last,
                })
            }
            (Some(start), end) => {
                if start > last {
                    return None;
                }
                let end = end.map_or(last, |e| e.min(last));
                if start > end {
                    return None;
                }
                Some(ByteRange { start, end })
            }
            (None, None) => None,
        }
    }
}

/// Range header evaluation result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Single range strictly smaller than the content - serve 206
    Partial(ByteRange),
    /// Range covers the whole content or several ranges were requested - serve 200
    Full,
    /// Well-formed but nothing satisfiable - should return 416
    NotSatisfiable,
    /// No Range header or malformed (ignore, return full content)
    None,
}

/// Parse the specs of a Range header (`bytes` unit only)
///
/// Supported formats, comma separated:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// Returns None when the header is malformed or uses another unit.
///
/// # Examples
/// ```
/// use fileserve::http::range::{parse_range_specs, RangeSpec};
///
/// let specs = parse_range_specs("bytes=0-99, -20").unwrap();
/// assert_eq!(specs[0], RangeSpec { start: Some(0), end: Some(99) });
/// assert_eq!(specs[1], RangeSpec { start: None, end: Some(20) });
/// assert!(parse_range_specs("items=0-1").is_none());
/// ```
pub fn parse_range_specs(header: &str) -> Option<Vec<RangeSpec>> {
    let (unit, set) = header.trim().split_once('=')?;
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return None; // Not bytes unit, ignore
    }

    let mut specs = Vec::new();
    for part in set.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        specs.push(parse_spec(part)?);
    }

    if specs.is_empty() {
        None
    } else {
        Some(specs)
    }
}

fn parse_spec(part: &str) -> Option<RangeSpec> {
    let (start_str, end_str) = part.split_once('-')?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix range: "-500" means last 500 bytes
    if start_str.is_empty() {
        let suffix = end_str.parse::<u64>().ok()?;
        return Some(RangeSpec {
            start: None,
            end: Some(suffix),
        });
    }

    let start = start_str.parse::<u64>().ok()?;
    let end = if end_str.is_empty() {
        None // Open-ended range
    } else {
        Some(end_str.parse::<u64>().ok()?)
    };

    Some(RangeSpec {
        start: Some(start),
        end,
    })
}

/// Evaluate an optional Range header against the content length
///
/// # Examples
/// ```
/// use fileserve::http::range::{parse_range_header, RangeParseResult};
///
/// // Fixed range
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert!(matches!(result, RangeParseResult::Partial(_)));
///
/// // No Range header
/// let result = parse_range_header(None, 1000);
/// assert!(matches!(result, RangeParseResult::None));
/// ```
pub fn parse_range_header(range_header: Option<&str>, total: u64) -> RangeParseResult {
    let Some(specs) = range_header.and_then(parse_range_specs) else {
        return RangeParseResult::None;
    };

    let resolved: Vec<ByteRange> = specs.iter().filter_map(|s| s.resolve(total)).collect();

    match resolved.as_slice() {
        [] => RangeParseResult::NotSatisfiable,
        [range] if !range.covers(total) && specs.len() == 1 => RangeParseResult::Partial(*range),
        _ => RangeParseResult::Full,
    }
}
