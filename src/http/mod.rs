//! HTTP protocol layer module
//!
//! Conditional GET, byte ranges and caching headers, decoupled from how
//! content is sourced and how connections are served.

pub mod body;
pub mod cache;
pub mod clock;
pub mod date;
pub mod disposition;
pub mod mime;
pub mod payload;
pub mod range;
pub mod responder;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use cache::{CacheControl, CacheDirective};
pub use disposition::{ContentDisposition, Disposition};
pub use payload::{Content, Payload};
pub use range::parse_range_header;
pub use responder::{ConditionalResponder, RequestContext};
pub use response::{build_405_response, build_error_response, HttpResponse};
