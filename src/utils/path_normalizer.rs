//! Path normalization for redirect sources and targets.
//!
//! Literal paths are stored and compared in a canonical form so that
//! `about-us`, `/about-us` and ` /about-us/ ` all describe the same rule.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;

/// Bytes that may not appear raw in a `Location` header value. Non-ASCII
/// is always encoded; `%` is kept so already-encoded targets pass through.
const LOCATION_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Prefix that marks a value as an absolute external URL.
///
/// Matches both `http://` and `https://`. External URLs are opaque and are
/// never rewritten.
pub const EXTERNAL_PREFIX: &str = "http";

/// Returns true if the value is treated as an absolute external URL.
pub fn is_external(path: &str) -> bool {
    path.starts_with(EXTERNAL_PREFIX)
}

/// Normalizes a redirect path to its canonical form.
///
/// # Normalization Rules
///
/// 1. **External URLs**: values starting with `http` are returned unchanged
/// 2. **Empty input**: returned unchanged (an empty field means "not set")
/// 3. **Whitespace**: every whitespace character is removed
/// 4. **Slashes**: exactly one leading and one trailing `/`
///
/// The function is idempotent and never fails.
///
/// # Examples
///
/// ```
/// use redirect_manager::utils::path_normalizer::normalize_path;
///
/// assert_eq!(normalize_path("about-us"), "/about-us/");
/// assert_eq!(normalize_path("//news//"), "/news/");
/// assert_eq!(normalize_path("/my page/"), "/mypage/");
/// assert_eq!(normalize_path("https://example.com"), "https://example.com");
/// assert_eq!(normalize_path(""), "");
/// ```
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() || is_external(path) {
        return path.to_string();
    }

    let compact: String = path.chars().filter(|c| !c.is_whitespace()).collect();
    let inner = compact.trim_matches('/');

    if inner.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", inner)
    }
}

fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(path))
}

/// Key under which a literal path is matched.
///
/// Request paths arrive percent-encoded while stored rules hold the decoded
/// text, so both sides are decoded before being normalized. A sequence that
/// does not decode to UTF-8 is matched as written.
///
/// ```
/// use redirect_manager::utils::path_normalizer::lookup_key;
///
/// assert_eq!(lookup_key("/%C3%BCber/"), "/über/");
/// assert_eq!(lookup_key("über"), "/über/");
/// ```
pub fn lookup_key(path: &str) -> String {
    normalize_path(&decode_path(path))
}

/// Encodes a redirect target for the `Location` header.
///
/// ```
/// use redirect_manager::utils::path_normalizer::encode_location;
///
/// assert_eq!(encode_location("/über/"), "/%C3%BCber/");
/// assert_eq!(encode_location("/plain/"), "/plain/");
/// ```
pub fn encode_location(target: &str) -> String {
    utf8_percent_encode(target, LOCATION_UNSAFE).to_string()
}
