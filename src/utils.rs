//!
//! Utility types and functions shared across the crate.
//!
//! This module provides:
//! - [`Sensitive`] - A wrapper type for secrets that hides values in debug output
//! - [`RequestIdGenerator`] - Generates or preserves request IDs for log correlation
//! - [`replace_handlebars_with_env`] - Template substitution for environment variables
//! - [`parse_size_shorthand`] - Parses `2M`-style size limits into a [`Byte`]
//!

use {
    byte_unit::{Byte, Unit},
    http::{HeaderValue, Request},
    regex::{Captures, Regex},
    serde::Deserialize,
    std::{env, sync::LazyLock},
    tower_http::request_id::{MakeRequestId, RequestId},
    uuid::{ContextV7, Timestamp, Uuid},
    zeroize::{Zeroize, ZeroizeOnDrop},
};

/// Matches `{{ VAR_NAME }}` with optional whitespace around the variable name.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// A wrapper type for sensitive data that obscures the value in debug output
/// and zeros memory when dropped.
///
/// Used for passwords and API keys loaded from configuration. The inner
/// value remains accessible through the public field `0`.
///
/// # Examples
///
/// ```
/// use page_routes::Sensitive;
///
/// let api_key = Sensitive::from("secret-key-12345");
/// assert_eq!(format!("{:?}", api_key), "Sensitive(****)");
/// assert_eq!(api_key.0, "secret-key-12345");
/// ```
#[derive(Clone, Deserialize, Default, Zeroize, ZeroizeOnDrop)]
pub struct Sensitive<T: Default + Zeroize>(pub T);

impl Sensitive<String> {
    /// Creates a new `Sensitive<String>` from a string slice.
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<T: Default + Zeroize + PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Default + Zeroize> std::fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sensitive(****)")
    }
}

/// Request ID generator for log correlation.
///
/// Preserves an incoming `x-request-id` header, otherwise generates a
/// time-ordered UUIDv7.
///
/// ```
/// use page_routes::RequestIdGenerator;
/// use tower_http::request_id::SetRequestIdLayer;
///
/// let layer = SetRequestIdLayer::x_request_id(RequestIdGenerator);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequestIdGenerator;

impl MakeRequestId for RequestIdGenerator {
    fn make_request_id<B>(&mut self, req: &Request<B>) -> Option<RequestId> {
        match req.headers().get("x-request-id") {
            Some(value) => Some(RequestId::new(value.clone())),
            None => {
                let cx = ContextV7::new().with_additional_precision();
                let uuid = Uuid::new_v7(Timestamp::now(cx));
                let value = HeaderValue::from_str(&uuid.to_string()).ok()?;
                Some(RequestId::new(value))
            }
        }
    }
}

/// Replaces handlebars-style placeholders with environment variable values.
///
/// `{{VAR}}`, `{{ VAR }}` and `{{  VAR  }}` are equivalent. Variable names
/// must be uppercase letters, digits or underscores. Unset variables are
/// replaced with an empty string and a warning is logged.
///
/// ```
/// use page_routes::replace_handlebars_with_env;
///
/// let result = replace_handlebars_with_env("Value: {{ SURELY_NOT_SET_ANYWHERE }}");
/// assert_eq!(result, "Value: ");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}

/// Parses a size limit written in shorthand notation.
///
/// Accepts a plain number of bytes or a number followed by one of the
/// binary suffixes `K`, `M` or `G` (case-insensitive), the notation used
/// for upload limits such as `upload_max_filesize = "2M"`.
///
/// Returns `None` for empty input, unknown suffixes or overflow.
///
/// ```
/// use page_routes::parse_size_shorthand;
///
/// let size = |value| parse_size_shorthand(value).map(|bytes| bytes.as_u64());
/// assert_eq!(size("512"), Some(512));
/// assert_eq!(size("2M"), Some(2 * 1024 * 1024));
/// assert_eq!(size("1g"), Some(1024 * 1024 * 1024));
/// assert_eq!(size("2MB"), None);
/// ```
pub fn parse_size_shorthand(value: &str) -> Option<Byte> {
    let value = value.trim();
    let (digits, unit) = match value.char_indices().last()? {
        (idx, 'k' | 'K') => (&value[..idx], Unit::KiB),
        (idx, 'm' | 'M') => (&value[..idx], Unit::MiB),
        (idx, 'g' | 'G') => (&value[..idx], Unit::GiB),
        _ => (value, Unit::B),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Byte::from_u64_with_unit(digits.parse().ok()?, unit)
}
