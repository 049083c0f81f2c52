//! Route and method normalization.
//!
//! Routes follow a deliberately small grammar: either exactly `/`, or a `/`
//! followed by letters, hyphens, underscores and slashes.  No two separators
//! may touch each other (with the exception of a slash next to an
//! underscore, as in `/_element`), and the route may not end in a
//! separator.  Digits are not accepted.

use crate::constants::ALLOWED_METHODS;
use crate::SymmetricError;

lazy_static::lazy_static! {
    static ref CHARSET: regex::Regex = regex::Regex::new("^/[a-zA-Z_/-]*$").unwrap();
    static ref FORBIDDEN: regex::Regex = regex::Regex::new("//|/-|-/|--|-_|_-|__").unwrap();
}

/// Checks that the given route follows the route grammar.
///
/// # Errors
/// Returns [`SymmetricError::IncorrectRouteFormat`] if it does not.
///
/// # Examples
/// ```rust
/// # use symmetric::route::validate;
/// assert!(validate("/hello-world/basic_syntax").is_ok());
/// assert!(validate("/hi//hello").is_err());
/// ```
pub fn validate(route: &str) -> Result<(), SymmetricError> {
    if route == "/" {
        return Ok(());
    }

    let valid = CHARSET.is_match(route)
        && !FORBIDDEN.is_match(route)
        && !route.ends_with(&['-', '_', '/'][..]);

    if valid {
        Ok(())
    } else {
        Err(SymmetricError::IncorrectRouteFormat(route.to_owned()))
    }
}

/// Prepends a `/` to the route if it is missing one.
pub(crate) fn normalize(route: &str) -> String {
    if route.starts_with('/') {
        route.to_owned()
    } else {
        format!("/{}", route)
    }
}

/// Strips and uppercases a "dirty" verb, returning the matching method if
/// it is one of the allowed ones.
pub(crate) fn verb(dirty: &str) -> Option<http::Method> {
    let method = http::Method::from_bytes(dirty.trim().to_uppercase().as_bytes()).ok()?;
    ALLOWED_METHODS.contains(&method).then_some(method)
}

/// Normalizes a list of requested verbs, dropping disallowed and repeated
/// ones while keeping the order they were given in.
pub(crate) fn verbs<I, S>(dirty: I) -> Vec<http::Method>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut methods = Vec::new();
    for method in dirty.into_iter().filter_map(|v| verb(v.as_ref())) {
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    methods
}
