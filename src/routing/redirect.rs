//! Login redirect construction and redirect-back parsing.

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

pub const REDIRECT_PARAM: &str = "redirect";

const FALLBACK_TARGET: &str = "/";

/// `"{login_path}?redirect=<url-encoded original>"`.
#[must_use]
pub fn login_redirect(login_path: &str, original: &str) -> String {
    format!("{login_path}?{REDIRECT_PARAM}={}", urlencoding::encode(original))
}

/// Where to go after a successful login, read from the login page's query.
///
/// Only same-origin absolute paths are honored; anything else (missing,
/// undecodable, `//host`, `https://...`, control characters) falls back to `/`.
#[must_use]
pub fn redirect_back_target(search: &str) -> String {
    let query = search.strip_prefix('?').unwrap_or(search);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == REDIRECT_PARAM)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(std::borrow::Cow::into_owned)
        .filter(|target| is_local_path(target))
        .unwrap_or_else(|| FALLBACK_TARGET.to_owned())
}

fn is_local_path(target: &str) -> bool {
    // Browsers drop tab/newline from URLs, so `/\t/host` would become `//host`.
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control)
}
