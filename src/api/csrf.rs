//! Anti-forgery token handling.
//!
//! The server issues a `csrftoken` cookie and expects its value echoed back in
//! the `X-CSRFToken` header on every mutating request.

pub const CSRF_COOKIE: &str = "csrftoken";
/// Lowercase so it can be used with `HeaderName::from_static`.
pub const CSRF_HEADER: &str = "x-csrftoken";

/// Extract the CSRF token from a `Cookie`-style string (`a=1; csrftoken=xyz`).
///
/// Returns an empty string when no cookie string is configured or the cookie
/// is absent; the request still goes out and the server decides.
pub fn csrf_token(cookie: Option<&str>) -> String {
    let Some(cookie) = cookie else {
        return String::new();
    };
    cookie
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map_or_else(String::new, |(_, value)| value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_token_among_other_cookies() {
        assert_eq!(
            csrf_token(Some("sessionid=abc; csrftoken=tok123; theme=dark")),
            "tok123"
        );
    }

    #[test]
    fn token_first_in_string() {
        assert_eq!(csrf_token(Some("csrftoken=first")), "first");
    }

    #[test]
    fn missing_cookie_yields_empty() {
        assert_eq!(csrf_token(Some("sessionid=abc")), "");
        assert_eq!(csrf_token(None), "");
        assert_eq!(csrf_token(Some("")), "");
    }

    #[test]
    fn similar_names_do_not_match() {
        assert_eq!(csrf_token(Some("xcsrftoken=nope; csrftoken2=nope")), "");
    }
}
