use http::header::HeaderMap;
use http::Method;
use subtle::ConstantTimeEq;

use super::config::{CSRF_COOKIE_MAX_AGE, CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
use super::errors::CsrfError;
use crate::utils::{CookieOptions, gen_random_hex, get_cookie_from_headers, header_set_cookie};

const CSRF_TOKEN_BYTES: usize = 32;

pub fn generate_csrf_token() -> Result<String, CsrfError> {
    Ok(gen_random_hex(CSRF_TOKEN_BYTES)?)
}

/// Constant-time string comparison. Differing lengths compare unequal.
pub fn safe_equal(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Checks that the cookie and header copies of the token are both present and equal.
pub fn verify_double_submit(cookie: Option<&str>, header: Option<&str>) -> Result<(), CsrfError> {
    let cookie = cookie.filter(|c| !c.is_empty()).ok_or(CsrfError::MissingCookie)?;
    let header = header.filter(|h| !h.is_empty()).ok_or(CsrfError::MissingHeader)?;

    if safe_equal(cookie, header) {
        Ok(())
    } else {
        Err(CsrfError::Mismatch)
    }
}

/// Applies [`verify_double_submit`] to a request's headers.
pub fn verify_request(headers: &HeaderMap) -> Result<(), CsrfError> {
    let cookie = get_cookie_from_headers(headers, CSRF_COOKIE_NAME.as_str());
    let header = headers
        .get(CSRF_HEADER_NAME.as_str())
        .and_then(|v| v.to_str().ok());

    verify_double_submit(cookie, header).inspect_err(|e| {
        tracing::warn!(error = %e, "CSRF verification failed");
    })
}

pub fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// `Set-Cookie` header carrying `token`. Left readable so page scripts can mirror it.
pub fn csrf_cookie_header(token: &str) -> Result<HeaderMap, CsrfError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        CSRF_COOKIE_NAME.as_str(),
        token,
        CookieOptions::readable(*CSRF_COOKIE_MAX_AGE as i64),
    )?;
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http::header::{COOKIE, SET_COOKIE};
    use proptest::prelude::*;

    #[test]
    fn test_generate_csrf_token() {
        let token = generate_csrf_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_csrf_token().unwrap());
    }

    #[test]
    fn test_safe_equal() {
        assert!(safe_equal("abc", "abc"));
        assert!(safe_equal("", ""));
        assert!(!safe_equal("abc", "abd"));
        assert!(!safe_equal("abc", "abcd"));
        assert!(!safe_equal("", "a"));
    }

    #[test]
    fn test_verify_double_submit() {
        assert_eq!(verify_double_submit(Some("t"), Some("t")), Ok(()));
        assert_eq!(
            verify_double_submit(None, Some("t")),
            Err(CsrfError::MissingCookie)
        );
        assert_eq!(
            verify_double_submit(Some("t"), None),
            Err(CsrfError::MissingHeader)
        );
        assert_eq!(
            verify_double_submit(Some(""), Some("")),
            Err(CsrfError::MissingCookie)
        );
        assert_eq!(
            verify_double_submit(Some("t"), Some("u")),
            Err(CsrfError::Mismatch)
        );
    }

    #[test]
    fn test_verify_request_reads_cookie_and_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("other=1; csrf-token=tok"));
        headers.insert("x-csrf-token", HeaderValue::from_static("tok"));
        assert!(verify_request(&headers).is_ok());

        headers.insert("x-csrf-token", HeaderValue::from_static("nope"));
        assert_eq!(verify_request(&headers), Err(CsrfError::Mismatch));
    }

    #[test]
    fn test_is_state_changing() {
        assert!(is_state_changing(&Method::POST));
        assert!(is_state_changing(&Method::PUT));
        assert!(is_state_changing(&Method::PATCH));
        assert!(is_state_changing(&Method::DELETE));
        assert!(!is_state_changing(&Method::GET));
        assert!(!is_state_changing(&Method::HEAD));
        assert!(!is_state_changing(&Method::OPTIONS));
    }

    #[test]
    fn test_csrf_cookie_header_is_readable() {
        let headers = csrf_cookie_header("tok").unwrap();
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("csrf-token=tok;"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("HttpOnly"));
    }

    proptest! {
        #[test]
        fn prop_safe_equal_matches_string_equality(a in ".{0,40}", b in ".{0,40}") {
            prop_assert_eq!(safe_equal(&a, &b), a == b);
        }

        #[test]
        fn prop_safe_equal_is_reflexive(a in ".*") {
            prop_assert!(safe_equal(&a, &a));
        }

        #[test]
        fn prop_length_mismatch_is_unequal(a in ".{1,40}") {
            let longer = format!("{a}x");
            prop_assert!(!safe_equal(&a, &longer));
        }
    }
}
