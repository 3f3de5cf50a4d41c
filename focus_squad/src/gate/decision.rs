use crate::config::{FS_LINK_PAGE_PATH, FS_SIGNIN_PATH, FS_SIGNOUT_PATH};

use super::callback::sanitize_callback_path;
use super::config::is_public_path;

/// Session facts the gate decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateSession {
    Anonymous,
    Blocked,
    Active {
        telegram_linked: bool,
        /// Version recorded in the session when it was issued
        session_version: i64,
    },
}

#[derive(Debug, Clone)]
pub struct GateRequest<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub session: GateSession,
    /// Raw value of the session version cookie
    pub sv_cookie: Option<&'a str>,
    pub current_version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Served without looking at the session
    Public,
    Unauthenticated { redirect: String },
    Blocked { redirect: String },
    /// Issued under an older session version; must sign in again
    StaleSession { redirect: String },
    NeedsTelegramLink { redirect: String },
    /// Pass through, setting the version cookie when it holds `Some`
    Authorized { set_sv_cookie: Option<i64> },
}

impl GateDecision {
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { redirect }
            | Self::Blocked { redirect }
            | Self::StaleSession { redirect }
            | Self::NeedsTelegramLink { redirect } => Some(redirect),
            Self::Public | Self::Authorized { .. } => None,
        }
    }
}

pub fn evaluate_gate(request: &GateRequest<'_>) -> GateDecision {
    if is_public_path(request.path) {
        return GateDecision::Public;
    }

    let (telegram_linked, session_version) = match request.session {
        GateSession::Anonymous => {
            return GateDecision::Unauthenticated {
                redirect: sign_in_redirect(request.path, request.query),
            };
        }
        GateSession::Blocked => {
            return GateDecision::Blocked {
                redirect: format!("{}?error=AccessDenied", FS_SIGNIN_PATH.as_str()),
            };
        }
        GateSession::Active {
            telegram_linked,
            session_version,
        } => (telegram_linked, session_version),
    };

    let current = request.current_version.to_string();
    let stale_cookie = request.sv_cookie.is_some_and(|sv| sv != current);
    if stale_cookie || session_version != request.current_version {
        return GateDecision::StaleSession {
            redirect: format!(
                "{}?callbackUrl={}",
                FS_SIGNOUT_PATH.as_str(),
                urlencoding::encode(FS_SIGNIN_PATH.as_str())
            ),
        };
    }

    if !telegram_linked && !is_link_page(request.path) {
        return GateDecision::NeedsTelegramLink {
            redirect: FS_LINK_PAGE_PATH.to_string(),
        };
    }

    GateDecision::Authorized {
        set_sv_cookie: request
            .sv_cookie
            .is_none()
            .then_some(request.current_version),
    }
}

fn is_link_page(path: &str) -> bool {
    let link_page = FS_LINK_PAGE_PATH.as_str();
    path == link_page
        || path
            .strip_prefix(link_page)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn sign_in_redirect(path: &str, query: Option<&str>) -> String {
    let original = match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let callback = sanitize_callback_path(&original).unwrap_or_else(|| "/".to_string());

    format!(
        "{}?callbackUrl={}",
        FS_SIGNIN_PATH.as_str(),
        urlencoding::encode(&callback)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(linked: bool, version: i64) -> GateSession {
        GateSession::Active {
            telegram_linked: linked,
            session_version: version,
        }
    }

    fn request<'a>(path: &'a str, session: GateSession, sv: Option<&'a str>) -> GateRequest<'a> {
        GateRequest {
            path,
            query: None,
            session,
            sv_cookie: sv,
            current_version: 3,
        }
    }

    #[test]
    fn test_public_paths_pass() {
        let decision = evaluate_gate(&request("/api/link", GateSession::Anonymous, None));
        assert_eq!(decision, GateDecision::Public);

        let decision = evaluate_gate(&request("/auth/signin", GateSession::Anonymous, Some("1")));
        assert_eq!(decision, GateDecision::Public);
    }

    #[test]
    fn test_anonymous_redirects_with_callback() {
        let mut req = request("/tasks", GateSession::Anonymous, None);
        req.query = Some("day=today");

        let decision = evaluate_gate(&req);

        assert_eq!(
            decision,
            GateDecision::Unauthenticated {
                redirect: "/auth/signin?callbackUrl=%2Ftasks%3Fday%3Dtoday".to_string()
            }
        );
    }

    #[test]
    fn test_unsafe_callback_falls_back_to_root() {
        assert_eq!(
            sign_in_redirect("//evil.com", None),
            "/auth/signin?callbackUrl=%2F"
        );
    }

    #[test]
    fn test_blocked_user_is_denied() {
        let decision = evaluate_gate(&request("/dashboard", GateSession::Blocked, Some("3")));
        assert_eq!(
            decision.redirect(),
            Some("/auth/signin?error=AccessDenied")
        );
    }

    #[test]
    fn test_stale_version_cookie_forces_sign_out() {
        let decision = evaluate_gate(&request("/dashboard", active(true, 3), Some("2")));

        assert_eq!(
            decision,
            GateDecision::StaleSession {
                redirect: "/auth/signout?callbackUrl=%2Fauth%2Fsignin".to_string()
            }
        );
    }

    #[test]
    fn test_stale_session_version_forces_sign_out_without_cookie() {
        let decision = evaluate_gate(&request("/dashboard", active(true, 2), None));
        assert!(matches!(decision, GateDecision::StaleSession { .. }));
    }

    #[test]
    fn test_missing_version_cookie_is_set() {
        let decision = evaluate_gate(&request("/dashboard", active(true, 3), None));
        assert_eq!(
            decision,
            GateDecision::Authorized {
                set_sv_cookie: Some(3)
            }
        );
    }

    #[test]
    fn test_matching_version_cookie_passes() {
        let decision = evaluate_gate(&request("/dashboard", active(true, 3), Some("3")));
        assert_eq!(
            decision,
            GateDecision::Authorized {
                set_sv_cookie: None
            }
        );
    }

    #[test]
    fn test_unlinked_user_goes_to_link_page() {
        let decision = evaluate_gate(&request("/dashboard", active(false, 3), Some("3")));
        assert_eq!(
            decision,
            GateDecision::NeedsTelegramLink {
                redirect: "/link-telegram".to_string()
            }
        );
    }

    #[test]
    fn test_unlinked_user_may_stay_on_link_page() {
        for path in ["/link-telegram", "/link-telegram/help"] {
            let decision = evaluate_gate(&request(path, active(false, 3), Some("3")));
            assert!(matches!(decision, GateDecision::Authorized { .. }), "{path}");
        }

        let decision = evaluate_gate(&request("/link-telegramx", active(false, 3), Some("3")));
        assert!(matches!(decision, GateDecision::NeedsTelegramLink { .. }));
    }
}
