use crate::config::{FS_SIGNIN_PATH, FS_SIGNOUT_PATH};

/// Path prefixes served without a session. API handlers authenticate on their own.
const PUBLIC_PREFIXES: &[&str] = &["/api/", "/auth/", "/static/", "/assets/", "/_next/"];

const PUBLIC_FILES: &[&str] = &["/favicon.ico", "/robots.txt", "/manifest.json", "/sw.js"];

const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "map", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "woff", "woff2",
    "webmanifest", "txt",
];

/// Whether the gate lets `path` through without looking at the session.
pub fn is_public_path(path: &str) -> bool {
    if path == "/api" || path == FS_SIGNIN_PATH.as_str() || path == FS_SIGNOUT_PATH.as_str() {
        return true;
    }
    if PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || PUBLIC_FILES.contains(&path)
    {
        return true;
    }

    let last_segment = path.rsplit('/').next().unwrap_or_default();
    last_segment
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ASSET_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        for path in [
            "/api/link",
            "/api",
            "/auth/signin",
            "/auth/callback/google",
            "/static/app.css",
            "/favicon.ico",
            "/images/logo.png",
            "/fonts/inter.woff2",
        ] {
            assert!(is_public_path(path), "{path} should be public");
        }
    }

    #[test]
    fn test_protected_paths() {
        for path in ["/", "/dashboard", "/link-telegram", "/apiary", "/tasks/today", "/.env"] {
            assert!(!is_public_path(path), "{path} should be protected");
        }
    }
}
