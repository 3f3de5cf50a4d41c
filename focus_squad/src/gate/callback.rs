const MAX_CALLBACK_LEN: usize = 2048;

/// Accepts only same-origin relative paths for post-sign-in redirects.
///
/// The path must start with a single `/`. Protocol-relative forms (`//host`,
/// `/\host`), any backslash, control characters, embedded schemes and `..`
/// segments (plain or percent-encoded) are rejected.
pub fn sanitize_callback_path(input: &str) -> Option<String> {
    if input.is_empty() || input.len() > MAX_CALLBACK_LEN {
        return None;
    }

    let rest = input.strip_prefix('/')?;
    if rest.starts_with('/') || input.contains('\\') {
        return None;
    }
    if input.chars().any(char::is_control) || input.contains("://") {
        return None;
    }

    let path = input.split(['?', '#']).next().unwrap_or_default();
    let has_dot_segment = path.split('/').any(|segment| {
        let segment = segment.to_ascii_lowercase();
        segment == ".." || segment.replace("%2e", ".") == ".."
    });
    if has_dot_segment {
        return None;
    }

    Some(input.to_string())
}
