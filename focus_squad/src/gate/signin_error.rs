use serde::Serialize;

/// Human readable explanation of a sign-in error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignInErrorInfo {
    pub title: &'static str,
    pub description: &'static str,
}

const fn info(title: &'static str, description: &'static str) -> SignInErrorInfo {
    SignInErrorInfo { title, description }
}

/// Maps the `error` query value of the sign-in page to a message.
///
/// Returns `None` when there is no error; unknown codes get a generic message.
pub fn resolve_sign_in_error(code: Option<&str>) -> Option<SignInErrorInfo> {
    let code = code.map(str::trim).filter(|c| !c.is_empty())?;

    Some(match code {
        "OAuthSignin" => info(
            "Could not start sign-in",
            "We could not reach the sign-in provider. Please try again.",
        ),
        "OAuthCallback" => info(
            "Sign-in was interrupted",
            "The sign-in provider returned an unexpected response. Please try again.",
        ),
        "OAuthCreateAccount" | "EmailCreateAccount" => info(
            "Could not create your account",
            "Your account could not be created. Please try again or use another sign-in method.",
        ),
        "Callback" => info(
            "Sign-in failed",
            "Something went wrong while completing sign-in. Please try again.",
        ),
        "OAuthAccountNotLinked" => info(
            "Use your original sign-in method",
            "This email is already registered with a different sign-in method.",
        ),
        "EmailSignin" => info(
            "Email not sent",
            "The sign-in email could not be sent. Please check the address and try again.",
        ),
        "CredentialsSignin" => info(
            "Sign-in failed",
            "The details you entered are incorrect.",
        ),
        "SessionRequired" => info(
            "Please sign in",
            "You need to be signed in to view this page.",
        ),
        "AccessDenied" => info(
            "Access denied",
            "Your account does not have access to Focus Squad. Contact an admin if this looks wrong.",
        ),
        "Verification" => info(
            "Link expired",
            "The sign-in link is no longer valid. It may have been used already or expired.",
        ),
        "Configuration" => info(
            "Server error",
            "Sign-in is misconfigured. Please contact the Focus Squad team.",
        ),
        _ => info(
            "Unable to sign in",
            "An unexpected error occurred. Please try again.",
        ),
    })
}
