use std::env;
use std::sync::LazyLock;

use crate::storage::DB_TABLE_PREFIX;

pub(super) static DB_TABLE_USERS: LazyLock<String> =
    LazyLock::new(|| format!("{}{}", *DB_TABLE_PREFIX, "users"));

/// Emails that are always granted admin rights, from `ADMIN_EMAILS`
static ADMIN_EMAILS: LazyLock<Vec<String>> = LazyLock::new(|| {
    parse_admin_emails(env::var("ADMIN_EMAILS").ok().as_deref())
});

fn parse_admin_emails(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(super::normalize_email)
        .filter(|email| !email.is_empty())
        .collect()
}

pub(crate) fn is_allowlisted_admin(email: &str) -> bool {
    let email = super::normalize_email(email);
    ADMIN_EMAILS.iter().any(|admin| *admin == email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_emails() {
        let emails = parse_admin_emails(Some(" Coach@Example.com, ,mentor@example.com "));
        assert_eq!(emails, vec!["coach@example.com", "mentor@example.com"]);
    }

    #[test]
    fn test_parse_admin_emails_empty() {
        assert!(parse_admin_emails(None).is_empty());
        assert!(parse_admin_emails(Some("")).is_empty());
    }
}
