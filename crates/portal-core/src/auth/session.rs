use serde::{Deserialize, Serialize};

/// Special characters accepted as the "symbol" class of a password
const PASSWORD_SYMBOLS: &str = "@#$%^&+=!";

/// Minimum password length
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authenticated identity for the current portal instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub display_name: String,
    pub email: String,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// A session only counts when it carries a token
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Login form input. Never persisted.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    #[serde(rename = "emailAddress")]
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the form rules, returning the message to show for the first
    /// field that fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err("Email address and password are required");
        }
        if !is_valid_email(&self.email) {
            return Err("Please enter a valid email address");
        }
        if !is_valid_password(&self.password) {
            return Err(
                "Password must be at least 8 characters, include uppercase, lowercase, a digit, and a special character",
            );
        }
        Ok(())
    }
}

/// Validate `local@domain.tld`.
/// The TLD must be at least two ASCII letters.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    if !local_ok {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    host_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Validate password strength: length, lowercase, uppercase, digit, symbol.
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_has_token() {
        assert!(Session::new("tok1", "A B", "a@b.com").has_token());
        assert!(!Session::new("", "A B", "a@b.com").has_token());
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co"));
        assert!(is_valid_email("x_y%z@sub-domain.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@b.c0m"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("a@.com"));
    }

    #[test]
    fn test_password_rules() {
        assert!(is_valid_password("Aa1@aaaa"));
        assert!(!is_valid_password("Aa1@aaa")); // too short
        assert!(!is_valid_password("aa1@aaaa")); // no uppercase
        assert!(!is_valid_password("AA1@AAAA")); // no lowercase
        assert!(!is_valid_password("Aab@aaaa")); // no digit
        assert!(!is_valid_password("Aa1aaaaa")); // no symbol
        assert!(!is_valid_password("Aa1*aaaa")); // symbol outside the accepted set
    }

    #[test]
    fn test_credentials_validate() {
        assert!(Credentials::new("a@b.com", "Aa1@aaaa").validate().is_ok());
        assert_eq!(
            Credentials::new("", "").validate(),
            Err("Email address and password are required")
        );
        assert_eq!(
            Credentials::new("bad", "Aa1@aaaa").validate(),
            Err("Please enter a valid email address")
        );
        assert!(Credentials::new("a@b.com", "weak").validate().is_err());
    }

    #[test]
    fn test_credentials_wire_shape() {
        let json = serde_json::to_value(Credentials::new("a@b.com", "pw")).unwrap();
        assert_eq!(json["emailAddress"], "a@b.com");
        assert_eq!(json["password"], "pw");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("a@b.com", "Secret1!"));
        assert!(!debug.contains("Secret1!"));
    }
}
