use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ValueError;

/// Non-blank login used for HTTP authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login(String);

impl Login {
    /// # Errors
    /// Returns [`ValueError::BlankLogin`] for an empty or whitespace-only value.
    pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValueError::BlankLogin);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-blank password; never printed by `Debug` or `Display`
#[derive(Clone)]
pub struct Password(SecretString);

impl Password {
    /// # Errors
    /// Returns [`ValueError::BlankPassword`] for an empty or whitespace-only value.
    pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValueError::BlankPassword);
        }
        Ok(Self(SecretString::from(value)))
    }

    /// Callers must not log or persist the returned slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_blank_login_is_rejected() {
        for raw in ["", "   "] {
            assert_eq!(Login::new(raw).unwrap_err(), ValueError::BlankLogin);
        }
        assert_eq!(
            ValueError::BlankLogin.to_string(),
            "Login could not be a blank string"
        );
    }

    #[test]
    fn test_blank_password_is_rejected() {
        assert_eq!(Password::new("").unwrap_err(), ValueError::BlankPassword);
        assert_eq!(
            ValueError::BlankPassword.to_string(),
            "Password could not be a blank string"
        );
    }

    #[test]
    fn test_password_is_redacted() {
        let password = Password::new("hunter2").unwrap();
        assert_eq!(format!("{password:?}"), "[REDACTED]");
        assert_eq!(password.to_string(), "[REDACTED]");
        assert_eq!(password.expose(), "hunter2");
    }

    #[test]
    fn test_login_keeps_value() {
        let login = Login::new("admin").unwrap();
        assert_eq!(login.as_str(), "admin");
        assert_eq!(login.to_string(), "admin");
    }
}
