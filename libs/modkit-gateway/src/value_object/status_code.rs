use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// HTTP status code restricted to the `[100, 600)` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: Self = Self(200);
    pub const NO_CONTENT: Self = Self(204);
    pub const BAD_REQUEST: Self = Self(400);
    pub const NOT_FOUND: Self = Self(404);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// # Errors
    /// Returns [`ValueError::UnsupportedStatusCode`] outside `[100, 600)`.
    pub fn new(code: u16) -> Result<Self, ValueError> {
        if (100..600).contains(&code) {
            Ok(Self(code))
        } else {
            Err(ValueError::UnsupportedStatusCode(code))
        }
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// True for `2xx`
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    #[must_use]
    pub const fn equals_code(self, code: u16) -> bool {
        self.0 == code
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<http::StatusCode> for StatusCode {
    type Error = ValueError;

    fn try_from(value: http::StatusCode) -> Result<Self, Self::Error> {
        Self::new(value.as_u16())
    }
}

impl From<StatusCode> for u16 {
    fn from(value: StatusCode) -> Self {
        value.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
