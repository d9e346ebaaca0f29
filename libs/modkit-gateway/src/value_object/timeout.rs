use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

/// Timeout in seconds; `0.0` means wait indefinitely
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timeout(Duration);

impl Timeout {
    pub const INDEFINITELY: Self = Self(Duration::ZERO);

    /// # Errors
    /// Returns [`ValueError::NegativeTimeout`] for negative values and
    /// [`ValueError::UnrepresentableTimeout`] for NaN, infinity or values
    /// too large for a [`Duration`].
    pub fn from_secs_f64(seconds: f64) -> Result<Self, ValueError> {
        if seconds.is_nan() {
            return Err(ValueError::UnrepresentableTimeout(seconds));
        }
        if seconds < 0.0 {
            return Err(ValueError::NegativeTimeout(seconds));
        }
        let duration = Duration::try_from_secs_f64(seconds)
            .map_err(|_| ValueError::UnrepresentableTimeout(seconds))?;
        // sub-nanosecond values must not turn into "indefinitely"
        if duration.is_zero() && seconds > 0.0 {
            return Ok(Self(Duration::from_nanos(1)));
        }
        Ok(Self(duration))
    }

    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }

    #[must_use]
    pub const fn is_indefinitely(self) -> bool {
        self.0.is_zero()
    }

    /// `None` when the timeout is indefinite
    #[must_use]
    pub const fn to_duration(self) -> Option<Duration> {
        if self.is_indefinitely() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl From<Duration> for Timeout {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_secs_f64())
    }
}
