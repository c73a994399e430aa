//! Reconnect delay policy for the stream connection manager.

use crate::core::domain::error::{FleetResult, ValidationError};
use std::time::Duration;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30000);

/// Exponential backoff with a fixed ceiling.
///
/// `delay(attempt)` computes `min(base * 2^attempt, max)`. The policy is
/// pure and deterministic; the retry ceiling itself is enforced by the
/// connection manager, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_delay: Duration,
    max_delay: Duration,
}

impl BackoffPolicy {
    /// Creates a policy with the given base and ceiling.
    ///
    /// # Errors
    /// Returns `FleetError::Validation` if `base` is zero or `max` is
    /// smaller than `base`.
    pub fn new(base: Duration, max: Duration) -> FleetResult<Self> {
        if base.is_zero() {
            return Err(ValidationError::Field {
                field: "base_delay".to_string(),
                message: "Base delay cannot be zero".to_string(),
            }
            .into());
        }
        if max < base {
            return Err(ValidationError::ConstraintViolation(
                "Max delay cannot be smaller than the base delay".to_string(),
            )
            .into());
        }
        Ok(Self {
            base_delay: base,
            max_delay: max,
        })
    }

    /// Delay to wait before reconnect attempt number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}
