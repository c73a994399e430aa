use crate::core::domain::error::{FleetResult, ValidationError};
use std::fmt;

// RFC 7230 practical limit.
const MAX_URL_LENGTH: usize = 2083;

/// A validated HTTP(S) endpoint URL.
///
/// Used for both the push-stream endpoint and the inventory collaborator
/// base. Validation guarantees a parseable absolute URL with an http or
/// https scheme and a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrl(String);

impl EndpointUrl {
    /// Creates a new validated endpoint URL.
    ///
    /// # Errors
    /// Returns `FleetError::Validation` if the value is empty, too long,
    /// unparseable, uses a non-HTTP scheme, or has no host.
    pub fn new(value: impl Into<String>) -> FleetResult<Self> {
        let value = value.into();
        validate_url(&value)?;
        Ok(Self(value))
    }

    /// Creates an endpoint URL without validation.
    #[allow(unused)]
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a path onto this URL, normalizing slashes.
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates an endpoint URL.
pub(crate) fn validate_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    if value.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed = url::Url::parse(value)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme '{}'. Must be http or https",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::ConstraintViolation(
            "URL must include a host".to_string(),
        ));
    }

    Ok(())
}
