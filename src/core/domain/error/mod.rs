use thiserror::Error;

/// The main error type for fleetwatch operations.
///
/// This enum represents all possible errors that can occur while talking
/// to a monitoring backend, including transport, payload decoding,
/// collaborator API, and validation failures.
#[derive(Error, Debug)]
pub enum FleetError {
    /// Represents transport-level failures: refused, dropped, or timed-out
    /// connections, and unexpected HTTP statuses on the stream endpoint.
    ///
    /// Stream-side connection errors are never returned to subscribers;
    /// the connection manager records them as state instead.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents a malformed payload: an inbound stream event or a
    /// collaborator response body that could not be parsed.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Represents a collaborator request that the backend rejected,
    /// either with a non-success HTTP status or a `success: false`
    /// envelope. Carries the envelope's error message when present.
    #[error("API error: {0}")]
    Api(String),

    /// Represents validation failures with detailed context.
    #[error("Validation error: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a FleetError
pub type FleetResult<T> = Result<T, FleetError>;
