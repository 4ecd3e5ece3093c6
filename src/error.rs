//! Error types for Autolook API operations.

use thiserror::Error;

use crate::models::ErrorResponse;

/// A wire payload that does not conform to the expected schema.
///
/// Raised by the codec; aborts the single encode/decode call that produced it
/// and never yields a partially populated record.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The record did not serialize to a JSON object.
    #[error("record did not serialize to a JSON object")]
    NotAnObject,

    /// A response payload has no boolean `ok` discriminant.
    #[error("response payload has no boolean `ok` discriminant")]
    MissingDiscriminant,

    /// Field reconstruction failed: a required field is missing, a value has
    /// the wrong shape, or an enumeration wire string is unrecognized.
    #[error("field reconstruction failed: {0}")]
    Construct(#[from] serde_json::Error),
}

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to connect to the API server at all. Not retried.
    #[error("failed to connect to the API server at '{url}': {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A transport-level failure outside the retry loop.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Transient transport failures exhausted the retry budget.
    #[error("retries exceeded after {attempts} attempts, last error: {source}")]
    RetriesExceeded {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The API server misbehaved: 5xx status, non-JSON body, or a body that
    /// is not a JSON object.
    #[error("the API server misbehaved: {0}")]
    Internal(String),

    /// A reply does not match the schema declared for the endpoint.
    #[error("response does not match the expected schema: {0}")]
    Validation(#[from] ValidationError),

    /// The requested route does not exist (server code E01).
    #[error("the route '{0}' does not exist")]
    InvalidRoute(String),

    /// The account token is not authorized (server code E02).
    #[error("the account token is not authorized")]
    Unauthorized,

    /// The action is on cooldown (server code E03).
    #[error("the action is on cooldown, retry in {0}s")]
    OnCooldown(f64),

    /// The action is temporarily locked (server code E04).
    #[error("the action is temporarily locked, retry again in a bit")]
    TempLocked,

    /// Any other error reply from the server, carried verbatim.
    #[error("API error, code: {}, message: {:?}", .0.code, .0.message)]
    Api(ErrorResponse),

    /// The domain is not known to the API, so it is probably not for sale.
    #[error("the domain '{0}' has not been found, it is probably not for sale")]
    InvalidDomain(String),

    /// A wait loop gave up after the configured deadline.
    #[error("timed out after {0:.1}s waiting for new mail")]
    TimedOut(f64),
}
