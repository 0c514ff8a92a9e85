use thiserror::Error;

use crate::core::models::FetchUnit;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum OrdersError {
    /// An error occurred while building or sending an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The requested date range is missing a bound, unparseable, or ends before it starts.
    #[error("invalid date range: {0}")]
    InvalidRange(String),

    /// A builder or call was configured with an unusable parameter.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The credential could not be acquired. Fatal for the whole run.
    #[error("credential acquisition failed: {0}")]
    Credential(String),

    /// A unit kept failing with rate-limit, unavailable or network errors until
    /// the attempt budget ran out.
    #[error("fetch for {unit} still failing after {attempts} attempts: {reason}")]
    TransientFetch {
        /// The unit that was being fetched.
        unit: FetchUnit,
        /// How many attempts were made, including the first.
        attempts: u32,
        /// Description of the last failure.
        reason: String,
    },

    /// The remote service answered a unit with a status that is not worth retrying.
    #[error("non-retryable status {status} for {unit}: {body}")]
    FatalUnit {
        /// The unit that was being fetched.
        unit: FetchUnit,
        /// The HTTP status code.
        status: u16,
        /// Response body text, for diagnostics.
        body: String,
    },

    /// The data received from the API was in an unexpected format.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// Every fetch unit of the run failed, so there is nothing to aggregate.
    #[error("all {failed} fetch units failed; first failure: {first}")]
    AllUnitsFailed {
        /// Number of failed units.
        failed: usize,
        /// The failure of the first unit in segmentation order.
        first: Box<OrdersError>,
    },

    /// The run was cancelled before every unit had been scheduled.
    #[error("run cancelled before all fetch units were scheduled")]
    Cancelled,
}

impl OrdersError {
    /// Whether this error belongs to a single fetch unit.
    ///
    /// Unit failures are recorded and the unit contributes no records; every
    /// other error aborts the run.
    #[must_use]
    pub const fn is_unit_failure(&self) -> bool {
        matches!(
            self,
            Self::TransientFetch { .. } | Self::FatalUnit { .. } | Self::Data(_) | Self::Http(_)
        )
    }
}
