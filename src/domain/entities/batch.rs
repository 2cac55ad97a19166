//! Batch get-or-create request and response rows.

/// One row of a batch shorten request.
///
/// `correlation_id` is opaque to the engine and only used to pair the row
/// with its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub correlation_id: String,
    pub target: String,
}

impl BatchItem {
    pub fn new(correlation_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            target: target.into(),
        }
    }
}

/// One row of a batch shorten response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub correlation_id: String,
    pub short_url: String,
}
