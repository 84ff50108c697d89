use serde::{Deserialize, Serialize};

/// One autocomplete suggestion. Ordering is the rank order returned by the
/// predictor, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    /// Reserved for future annotation (signatures, origin). Always `None`
    /// in the current contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Suggestion {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }
}
