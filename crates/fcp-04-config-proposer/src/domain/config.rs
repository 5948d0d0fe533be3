use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposerConfig {
    /// Upper bound on operations in one proposal.
    pub max_operations: usize,
    /// Attach `preview_json` to proposals.
    pub include_preview: bool,
}

impl Default for ProposerConfig {
    fn default() -> Self {
        Self {
            max_operations: 64,
            include_preview: true,
        }
    }
}

impl ProposerConfig {
    pub fn for_testing() -> Self {
        Self {
            max_operations: 8,
            include_preview: true,
        }
    }
}
