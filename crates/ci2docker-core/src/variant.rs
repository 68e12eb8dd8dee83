//! Environment variants.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One resolved combination of the environment matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariant {
    /// 1-based position in the matrix.
    pub ordinal: usize,
    /// Globals followed by the matrix entry, space separated.
    pub env: String,
    /// Build context directory dedicated to this variant.
    pub work_dir: PathBuf,
}
