use crate::graph::OrphanPolicy;
use serde::{Deserialize, Serialize};

/// Path ceiling used when none is configured.
pub const DEFAULT_PATH_CEILING: usize = 256;

/// Format of the generation date written into the program header.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Knobs that shape one compilation. Every field has a default, so a partial
/// TOML/JSON document deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Maximum number of paths enumerated for one fork/join pair.
    pub path_ceiling: usize,
    pub orphan_policy: OrphanPolicy,
    pub timestamp: Timestamp,
    /// Declared type of operands used in comparisons and arithmetic.
    pub numeric_type: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            path_ceiling: DEFAULT_PATH_CEILING,
            orphan_policy: OrphanPolicy::default(),
            timestamp: Timestamp::default(),
            numeric_type: "INT".to_string(),
        }
    }
}

/// The `Date:` line of the program header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timestamp {
    /// Local time at compilation.
    #[default]
    Now,
    /// A caller-supplied date, for reproducible output.
    Fixed(String),
    /// No date line at all.
    Omit,
}

impl Timestamp {
    pub fn render(&self) -> Option<String> {
        match self {
            Timestamp::Now => Some(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()),
            Timestamp::Fixed(date) => Some(date.clone()),
            Timestamp::Omit => None,
        }
    }
}
