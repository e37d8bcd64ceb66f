use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;

/// Top-level configuration for the viewer core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Logical charts to project, in display order.
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartKind>,
    /// Per-name color overrides applied before the built-in palette.
    #[serde(default)]
    pub palette_overrides: IndexMap<String, String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            charts: default_charts(),
            palette_overrides: IndexMap::new(),
        }
    }
}

fn default_charts() -> Vec<ChartKind> {
    ChartKind::ALL.to_vec()
}
