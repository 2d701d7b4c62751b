use serde::{Deserialize, Serialize};

/// How a reviewed mapping was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// Accepted from the suggestion engine.
    Algorithmic,
    /// Chosen or overridden by a reviewer.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub target_field: String,
    pub source_column: String,
    /// Engine confidence; `None` for manual mappings.
    pub confidence_percent: Option<f64>,
    pub mode: MappingMode,
}

/// Reviewed mapping for one layout applied to one source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub layout_name: String,
    pub source_name: String,
    pub mappings: Vec<FieldMapping>,
    pub unmapped_fields: Vec<String>,
}

impl MappingConfig {
    pub fn mapping_for(&self, target_field: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.target_field == target_field)
    }

    pub fn manual_count(&self) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.mode == MappingMode::Manual)
            .count()
    }
}
