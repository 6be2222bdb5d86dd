//! JSON report generator
//!
//! Writes the planning-board replacement payload to a file, pretty-printed,
//! so a run against fixtures can be inspected without a document store.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

pub struct JsonGenerator;

impl JsonGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Writes the given planning-board records as `planning_board.json` in
    /// the output directory.
    pub fn generate<P: AsRef<Path>>(&self, records: &[Value], output_dir: P) -> Result<()> {
        let path = output_dir.as_ref().join("planning_board.json");
        let payload = serde_json::to_string_pretty(records)?;
        fs::write(&path, payload)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

impl Default for JsonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_file_is_written() {
        let dir = std::env::temp_dir().join("moldplan_json_generator_test");
        std::fs::create_dir_all(&dir).unwrap();

        JsonGenerator::new()
            .generate(&[json!({"resourceId": 3})], &dir)
            .unwrap();

        let content = std::fs::read_to_string(dir.join("planning_board.json")).unwrap();
        assert!(content.contains("resourceId"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
