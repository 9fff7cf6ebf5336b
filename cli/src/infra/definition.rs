//! Loading probe definition files from disk.

use std::path::Path;

use anyhow::{Context, Result};
use tfprobe_common::ProbeDefinition;

/// Read, parse and validate a probe definition.
///
/// Relative `terraform.dir` and `terraform.var_files` entries are resolved
/// against the directory containing the definition file, so a definition
/// behaves the same wherever `tfprobe` is invoked from.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or fails validation.
pub fn load_definition(path: &Path) -> Result<ProbeDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let mut definition: ProbeDefinition = serde_yaml::from_str(&content)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    definition
        .validate()
        .with_context(|| format!("invalid probe definition {}", path.display()))?;

    if let Some(base) = path.parent() {
        let tf = &mut definition.terraform;
        if tf.dir.is_relative() {
            tf.dir = base.join(&tf.dir);
        }
        for file in &mut tf.var_files {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }
    Ok(definition)
}
