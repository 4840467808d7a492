//! Loading `opcheck.json`.

use anyhow::{Context, Result};
use opcheck_analyzer::AnalyzerOptions;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "opcheck.json";

/// Load options from `explicit`, or from `opcheck.json` in `cwd` when present.
pub fn load_options(explicit: Option<&Path>, cwd: &Path) -> Result<AnalyzerOptions> {
    if let Some(path) = explicit {
        return load_options_file(&cwd.join(path));
    }

    let candidate = cwd.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        load_options_file(&candidate)
    } else {
        Ok(AnalyzerOptions::default())
    }
}

pub fn load_options_file(path: &Path) -> Result<AnalyzerOptions> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let options = AnalyzerOptions::from_json(&source)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded analyzer options");
    Ok(options)
}
