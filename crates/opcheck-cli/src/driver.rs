//! Input discovery, unit loading and the analyzer run behind `opcheck`.

use anyhow::{Context, Result, bail};
use opcheck_analyzer::{
    AnalysisOutcome, Analyzer, CancellationToken, ExecutionMode, builtin_rules,
};
use opcheck_ir::CompilationUnit;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::args::CliArgs;
use crate::config::{self, CONFIG_FILE_NAME};

pub struct RunResult {
    pub units: Vec<CompilationUnit>,
    pub outcome: AnalysisOutcome,
}

/// Load options and units named by `args`, then analyze them.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunResult> {
    let mut options = config::load_options(args.config.as_deref(), cwd)?;
    if args.sequential {
        options.execution_mode = ExecutionMode::Sequential;
    }
    let rules = builtin_rules();
    options.check_rule_ids(&rules)?;

    let paths = collect_inputs(&args.inputs, cwd)?;
    let units = load_units(&paths)?;
    tracing::info!(files = paths.len(), "loaded compilation units");

    let mode = options.execution_mode;
    let analyzer = Analyzer::new(&rules, options);
    let token = CancellationToken::new();
    let outcome = match args.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("failed to build analysis thread pool")?;
            pool.install(|| analyzer.analyze(&units, mode, &token))
        }
        None => analyzer.analyze(&units, mode, &token),
    };

    Ok(RunResult { units, outcome })
}

/// Expand `inputs` into a sorted list of unit files.
///
/// Directories are searched recursively for `*.json`, skipping
/// `opcheck.json`. An empty `inputs` means the current directory.
pub fn collect_inputs(inputs: &[PathBuf], cwd: &Path) -> Result<Vec<PathBuf>> {
    let default_input = [cwd.to_path_buf()];
    let inputs = if inputs.is_empty() {
        &default_input[..]
    } else {
        inputs
    };

    let mut files = Vec::new();
    for input in inputs {
        let path = cwd.join(input);
        if path.is_file() {
            files.push(path);
        } else if path.is_dir() {
            for entry in WalkDir::new(&path).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("failed to read directory {}", path.display()))?;
                if entry.file_type().is_file() && is_unit_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            bail!("input not found: {}", path.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_unit_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
        && path.file_name().is_some_and(|name| name != CONFIG_FILE_NAME)
}

pub fn load_units(paths: &[PathBuf]) -> Result<Vec<CompilationUnit>> {
    paths.par_iter().map(|path| load_unit(path)).collect()
}

pub fn load_unit(path: &Path) -> Result<CompilationUnit> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    CompilationUnit::from_json(&source)
        .with_context(|| format!("failed to load compilation unit {}", path.display()))
}

/// Table of the built-in rules, one line per rule id.
pub fn list_rules() -> String {
    let mut out = String::new();
    for rule in builtin_rules() {
        let Some(descriptor) = rule.descriptors().first() else {
            continue;
        };
        out.push_str(&format!(
            "{:<8} {:<8} {:<16} {}\n",
            descriptor.id,
            descriptor.default_severity.as_str(),
            descriptor.category.as_str(),
            descriptor.title
        ));
    }
    out
}
