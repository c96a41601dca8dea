//! Reading tool inputs and writing artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use flowbench_model::{Artifact, Row, ToolId};
use flowbench_pipeline::{InputFile, ToolInput};
use tracing::{debug, warn};

/// Reads the input files for `tool`.
///
/// Batch tools get every file; table tools get the first one and the rest
/// are ignored with a warning.
pub fn read_inputs(tool: ToolId, paths: &[PathBuf]) -> Result<ToolInput> {
    let Some(first) = paths.first() else {
        bail!("{tool} requires at least one input file");
    };
    if tool.is_batch() {
        let files = paths
            .iter()
            .map(|path| read_input(path))
            .collect::<Result<Vec<_>>>()?;
        return Ok(ToolInput::Batch(files));
    }
    if paths.len() > 1 {
        warn!(
            tool = %tool,
            ignored = paths.len() - 1,
            "tool reads a single table; extra inputs ignored"
        );
    }
    Ok(ToolInput::Single(read_input(first)?))
}

fn read_input(path: &Path) -> Result<InputFile> {
    let bytes = fs::read(path).with_context(|| format!("read input {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    debug!(file = %name, bytes = bytes.len(), "read input");
    Ok(InputFile::new(name, bytes))
}

/// Writes every artifact into `dir`, creating it if needed.
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;
    artifacts
        .iter()
        .map(|artifact| {
            let path = dir.join(&artifact.name);
            fs::write(&path, &artifact.bytes)
                .with_context(|| format!("write {}", path.display()))?;
            debug!(path = %path.display(), bytes = artifact.len(), "wrote artifact");
            Ok(path)
        })
        .collect()
}

/// Default output directory: `output/` next to the first input.
pub fn default_output_dir(inputs: &[PathBuf]) -> PathBuf {
    inputs
        .first()
        .and_then(|path| path.parent())
        .map_or_else(|| PathBuf::from("output"), |parent| parent.join("output"))
}

/// Builds a row from `column=value` arguments.
///
/// Splits on the first `=`, so values may contain `=` themselves.
pub fn parse_row(assignments: &[String]) -> Result<Row> {
    let mut row = Row::new();
    for assignment in assignments {
        let (column, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected column=value, got '{assignment}'"))?;
        let column = column.trim();
        if column.is_empty() {
            bail!("empty column name in '{assignment}'");
        }
        row.set(column, value);
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowbench_model::Value;

    #[test]
    fn row_values_may_contain_equals() {
        let row = parse_row(&["q=a=b".to_string(), " n =1".to_string()]).unwrap();
        assert_eq!(row.get("q"), Some(&Value::text("a=b")));
        assert_eq!(row.get("n"), Some(&Value::text("1")));
    }

    #[test]
    fn malformed_assignments_are_rejected() {
        assert!(parse_row(&["novalue".to_string()]).is_err());
        assert!(parse_row(&["=x".to_string()]).is_err());
    }

    #[test]
    fn output_dir_defaults_next_to_first_input() {
        let dir = default_output_dir(&[PathBuf::from("data/in.csv")]);
        assert_eq!(dir, PathBuf::from("data/output"));
    }
}
