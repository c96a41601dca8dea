//! Config loading and file handling against a real filesystem.

use std::fs;
use std::path::PathBuf;

use flowbench_cli::config::load_tool_config;
use flowbench_cli::files::{read_inputs, write_artifacts};
use flowbench_model::{Artifact, ToolConfig, ToolId};
use flowbench_pipeline::{ToolInput, run_tool};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_toml_config() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "leads.toml",
        r#"
tool = "lead-scrubber"
normalize_names = true
dedupe_by_email = true
"#,
    );

    let config = load_tool_config(&path).unwrap();
    let ToolConfig::LeadScrubber(options) = config else {
        panic!("expected lead-scrubber config");
    };
    assert!(options.normalize_names);
    assert!(options.dedupe_by_email);
    assert_eq!(options.email_column, "email");
}

#[test]
fn loads_json_config() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "qr.JSON",
        r#"{ "tool": "qr-generator", "template": "https://acme.io/{id}" }"#,
    );

    let config = load_tool_config(&path).unwrap();
    assert_eq!(config.tool(), ToolId::QrGenerator);
}

#[test]
fn rejects_unknown_fields_and_formats() {
    let dir = TempDir::new().unwrap();
    let unknown = write_file(
        &dir,
        "bad.toml",
        "tool = \"excel-fix-it\"\nfix_everything = true\n",
    );
    let err = load_tool_config(&unknown).unwrap_err();
    assert!(format!("{err:#}").contains("unknown field"));

    let yaml = write_file(&dir, "config.yaml", "tool: excel-fix-it\n");
    let err = load_tool_config(&yaml).unwrap_err();
    assert!(err.to_string().contains("expected .toml or .json"));
}

#[test]
fn invalid_options_fail_before_running() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "qr.toml", "tool = \"qr-generator\"\ntemplate = \"  \"\n");
    let err = load_tool_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("option 'template' must not be empty"));
}

#[test]
fn batch_tools_read_every_input() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.txt", "Invoice #: 1\nTotal: $5.00\n");
    let b = write_file(&dir, "b.txt", "nothing");

    let input = read_inputs(ToolId::InvoiceExtractor, &[a.clone(), b]).unwrap();
    let ToolInput::Batch(files) = &input else {
        panic!("expected a batch");
    };
    let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt"]);

    let input = read_inputs(ToolId::ExcelFixIt, &[a]).unwrap();
    assert!(matches!(input, ToolInput::Single(ref file) if file.name == "a.txt"));
}

#[test]
fn missing_input_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.csv");
    let err = read_inputs(ToolId::LeadScrubber, &[missing]).unwrap_err();
    assert!(err.to_string().starts_with("read input"));
    assert!(read_inputs(ToolId::LeadScrubber, &[]).is_err());
}

#[test]
fn run_outputs_are_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let config_path = write_file(
        &dir,
        "fix.toml",
        "tool = \"excel-fix-it\"\ntrim_whitespace = true\n",
    );
    let input_path = write_file(&dir, "sheet.csv", "a,b\n 1 ,2\n");

    let config = load_tool_config(&config_path).unwrap();
    let input = read_inputs(config.tool(), &[input_path]).unwrap();
    let output = run_tool(&input, &config).unwrap();

    let out_dir = dir.path().join("out");
    let written = write_artifacts(&out_dir, &output.artifacts).unwrap();
    assert_eq!(written, [out_dir.join("cleaned.csv"), out_dir.join("audit.json")]);
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), "a,b\n1,2\n");

    let audit: serde_json::Value =
        serde_json::from_slice(&fs::read(&written[1]).unwrap()).unwrap();
    assert_eq!(audit[1]["stepName"], "trim_whitespace");
}

#[test]
fn artifacts_overwrite_existing_files() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "audit.json", "stale");
    let artifact = Artifact::json("audit.json", b"[]".to_vec());
    write_artifacts(dir.path(), &[artifact]).unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("audit.json")).unwrap(), "[]");
}
