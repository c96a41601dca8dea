//! Integration tests for the data model.

use flowbench_model::{Dataset, Row, ToolConfig, ToolId, Value};
use proptest::prelude::*;

#[test]
fn every_tool_has_a_config_tag() {
    let documents = [
        (r#"tool = "excel-fix-it""#, ToolId::ExcelFixIt),
        (r#"tool = "lead-scrubber""#, ToolId::LeadScrubber),
        (
            "tool = \"sheets-automation\"\n[recipe]\nmode = \"rollup\"\ngroup_by = \"region\"",
            ToolId::SheetsAutomation,
        ),
        (r#"tool = "invoice-extractor""#, ToolId::InvoiceExtractor),
        (
            "tool = \"qr-generator\"\ntemplate = \"https://example.com/{id}\"",
            ToolId::QrGenerator,
        ),
    ];
    for (document, expected) in documents {
        let config = ToolConfig::from_toml_str(document).unwrap();
        assert_eq!(config.tool(), expected);
        assert!(config.validate().is_ok(), "{expected} should validate");
    }
}

#[test]
fn unknown_tool_is_rejected() {
    assert!(ToolConfig::from_toml_str(r#"tool = "blog-atomizer""#).is_err());
}

#[test]
fn rows_missing_header_keys_are_tolerated() {
    let dataset = Dataset::new(
        vec!["a".to_string(), "b".to_string()],
        vec![Row::from_pairs([("a", "1")])],
    );
    assert_eq!(dataset.rows[0].get("b"), None);
    assert_eq!(dataset.column_count(), 2);
}

proptest! {
    #[test]
    fn canonical_key_is_order_independent(
        cells in proptest::collection::btree_map("[a-z]{1,4}", "[ -~]{0,8}", 0..6)
    ) {
        let forward = Row::from_pairs(cells.iter().map(|(k, v)| (k.clone(), Value::text(v.clone()))));
        let backward = Row::from_pairs(cells.iter().rev().map(|(k, v)| (k.clone(), Value::text(v.clone()))));
        prop_assert_eq!(forward.canonical_key(), backward.canonical_key());
    }
}
