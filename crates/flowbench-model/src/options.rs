//! Configuration options for each tool.
//!
//! Every tool takes a closed, strongly typed options struct. Config files are
//! deserialized into [`ToolConfig`] and checked with [`ToolConfig::validate`]
//! before a pipeline starts, so steps only ever see validated options.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::output::ToolId;

/// Largest payload a QR symbol can hold in byte mode (version 40, level L).
pub const QR_MAX_PAYLOAD_BYTES: usize = 2953;

/// Name of the per-group row count column in rollups.
pub const ROLLUP_COUNT_COLUMN: &str = "count";

/// Layout of CSV input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvFormat {
    /// Whether the first record holds column names. Without it, columns are
    /// named `Column 1`, `Column 2`, ...
    pub has_header: bool,
    /// Field delimiter.
    pub delimiter: char,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: ',',
        }
    }
}

impl CsvFormat {
    fn validate(&self, tool: ToolId) -> Result<(), ConfigError> {
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(ConfigError::InvalidDelimiter {
                tool,
                delimiter: self.delimiter,
            });
        }
        Ok(())
    }

    /// Delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }
}

/// A conditional rule: `"<column> <operator> <value>"` plus the label or
/// target sheet it assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub condition: String,
    #[serde(alias = "target")]
    pub label: String,
}

impl Rule {
    pub fn new(condition: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            label: label.into(),
        }
    }
}

/// Split one column into `{column}_1..{column}_n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitColumn {
    pub column: String,
    pub delimiter: String,
}

/// Build a column from a `{column}` template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeColumns {
    pub template: String,
    pub target: String,
}

/// Options for Excel Fix It.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcelFixItOptions {
    pub csv: CsvFormat,
    pub trim_whitespace: bool,
    pub remove_empty_rows: bool,
    pub remove_duplicates: bool,
    pub fix_dates: bool,
    pub split_column: Option<SplitColumn>,
    pub merge_columns: Option<MergeColumns>,
}

impl ExcelFixItOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tool = ToolId::ExcelFixIt;
        self.csv.validate(tool)?;
        if let Some(split) = &self.split_column {
            require(tool, "split_column.column", &split.column)?;
            if split.delimiter.is_empty() {
                return Err(ConfigError::EmptyField {
                    tool,
                    field: "split_column.delimiter",
                });
            }
        }
        if let Some(merge) = &self.merge_columns {
            require(tool, "merge_columns.template", &merge.template)?;
            require(tool, "merge_columns.target", &merge.target)?;
        }
        Ok(())
    }
}

/// Options for Lead Scrubber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeadScrubberOptions {
    pub csv: CsvFormat,
    pub email_column: String,
    pub name_column: String,
    pub normalize_names: bool,
    /// Drop rows whose email fails validation.
    pub remove_invalid: bool,
    pub dedupe_by_email: bool,
}

impl Default for LeadScrubberOptions {
    fn default() -> Self {
        Self {
            csv: CsvFormat::default(),
            email_column: "email".to_string(),
            name_column: "name".to_string(),
            normalize_names: false,
            remove_invalid: false,
            dedupe_by_email: false,
        }
    }
}

impl LeadScrubberOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tool = ToolId::LeadScrubber;
        self.csv.validate(tool)?;
        require(tool, "email_column", &self.email_column)?;
        if self.normalize_names {
            require(tool, "name_column", &self.name_column)?;
        }
        Ok(())
    }
}

fn default_label_column() -> String {
    "label".to_string()
}

fn default_unmatched_sheet() -> String {
    "unmatched".to_string()
}

/// The automation mode of Sheets Automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", deny_unknown_fields)]
pub enum Recipe {
    /// Write the label of the first matching rule into `label_column`.
    Label {
        rules: Vec<Rule>,
        #[serde(default = "default_label_column")]
        label_column: String,
        #[serde(default)]
        default_label: Option<String>,
    },
    /// Route each row to the sheet named by the first matching rule.
    Move {
        rules: Vec<Rule>,
        #[serde(default = "default_unmatched_sheet")]
        unmatched_sheet: String,
    },
    /// Group rows and total numeric columns.
    Rollup {
        group_by: String,
        #[serde(default)]
        sum_columns: Vec<String>,
        #[serde(default)]
        filter: Option<String>,
    },
}

impl Recipe {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Label { .. } => "label",
            Self::Move { .. } => "move",
            Self::Rollup { .. } => "rollup",
        }
    }
}

/// Options for Sheets Automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsAutomationOptions {
    #[serde(default)]
    pub csv: CsvFormat,
    pub recipe: Recipe,
}

impl SheetsAutomationOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tool = ToolId::SheetsAutomation;
        self.csv.validate(tool)?;
        match &self.recipe {
            Recipe::Label {
                rules,
                label_column,
                ..
            } => {
                validate_rules(tool, "label", rules)?;
                require(tool, "recipe.label_column", label_column)?;
            }
            Recipe::Move {
                rules,
                unmatched_sheet,
            } => {
                validate_rules(tool, "move", rules)?;
                require(tool, "recipe.unmatched_sheet", unmatched_sheet)?;
            }
            Recipe::Rollup {
                group_by,
                sum_columns,
                ..
            } => {
                require(tool, "recipe.group_by", group_by)?;
                validate_rollup_columns(tool, group_by, sum_columns)?;
            }
        }
        Ok(())
    }
}

fn validate_rules(tool: ToolId, recipe: &'static str, rules: &[Rule]) -> Result<(), ConfigError> {
    if rules.is_empty() {
        return Err(ConfigError::NoRules { tool, recipe });
    }
    for rule in rules {
        require(tool, "rules.label", &rule.label)?;
    }
    Ok(())
}

/// Rollup output columns must be distinct: the group column, `count`, then
/// one column per sum. Names compare the way columns resolve, ignoring ASCII
/// case.
fn validate_rollup_columns(
    tool: ToolId,
    group_by: &str,
    sum_columns: &[String],
) -> Result<(), ConfigError> {
    let conflict = |column: &str, reason: &'static str| ConfigError::RollupColumnConflict {
        tool,
        column: column.trim().to_string(),
        conflict: reason,
    };
    let group_key = group_by.trim().to_ascii_lowercase();
    if group_key == ROLLUP_COUNT_COLUMN {
        return Err(conflict(group_by, "is reserved for the group row count"));
    }
    let mut seen = HashSet::with_capacity(sum_columns.len());
    for column in sum_columns {
        require(tool, "recipe.sum_columns", column)?;
        let key = column.trim().to_ascii_lowercase();
        if key == ROLLUP_COUNT_COLUMN {
            return Err(conflict(column, "is reserved for the group row count"));
        }
        if key == group_key {
            return Err(conflict(column, "is both the group column and a sum column"));
        }
        if !seen.insert(key) {
            return Err(conflict(column, "is listed more than once in sum_columns"));
        }
    }
    Ok(())
}

/// Options for Invoice Extractor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvoiceExtractorOptions {
    /// Normalize dates to ISO 8601 and fill in missing currencies.
    pub normalize: bool,
    /// Currency assumed when a document names none (used with `normalize`).
    pub default_currency: Option<String>,
    /// Also emit `line_items.csv`.
    pub include_line_items: bool,
}

impl InvoiceExtractorOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(currency) = &self.default_currency {
            require(ToolId::InvoiceExtractor, "default_currency", currency)?;
        }
        Ok(())
    }
}

/// Campaign parameters appended to URL payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UtmParams {
    pub source: String,
    pub medium: String,
    #[serde(default)]
    pub campaign: Option<String>,
}

/// Signing key; never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

fn default_max_payload_bytes() -> usize {
    QR_MAX_PAYLOAD_BYTES
}

/// Options for QR Generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QrGeneratorOptions {
    #[serde(default)]
    pub csv: CsvFormat,
    /// Payload template with `{column}` placeholders.
    pub template: String,
    /// Column naming each code's image file; defaults to `qr_<row>`.
    #[serde(default)]
    pub filename_column: Option<String>,
    #[serde(default)]
    pub utm: Option<UtmParams>,
    /// HMAC-SHA256 key for signed payloads.
    #[serde(default)]
    pub secret: Option<Secret>,
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl QrGeneratorOptions {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            csv: CsvFormat::default(),
            template: template.into(),
            filename_column: None,
            utm: None,
            secret: None,
            max_payload_bytes: QR_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tool = ToolId::QrGenerator;
        self.csv.validate(tool)?;
        require(tool, "template", &self.template)?;
        if let Some(utm) = &self.utm {
            require(tool, "utm.source", &utm.source)?;
            require(tool, "utm.medium", &utm.medium)?;
        }
        if let Some(secret) = &self.secret {
            require(tool, "secret", secret.expose())?;
        }
        if self.max_payload_bytes == 0 || self.max_payload_bytes > QR_MAX_PAYLOAD_BYTES {
            return Err(ConfigError::OutOfRange {
                tool,
                field: "max_payload_bytes",
                value: self.max_payload_bytes,
                min: 1,
                max: QR_MAX_PAYLOAD_BYTES,
            });
        }
        Ok(())
    }
}

fn require(tool: ToolId, field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyField { tool, field });
    }
    Ok(())
}

/// A tool selection together with its options, as read from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "kebab-case")]
pub enum ToolConfig {
    ExcelFixIt(ExcelFixItOptions),
    LeadScrubber(LeadScrubberOptions),
    SheetsAutomation(SheetsAutomationOptions),
    InvoiceExtractor(InvoiceExtractorOptions),
    QrGenerator(QrGeneratorOptions),
}

impl ToolConfig {
    /// Parses a TOML config document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Parses a JSON config document.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn tool(&self) -> ToolId {
        match self {
            Self::ExcelFixIt(_) => ToolId::ExcelFixIt,
            Self::LeadScrubber(_) => ToolId::LeadScrubber,
            Self::SheetsAutomation(_) => ToolId::SheetsAutomation,
            Self::InvoiceExtractor(_) => ToolId::InvoiceExtractor,
            Self::QrGenerator(_) => ToolId::QrGenerator,
        }
    }

    /// Rejects invalid option values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::ExcelFixIt(options) => options.validate(),
            Self::LeadScrubber(options) => options.validate(),
            Self::SheetsAutomation(options) => options.validate(),
            Self::InvoiceExtractor(options) => options.validate(),
            Self::QrGenerator(options) => options.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_excel_fix_it_toml() {
        let config = ToolConfig::from_toml_str(
            r#"
            tool = "excel-fix-it"
            trim_whitespace = true
            fix_dates = true

            [split_column]
            column = "tags"
            delimiter = ","
            "#,
        )
        .unwrap();
        let ToolConfig::ExcelFixIt(options) = &config else {
            panic!("expected excel-fix-it config");
        };
        assert!(options.trim_whitespace);
        assert!(options.fix_dates);
        assert!(!options.remove_duplicates);
        assert_eq!(options.csv, CsvFormat::default());
        assert_eq!(options.split_column.as_ref().unwrap().column, "tags");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_sheets_recipe_json() {
        let config = ToolConfig::from_json_str(
            r#"{
                "tool": "sheets-automation",
                "recipe": {
                    "mode": "move",
                    "rules": [{ "condition": "amount > 100", "target": "large" }]
                }
            }"#,
        )
        .unwrap();
        let ToolConfig::SheetsAutomation(options) = config else {
            panic!("expected sheets-automation config");
        };
        assert_eq!(
            options.recipe,
            Recipe::Move {
                rules: vec![Rule::new("amount > 100", "large")],
                unmatched_sheet: "unmatched".to_string(),
            }
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = ToolConfig::from_toml_str(
            r#"
            tool = "lead-scrubber"
            dedupe = true
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn rejects_unknown_recipe_fields() {
        let result = ToolConfig::from_toml_str(
            r#"
            tool = "sheets-automation"

            [recipe]
            mode = "rollup"
            group_by = "region"
            sum_column = ["amount"]
            "#,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().contains("sum_column"), "{err}");
    }

    fn rollup(group_by: &str, sum_columns: &[&str]) -> SheetsAutomationOptions {
        SheetsAutomationOptions {
            csv: CsvFormat::default(),
            recipe: Recipe::Rollup {
                group_by: group_by.to_string(),
                sum_columns: sum_columns.iter().map(ToString::to_string).collect(),
                filter: None,
            },
        }
    }

    #[test]
    fn rejects_colliding_rollup_columns() {
        let conflict = |options: SheetsAutomationOptions| match options.validate() {
            Err(ConfigError::RollupColumnConflict { column, conflict, .. }) => (column, conflict),
            other => panic!("expected a column conflict, got {other:?}"),
        };

        assert_eq!(
            conflict(rollup("amount", &["Amount"])),
            ("Amount".to_string(), "is both the group column and a sum column")
        );
        assert_eq!(
            conflict(rollup("region", &["count"])).1,
            "is reserved for the group row count"
        );
        assert_eq!(
            conflict(rollup("Count", &[])).1,
            "is reserved for the group row count"
        );
        assert_eq!(
            conflict(rollup("region", &["amount", "tax", "amount"])).1,
            "is listed more than once in sum_columns"
        );
        assert!(rollup("region", &["amount", "tax"]).validate().is_ok());
    }

    #[test]
    fn rejects_empty_split_delimiter() {
        let options = ExcelFixItOptions {
            split_column: Some(SplitColumn {
                column: "tags".to_string(),
                delimiter: String::new(),
            }),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::EmptyField {
                field: "split_column.delimiter",
                ..
            })
        ));
    }

    #[test]
    fn rejects_rule_recipes_without_rules() {
        let options = SheetsAutomationOptions {
            csv: CsvFormat::default(),
            recipe: Recipe::Label {
                rules: Vec::new(),
                label_column: "label".to_string(),
                default_label: None,
            },
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::NoRules { recipe: "label", .. })
        ));
    }

    #[test]
    fn rejects_oversized_qr_capacity() {
        let mut options = QrGeneratorOptions::new("https://example.com/{id}");
        options.max_payload_bytes = QR_MAX_PAYLOAD_BYTES + 1;
        assert!(matches!(
            options.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_blank_secret() {
        let mut options = QrGeneratorOptions::new("{id}");
        options.secret = Some(Secret::new("  "));
        assert!(matches!(
            options.validate(),
            Err(ConfigError::EmptyField { field: "secret", .. })
        ));
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let secret = Secret::new("hunter2");
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn rejects_quote_delimiter() {
        let options = LeadScrubberOptions {
            csv: CsvFormat {
                has_header: true,
                delimiter: '"',
            },
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::InvalidDelimiter { .. })
        ));
    }
}
