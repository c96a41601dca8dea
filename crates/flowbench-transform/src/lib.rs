//! Pure transformation primitives for Flowbench pipelines.
//!
//! Nothing in this crate performs I/O or keeps state between calls:
//!
//! - **Normalization**: dates to ISO 8601, email validation, person names
//! - **Rules**: the `<column> <operator> <value>` condition language
//! - **Invoices**: regex field extraction from document text
//! - **Tables**: trimming, deduplication, split and merge of columns
//! - **Payloads**: URL tagging and HMAC signing for QR payloads
//!
//! # Example
//!
//! ```ignore
//! use flowbench_model::Row;
//! use flowbench_transform::{evaluate_rule, normalize_date};
//!
//! let row = Row::from_pairs([("amount", "150")]);
//! assert!(evaluate_rule(&row, "amount > 100"));
//! assert_eq!(normalize_date("03/15/2024").as_deref(), Some("2024-03-15"));
//! ```

pub mod invoice;
pub mod normalization;
pub mod payload;
pub mod rule;
pub mod table;

// === Normalization ===
pub use normalization::{
    EmailCheck, EmailIssue, FREE_EMAIL_PROVIDERS, is_free_provider, is_us_date, normalize_date,
    normalize_document_date, normalize_email, normalize_name, validate_email,
};

// === Rules ===
pub use rule::{Condition, Operator, evaluate_rule};

// === Invoices ===
pub use invoice::{InvoiceFields, LineItem, extract_invoice, parse_amount};

// === Tables ===
pub use table::{
    SplitOutcome, dedupe_by_column, dedupe_rows, fill_template, merge_columns, remove_empty_rows,
    split_column, trim_cells,
};

// === Payloads ===
pub use payload::{append_query_params, hmac_sha256_hex, is_url};
