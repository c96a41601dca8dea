//! Invoice field extraction from text-extracted documents.
//!
//! Every field has an ordered list of patterns; the first pattern that
//! matches wins. Fields without a match stay `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// ISO 4217 codes recognized in document text.
const CURRENCY_CODES: &str = "USD|EUR|GBP|CAD|AUD|JPY|INR|CHF|CNY|MXN";

/// Money amount, optionally preceded by a currency code and/or symbol.
///
/// Groups: `code`, `symbol`, `amount`.
fn money_pattern() -> String {
    format!(r"(?:(?P<code>{CURRENCY_CODES})\s*)?(?P<symbol>[$€£¥₹])?\s*(?P<amount>-?\d[\d,]*(?:\.\d{{1,2}})?)")
}

/// Invoice numbers always carry at least one digit.
static INVOICE_NUMBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\binvoice\s*(?:#|(?:no|num|number)\b\.?)\s*[:#]?\s*([A-Z0-9\-/]*\d[A-Z0-9\-/]*)\b",
        r"(?im)^\s*invoice\s*:\s*([A-Z0-9\-/]*\d[A-Z0-9\-/]*)",
        r"(?i)\b(INV[-#]?\d[A-Z0-9\-]*)",
        r"(?i)\b(?:bill|reference|ref)\s*(?:#|(?:no|number)\b\.?)?\s*[:#]\s*([A-Z0-9\-/]*\d[A-Z0-9\-/]*)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid invoice number regex"))
    .collect()
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let date = r"(\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}|\d{4}-\d{2}-\d{2}|[A-Z][a-z]+\.?\s+\d{1,2},?\s+\d{4}|\d{1,2}\s+[A-Z][a-z]+\.?\s+\d{4})";
    [
        format!(r"(?i)\b(?:invoice\s+date|issue\s+date|date\s+of\s+issue|dated)\s*[:#]?\s*{date}"),
        format!(r"(?im)^\s*date\s*[:#]?\s*{date}"),
        r"\b(\d{4}-\d{2}-\d{2})\b".to_string(),
        r"\b(\d{1,2}/\d{1,2}/\d{4})\b".to_string(),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid invoice date regex"))
    .collect()
});

static TOTAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let money = money_pattern();
    [
        format!(
            r"(?i)\b(?:grand\s+total|total\s+due|amount\s+due|balance\s+due|total\s+amount|invoice\s+total)\b[\s:]*{money}"
        ),
        format!(r"(?i)\btotal\b[\s:]*{money}"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid invoice total regex"))
    .collect()
});

static TAX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let money = money_pattern();
    Regex::new(&format!(
        r"(?i)\b(?:sales\s+tax|tax|vat|gst|hst)\b(?:\s*\(?\d+(?:\.\d+)?\s*%\)?)?[\s:]*{money}"
    ))
    .expect("Invalid invoice tax regex")
});

static CURRENCY_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({CURRENCY_CODES})\b")).expect("Invalid currency code regex")
});

static VENDOR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?im)^\s*(?:from|vendor|seller|supplier|bill\s+from|sold\s+by)\s*:\s*(.+?)\s*$",
        r"(?m)^\s*([A-Z][\w&.,' -]*?\b(?:Inc|LLC|Ltd|Limited|Corp|Corporation|Co|GmbH|LLP|PLC)\.?)\s*$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid vendor regex"))
    .collect()
});

/// `<description> <qty> <unit price> <amount>`
static LINE_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(.+?)\s+(\d+(?:\.\d+)?)\s+[$€£¥₹]?(\d[\d,]*\.\d{2})\s+[$€£¥₹]?(\d[\d,]*\.\d{2})\s*$",
    )
    .expect("Invalid line item regex")
});

/// Summary lines that share the line-item shape.
const NON_ITEM_WORDS: [&str; 4] = ["total", "tax", "vat", "balance"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

/// Fields pulled out of one invoice document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InvoiceFields {
    pub vendor: Option<String>,
    pub invoice_number: Option<String>,
    /// Date as written in the document.
    pub date: Option<String>,
    pub total: Option<f64>,
    pub currency: Option<String>,
    pub tax: Option<f64>,
    pub line_items: Vec<LineItem>,
}

impl InvoiceFields {
    /// A document counts as an invoice when it has a number or a total.
    pub fn has_invoice_data(&self) -> bool {
        self.invoice_number.is_some() || self.total.is_some()
    }
}

/// Extracts invoice fields from document text.
pub fn extract_invoice(text: &str) -> InvoiceFields {
    let total_match = TOTAL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| {
            let amount = parse_amount(caps.name("amount")?.as_str())?;
            let code = caps.name("code").map(|m| m.as_str().to_ascii_uppercase());
            let symbol = caps.name("symbol").and_then(|m| currency_for_symbol(m.as_str()));
            Some((amount, code.or(symbol.map(str::to_string))))
        });

    let currency = CURRENCY_CODE_PATTERN
        .captures(text)
        .map(|caps| caps[1].to_string())
        .or_else(|| total_match.as_ref().and_then(|(_, currency)| currency.clone()));

    InvoiceFields {
        vendor: first_capture(&VENDOR_PATTERNS, text),
        invoice_number: first_capture(&INVOICE_NUMBER_PATTERNS, text),
        date: first_capture(&DATE_PATTERNS, text),
        total: total_match.map(|(amount, _)| amount),
        currency,
        tax: TAX_PATTERN
            .captures(text)
            .and_then(|caps| parse_amount(caps.name("amount")?.as_str())),
        line_items: extract_line_items(text),
    }
}

/// Parses an amount with optional thousands separators (`1,234.50`).
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|amount| amount.is_finite())
}

pub fn currency_for_symbol(symbol: &str) -> Option<&'static str> {
    match symbol {
        "$" => Some("USD"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        "¥" => Some("JPY"),
        "₹" => Some("INR"),
        _ => None,
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        let value = pattern.captures(text)?.get(1)?.as_str().trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn extract_line_items(text: &str) -> Vec<LineItem> {
    LINE_ITEM_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let description = caps[1].trim().to_string();
            let lowered = description.to_lowercase();
            if NON_ITEM_WORDS.iter().any(|word| lowered.contains(word)) {
                return None;
            }
            Some(LineItem {
                quantity: parse_amount(&caps[2])?,
                unit_price: parse_amount(&caps[3])?,
                amount: parse_amount(&caps[4])?,
                description,
            })
        })
        .collect()
}
