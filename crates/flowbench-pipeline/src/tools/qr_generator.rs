//! QR Generator: per-row payloads for QR symbols.
//!
//! The tool produces the encoded payloads and a manifest. Rasterizing the
//! symbols is left to whatever renders `qr_manifest.json`.

use flowbench_model::{
    Artifact, Dataset, QrGeneratorOptions, Row, Secret, ToolId, UtmParams, Value,
};
use flowbench_transform::{append_query_params, fill_template, hmac_sha256_hex};
use serde::Serialize;

use super::{csv_artifact, parse_step, require_column};
use crate::error::{ItemFailure, PipelineError, Result};
use crate::run::{InputFile, PipelineOutput, PipelineRun};
use crate::step::StepReport;

pub const OUTPUT_FILE: &str = "qr_codes.csv";
pub const MANIFEST_FILE: &str = "qr_manifest.json";

/// Query parameter carrying the payload signature on URL payloads.
pub const SIGNATURE_PARAM: &str = "sig";

pub const STEPS: &[&str] = &[
    "parse_csv",
    "build_payloads",
    "append_utm",
    "sign_payloads",
    "check_capacity",
    "generate_output",
];

const OUTPUT_COLUMNS: [&str; 4] = ["row", "filename", "payload", "signature"];

/// One code to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrItem {
    /// 1-based input row.
    pub row: usize,
    pub filename: String,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    max_payload_bytes: usize,
    codes: &'a [QrItem],
}

pub fn run(file: &InputFile, options: &QrGeneratorOptions) -> Result<PipelineOutput> {
    let mut run = PipelineRun::new(ToolId::QrGenerator);
    let dataset = parse_step(&mut run, file, &options.csv)?;
    let filename_column = options
        .filename_column
        .as_deref()
        .map(|column| require_column(&dataset, column))
        .transpose()?;
    run.record("rowsIn", dataset.row_count());

    let mut items = run.step("build_payloads", || {
        let items = build_payloads(&dataset, &options.template, filename_column.as_deref());
        let empty = items.iter().filter(|item| item.payload.is_empty()).count();
        let mut report = StepReport::new(format!("Built {} payloads", items.len()))
            .count("payloads", items.len());
        if empty > 0 {
            report = report.warn(format!("{empty} rows produced an empty payload"));
        }
        Ok((items, report))
    })?;

    if let Some(utm) = &options.utm {
        run.step("append_utm", || {
            let tagged = append_utm(&mut items, utm);
            let report = StepReport::new(format!("Added UTM parameters to {tagged} URL payloads"))
                .count("payloads_tagged", tagged);
            Ok(((), report))
        })?;
    }

    let mut signed = 0;
    if let Some(secret) = &options.secret {
        signed = run.step("sign_payloads", || {
            let signed = sign_payloads(&mut items, secret)?;
            let report = StepReport::new(format!("Signed {signed} payloads with HMAC-SHA256"))
                .count("signed", signed);
            Ok((signed, report))
        })?;
    }

    let (accepted, rejected) = run.step("check_capacity", || {
        let (accepted, failures) = check_capacity(items, options.max_payload_bytes);
        let rejected = failures.len();
        let report = StepReport::new(format!(
            "{} payloads fit in a QR symbol, {rejected} rejected",
            accepted.len()
        ))
        .count("accepted", accepted.len())
        .count("rejected", rejected)
        .warnings_capped(failures.iter().map(ToString::to_string).collect());
        Ok(((accepted, rejected), report))
    })?;
    run.record("accepted", accepted.len());
    run.record("rejected", rejected);
    run.record("signed", signed);

    let artifacts = run.step("generate_output", || {
        let delimiter = options.csv.delimiter_byte();
        let table = csv_artifact(OUTPUT_FILE, &item_table(&accepted), delimiter)?;
        let manifest = Manifest {
            max_payload_bytes: options.max_payload_bytes,
            codes: &accepted,
        };
        let manifest = Artifact::json(MANIFEST_FILE, serde_json::to_vec_pretty(&manifest)?);
        let report = StepReport::new(format!(
            "Wrote {} codes to {OUTPUT_FILE} and {MANIFEST_FILE}",
            accepted.len()
        ))
        .count("rows", accepted.len());
        Ok((vec![table, manifest], report))
    })?;

    run.finish(artifacts)
}

fn build_payloads(
    dataset: &Dataset,
    template: &str,
    filename_column: Option<&str>,
) -> Vec<QrItem> {
    dataset
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let number = idx + 1;
            QrItem {
                row: number,
                filename: item_filename(row, filename_column, number),
                payload: fill_template(template, &dataset.headers, row)
                    .trim()
                    .to_string(),
                signature: None,
            }
        })
        .collect()
}

/// File stem for a code: the sanitized column value, or `qr_<row>`.
fn item_filename(row: &Row, column: Option<&str>, number: usize) -> String {
    let stem: String = column
        .and_then(|column| row.get(column))
        .map(Value::as_text)
        .unwrap_or_default()
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.trim_matches(['_', '.']).is_empty() {
        format!("qr_{number}")
    } else {
        stem
    }
}

fn append_utm(items: &mut [QrItem], utm: &UtmParams) -> usize {
    let mut params = vec![
        ("utm_source", utm.source.as_str()),
        ("utm_medium", utm.medium.as_str()),
    ];
    if let Some(campaign) = &utm.campaign {
        params.push(("utm_campaign", campaign.as_str()));
    }

    let mut tagged = 0;
    for item in items.iter_mut() {
        if let Some(payload) = append_query_params(&item.payload, &params) {
            item.payload = payload;
            tagged += 1;
        }
    }
    tagged
}

/// Signs every non-empty payload; URL payloads also carry the signature.
fn sign_payloads(items: &mut [QrItem], secret: &Secret) -> Result<usize> {
    let key = secret.expose().as_bytes();
    let mut signed = 0;
    for item in items.iter_mut().filter(|item| !item.payload.is_empty()) {
        let signature = hmac_sha256_hex(key, item.payload.as_bytes())
            .map_err(|err| PipelineError::step("sign_payloads", err))?;
        if let Some(payload) =
            append_query_params(&item.payload, &[(SIGNATURE_PARAM, signature.as_str())])
        {
            item.payload = payload;
        }
        item.signature = Some(signature);
        signed += 1;
    }
    Ok(signed)
}

fn check_capacity(
    items: Vec<QrItem>,
    max_payload_bytes: usize,
) -> (Vec<QrItem>, Vec<ItemFailure>) {
    let mut accepted = Vec::with_capacity(items.len());
    let mut failures = Vec::new();
    for item in items {
        let label = format!("row {}", item.row);
        let size = item.payload.len();
        if size == 0 {
            failures.push(ItemFailure::new(label, "empty payload"));
        } else if size > max_payload_bytes {
            failures.push(ItemFailure::new(
                label,
                format!("payload is {size} bytes, limit is {max_payload_bytes}"),
            ));
        } else {
            accepted.push(item);
        }
    }
    (accepted, failures)
}

fn item_table(items: &[QrItem]) -> Dataset {
    let headers = OUTPUT_COLUMNS.iter().map(ToString::to_string).collect();
    let rows = items
        .iter()
        .map(|item| {
            Row::from_pairs([
                ("row", Value::Number(item.row as f64)),
                ("filename", Value::text(&item.filename)),
                ("payload", Value::text(&item.payload)),
                ("signature", item.signature.clone().into()),
            ])
        })
        .collect();
    Dataset::new(headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(payload: &str) -> QrItem {
        QrItem {
            row: 1,
            filename: "qr_1".into(),
            payload: payload.into(),
            signature: None,
        }
    }

    #[test]
    fn filenames_are_sanitized_with_row_fallback() {
        let row = Row::from_pairs([("sku", Value::text("AB 12/x")), ("blank", Value::text("  "))]);
        assert_eq!(item_filename(&row, Some("sku"), 4), "AB_12_x");
        assert_eq!(item_filename(&row, Some("blank"), 4), "qr_4");
        assert_eq!(item_filename(&row, None, 7), "qr_7");
    }

    #[test]
    fn utm_only_touches_urls() {
        let mut items = vec![item("https://acme.io/p"), item("WIFI:S:home;;")];
        let utm = UtmParams {
            source: "print".into(),
            medium: "flyer".into(),
            campaign: Some("spring sale".into()),
        };
        assert_eq!(append_utm(&mut items, &utm), 1);
        assert_eq!(
            items[0].payload,
            "https://acme.io/p?utm_source=print&utm_medium=flyer&utm_campaign=spring+sale"
        );
        assert_eq!(items[1].payload, "WIFI:S:home;;");
    }

    #[test]
    fn signing_appends_sig_to_urls_only() {
        let mut items = vec![item("https://acme.io/p"), item("plain text")];
        let secret = Secret::new("key");
        assert_eq!(sign_payloads(&mut items, &secret).unwrap(), 2);

        let url_sig = hmac_sha256_hex(b"key", b"https://acme.io/p").unwrap();
        assert_eq!(items[0].signature.as_deref(), Some(url_sig.as_str()));
        assert_eq!(items[0].payload, format!("https://acme.io/p?sig={url_sig}"));
        assert_eq!(items[1].payload, "plain text");
        assert_eq!(
            items[1].signature,
            Some(hmac_sha256_hex(b"key", b"plain text").unwrap())
        );
    }

    #[test]
    fn capacity_rejects_empty_and_oversized() {
        let items = vec![
            QrItem { row: 1, ..item("") },
            QrItem { row: 2, ..item("ok") },
            QrItem { row: 3, ..item("too long") },
        ];
        let (accepted, failures) = check_capacity(items, 4);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].row, 2);
        let messages: Vec<_> = failures.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            ["row 1: empty payload", "row 3: payload is 8 bytes, limit is 4"]
        );
    }
}
