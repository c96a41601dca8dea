//! QR payload helpers: URL detection, query tagging, and signing.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `message` under `key`, as lowercase hex.
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Parses `payload` as an absolute `http`/`https` URL.
fn parse_web_url(payload: &str) -> Option<Url> {
    let url = Url::parse(payload).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// True for absolute `http`/`https` URLs.
pub fn is_url(payload: &str) -> bool {
    parse_web_url(payload).is_some()
}

/// Appends form-encoded `key=value` pairs to a URL's query.
///
/// Returns `None` when `payload` is not an `http`/`https` URL. Existing
/// query pairs and the fragment are kept.
pub fn append_query_params(payload: &str, params: &[(&str, &str)]) -> Option<String> {
    let mut url = parse_web_url(payload)?;
    if !params.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    Some(url.into())
}
