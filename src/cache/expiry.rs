//! Expiration Header Module
//!
//! Encodes and decodes the self-describing expiration header embedded in
//! stored payloads: 13 zero-padded decimal digits of creation time (Unix
//! milliseconds), a literal `-`, the TTL in seconds, and a single space,
//! all prepended to the raw payload bytes. Payloads without a header never
//! expire by time.

use std::time::{SystemTime, UNIX_EPOCH};

/// Byte that terminates the header.
const SEPARATOR: u8 = b' ';

// == Encode ==
/// Prepends an expiration header when `ttl_seconds` carries a positive TTL.
///
/// `None` or a zero TTL returns the payload unchanged: such entries carry no
/// header and never expire.
pub fn encode(ttl_seconds: Option<u64>, payload: &[u8]) -> Vec<u8> {
    match ttl_seconds {
        Some(ttl) if ttl > 0 => {
            let mut out = format!("{:013}-{} ", current_timestamp_ms(), ttl).into_bytes();
            out.extend_from_slice(payload);
            out
        }
        _ => payload.to_vec(),
    }
}

// == Has Header ==
/// Checks whether `data` starts with a structurally valid expiration header.
///
/// Structural test only: the length exceeds 15, byte 13 is `-`, and the
/// first space lands past index 14. The numeric fields are not validated
/// here.
pub fn has_header(data: &[u8]) -> bool {
    data.len() > 15
        && data[13] == b'-'
        && matches!(index_of(data, SEPARATOR), Some(i) if i > 14)
}

// == Is Expired ==
/// Checks whether `data` carries a header whose TTL has elapsed at `now_ms`.
///
/// An entry expires strictly after `creation + ttl * 1000` milliseconds.
/// Headerless payloads never expire, and malformed numeric fields fail
/// open (treated as not expired) so unparseable legacy data is served
/// rather than destroyed.
pub fn is_expired(data: &[u8], now_ms: u64) -> bool {
    match parse_header(data) {
        Some((created_ms, ttl_seconds)) => {
            now_ms > created_ms.saturating_add(ttl_seconds.saturating_mul(1000))
        }
        None => false,
    }
}

// == Strip ==
/// Returns the payload with the header removed if one is present, else the
/// input unchanged.
pub fn strip(data: &[u8]) -> &[u8] {
    if has_header(data) {
        match index_of(data, SEPARATOR) {
            Some(i) => &data[i + 1..],
            None => data,
        }
    } else {
        data
    }
}

// == Header Parsing ==
/// Extracts `(created_ms, ttl_seconds)` from a header, or `None` when the
/// header is absent or its numeric fields do not parse.
fn parse_header(data: &[u8]) -> Option<(u64, u64)> {
    if !has_header(data) {
        return None;
    }
    let sep = index_of(data, SEPARATOR)?;
    let created_ms = std::str::from_utf8(&data[..13]).ok()?.parse().ok()?;
    let ttl_seconds = std::str::from_utf8(&data[14..sep]).ok()?.parse().ok()?;
    Some((created_ms, ttl_seconds))
}

/// Index of the first occurrence of `byte` in `data`.
fn index_of(data: &[u8], byte: u8) -> Option<usize> {
    data.iter().position(|&b| b == byte)
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
