//! Price-update payload handling.
//!
//! Hermes returns update payloads as hex strings, sometimes without the `0x`
//! prefix. Payloads must be normalized and decoded before they can be placed
//! in the `bytes[]` argument of the distribution transaction. Anything
//! malformed fails closed as an oracle error for the step that depends on it.

use crate::{PaylotError, Result};
use ethers::types::Bytes;

/// Normalize one payload entry: prepend `0x` when missing, pass a prefixed
/// entry through unchanged.
pub fn normalize_update_hex(entry: &str) -> String {
    if entry.starts_with("0x") {
        entry.to_string()
    } else {
        format!("0x{entry}")
    }
}

/// Normalize, validate and decode the payload list returned by the oracle.
///
/// Postconditions:
/// - The returned list is non-empty and every element decoded from valid,
///   non-empty hex.
pub fn decode_update_payloads(entries: &[String]) -> Result<Vec<Bytes>> {
    if entries.is_empty() {
        return Err(PaylotError::OracleError(
            "price update data from the oracle is empty".into(),
        ));
    }

    entries
        .iter()
        .map(|entry| {
            let normalized = normalize_update_hex(entry);
            let raw = hex::decode(&normalized[2..]).map_err(|e| {
                PaylotError::OracleError(format!("invalid hex in price update payload: {e}"))
            })?;
            if raw.is_empty() {
                return Err(PaylotError::OracleError(
                    "empty price update payload entry".into(),
                ));
            }
            Ok(Bytes::from(raw))
        })
        .collect()
}
