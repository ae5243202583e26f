//! Free text to id-safe tokens.

use serde::{Deserialize, Serialize};

use crate::table::CellValue;

/// How whitespace left inside a cleaned token is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitespacePolicy {
    /// Drop every whitespace character: `Ground Floor` -> `GROUNDFLOOR`.
    #[default]
    Strip,
    /// Replace every whitespace character with `_`: `Food Court` -> `FOOD_COURT`.
    Underscore,
}

/// Trim, keep only alphanumerics and whitespace, apply `policy`, then uppercase.
///
/// Never fails: empty input gives an empty token.
pub fn clean(text: &str, policy: WhitespacePolicy) -> String {
    let trimmed = text.trim();
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            match policy {
                WhitespacePolicy::Strip => {}
                WhitespacePolicy::Underscore => out.push('_'),
            }
        } else if ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        }
    }
    out
}

/// [`clean`] applied to the textual form of a cell.
pub fn clean_value(value: &CellValue, policy: WhitespacePolicy) -> String {
    clean(&value.to_text(), policy)
}
