//! Free-text search over record fields.

use serde_json::{Map, Value};

use crate::entity::FieldValue;

/// Case-insensitive substring check.
///
/// Uses `unicase` for Unicode case folding rather than ASCII lowering.
pub fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack_folded = unicase::UniCase::new(haystack).to_folded_case();
    let needle_folded = unicase::UniCase::new(needle).to_folded_case();
    haystack_folded.contains(&needle_folded)
}

/// True when any non-null field value, stringified, contains `term`.
///
/// An empty term matches everything. There is no tokenization: `"ali ex"`
/// only matches values containing that exact run of characters.
pub fn matches_search(fields: &Map<String, Value>, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = unicase::UniCase::new(term).to_folded_case();

    fields.values().any(|value| {
        let value = FieldValue::from(value);
        if value.is_null() {
            return false;
        }
        unicase::UniCase::new(value.to_string())
            .to_folded_case()
            .contains(&needle)
    })
}
