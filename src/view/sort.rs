//! Column sort over field maps.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::entity::FieldValue;

use super::config::{SortDirection, SortKey};

fn field(fields: &Map<String, Value>, column: &str) -> FieldValue {
    fields.get(column).map(FieldValue::from).unwrap_or(FieldValue::Null)
}

/// Compare two records on one column's raw value.
pub fn compare_by_column(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    key: &SortKey,
) -> Ordering {
    let ordering = field(a, &key.column).sort_cmp(&field(b, &key.column));
    match key.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Sort records in place. Records that compare equal keep their input order.
pub fn sort_records<T>(records: &mut [T], key: &SortKey, fields: impl Fn(&T) -> &Map<String, Value>) {
    records.sort_by(|a, b| compare_by_column(fields(a), fields(b), key));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Map<String, Value>> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                _ => unreachable!(),
            })
            .collect()
    }

    fn scores(records: &[Map<String, Value>]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r["score"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_numeric_sort_both_directions() {
        let mut rows = records(vec![
            json!({"score": 10}),
            json!({"score": 30}),
            json!({"score": 20}),
        ]);
        sort_records(&mut rows, &SortKey::ascending("score"), |r| r);
        assert_eq!(scores(&rows), vec![10, 20, 30]);

        sort_records(&mut rows, &SortKey::descending("score"), |r| r);
        assert_eq!(scores(&rows), vec![30, 20, 10]);
    }

    #[test]
    fn test_string_sort_is_by_code_point() {
        let mut rows = records(vec![
            json!({"name": "bob"}),
            json!({"name": "Alice"}),
            json!({"name": "alice"}),
        ]);
        sort_records(&mut rows, &SortKey::ascending("name"), |r| r);
        let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Alice", "alice", "bob"]);
    }

    fn ids(records: &[Map<String, Value>]) -> Vec<&str> {
        records.iter().map(|r| r["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let mut rows = records(vec![
            json!({"id": "a", "score": null}),
            json!({"id": "b"}),
            json!({"id": "c", "score": 5}),
            json!({"id": "d", "score": 5}),
        ]);
        sort_records(&mut rows, &SortKey::ascending("score"), |r| r);
        assert_eq!(ids(&rows), vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_mixed_types_do_not_break_ordering() {
        let mut rows = records(vec![
            json!({"id": "a", "score": 10}),
            json!({"id": "b", "score": null}),
            json!({"id": "c", "score": "n/a"}),
            json!({"id": "d", "score": 5}),
        ]);
        sort_records(&mut rows, &SortKey::ascending("score"), |r| r);
        assert_eq!(ids(&rows), vec!["d", "a", "c", "b"]);

        sort_records(&mut rows, &SortKey::descending("score"), |r| r);
        assert_eq!(ids(&rows), vec!["b", "c", "a", "d"]);
    }
}
