//! Tabular view model.
//!
//! [`project`] turns a store snapshot and a [`ViewConfig`] into a
//! [`TableView`]: records are filtered by the search term, sorted by the sort
//! key, and each declared column is formatted. Projection is a pure function
//! of its inputs; it never mutates the snapshot and is recomputed in full
//! whenever an input changes.

pub mod board;
pub mod columns;
pub mod config;
pub mod filter;
pub mod sort;

use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::entity::Entity;
use crate::store::CollectionSnapshot;

pub use board::{Board, BoardColumn, column_name, compute_board, next_status, prev_status};
pub use columns::{
    CellFormat, Column, columns_for, lead_columns, property_columns, sortable_column, task_columns,
};
pub use config::{SortDirection, SortKey, ViewConfig};
pub use filter::{contains_case_insensitive, matches_search};

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    /// Formatted cell text, one entry per column
    pub cells: Vec<String>,
}

/// Filtered and sorted records ready for display.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    columns: &'a [Column],
    records: Vec<Map<String, Value>>,
    sort: Option<SortKey>,
}

impl<'a> TableView<'a> {
    pub fn columns(&self) -> &'a [Column] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display rows, formatted on demand. The iterator can be cloned to
    /// restart from the current position.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            records: self.records.iter(),
            columns: self.columns,
        }
    }

    /// Raw field maps in display order.
    pub fn records(&self) -> &[Map<String, Value>] {
        &self.records
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(record_id).collect()
    }

    /// Header labels with a direction arrow on the sorted column.
    pub fn headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| match &self.sort {
                Some(key) if key.column == column.key => {
                    format!("{} {}", column.label, key.direction.arrow())
                }
                _ => column.label.to_string(),
            })
            .collect()
    }

    /// Render as a terminal table with colored badges.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return "No data found".to_string();
        }

        let mut builder = Builder::default();
        let mut header = vec!["ID".to_string()];
        header.extend(self.headers());
        builder.push_record(header);

        for row in self.rows() {
            let mut record = vec![row.id.clone()];
            record.extend(
                self.columns
                    .iter()
                    .zip(&row.cells)
                    .map(|(column, text)| column.paint(text)),
            );
            builder.push_record(record);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }
}

/// Lazy iterator over a [`TableView`]'s rows.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    records: std::slice::Iter<'a, Map<String, Value>>,
    columns: &'a [Column],
}

impl Iterator for Rows<'_> {
    type Item = RowView;

    fn next(&mut self) -> Option<RowView> {
        let record = self.records.next()?;
        Some(RowView {
            id: record_id(record).to_string(),
            cells: self
                .columns
                .iter()
                .map(|column| column.format_value(record.get(column.key).unwrap_or(&Value::Null)))
                .collect(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for Rows<'_> {}

fn record_id(record: &Map<String, Value>) -> &str {
    record.get("id").and_then(Value::as_str).unwrap_or_default()
}

/// Filter, sort and project a snapshot.
pub fn project<'a, E: Entity>(
    snapshot: &CollectionSnapshot<E>,
    config: &ViewConfig,
    columns: &'a [Column],
) -> TableView<'a> {
    project_items(&snapshot.items, config, columns)
}

/// [`project`] over a plain slice of records.
pub fn project_items<'a, E: Entity>(
    items: &[E],
    config: &ViewConfig,
    columns: &'a [Column],
) -> TableView<'a> {
    let mut records: Vec<Map<String, Value>> = items
        .iter()
        .map(Entity::fields)
        .filter(|fields| matches_search(fields, &config.search))
        .collect();

    if let Some(key) = &config.sort {
        sort::sort_records(&mut records, key, |r| r);
    }

    TableView {
        columns,
        records,
        sort: config.sort.clone(),
    }
}
