//! Scrum board: tasks grouped into status columns.
//!
//! The board is another projection of the task snapshot. Moving a card is an
//! ordinary task update with the neighbouring column's status.

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::entity::{Entity, Task};
use crate::types::TaskStatus;

use super::filter::matches_search;

/// Board columns, left to right.
pub const COLUMNS: [TaskStatus; 3] = [
    TaskStatus::Pending,
    TaskStatus::InProgress,
    TaskStatus::Completed,
];

#[derive(Debug, Clone)]
pub struct BoardColumn<'a> {
    pub status: TaskStatus,
    pub name: &'static str,
    /// Tasks in snapshot order
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, Clone)]
pub struct Board<'a> {
    pub columns: Vec<BoardColumn<'a>>,
    /// Matching tasks whose status is not a board column
    pub unplaced: Vec<&'a Task>,
    /// Tasks matching the search across all columns
    pub total_filtered: usize,
    pub total_all: usize,
}

/// Heading of the column holding `status`.
pub fn column_name(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "To Do",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Completed => "Done",
    }
}

/// Group tasks matching `search` by status.
pub fn compute_board<'a>(tasks: &'a [Task], search: &str) -> Board<'a> {
    let filtered: Vec<&Task> = tasks
        .iter()
        .filter(|task| matches_search(&task.fields(), search))
        .collect();

    let columns = COLUMNS
        .iter()
        .map(|&status| BoardColumn {
            status,
            name: column_name(status),
            tasks: filtered
                .iter()
                .copied()
                .filter(|task| task.status_kind() == Some(status))
                .collect(),
        })
        .collect();

    let unplaced = filtered
        .iter()
        .copied()
        .filter(|task| task.status_kind().is_none())
        .collect();

    Board {
        columns,
        unplaced,
        total_filtered: filtered.len(),
        total_all: tasks.len(),
    }
}

/// Column to the right, if any.
pub fn next_status(status: TaskStatus) -> Option<TaskStatus> {
    match status {
        TaskStatus::Pending => Some(TaskStatus::InProgress),
        TaskStatus::InProgress => Some(TaskStatus::Completed),
        TaskStatus::Completed => None,
    }
}

/// Column to the left, if any.
pub fn prev_status(status: TaskStatus) -> Option<TaskStatus> {
    match status {
        TaskStatus::Pending => None,
        TaskStatus::InProgress => Some(TaskStatus::Pending),
        TaskStatus::Completed => Some(TaskStatus::InProgress),
    }
}

impl Board<'_> {
    pub fn column(&self, status: TaskStatus) -> Option<&BoardColumn<'_>> {
        self.columns.iter().find(|c| c.status == status)
    }

    /// Side-by-side columns, one card per cell.
    pub fn render(&self) -> String {
        if self.total_all == 0 {
            return "No tasks".to_string();
        }
        if self.total_filtered == 0 {
            return "No tasks match the search".to_string();
        }

        let mut lanes: Vec<(String, &[&Task])> = self
            .columns
            .iter()
            .map(|c| (format!("{} ({})", c.name, c.tasks.len()), c.tasks.as_slice()))
            .collect();
        if !self.unplaced.is_empty() {
            lanes.push((
                format!("Other ({})", self.unplaced.len()),
                self.unplaced.as_slice(),
            ));
        }

        let mut builder = Builder::default();
        builder.push_record(lanes.iter().map(|(header, _)| header.clone()));

        let height = lanes.iter().map(|(_, tasks)| tasks.len()).max().unwrap_or(0);
        for row in 0..height {
            builder.push_record(lanes.iter().map(|(_, tasks)| {
                tasks.get(row).map(|task| card(task)).unwrap_or_default()
            }));
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }
}

fn card(task: &Task) -> String {
    let priority = super::columns::priority_colored(&task.priority);
    format!("{} [{}]\n{}", task.title, priority, task.id.dimmed())
}
