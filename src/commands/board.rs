use serde_json::{Value, json};
use tracing::debug;

use super::CommandOutput;
use crate::app::AppContext;
use crate::cli::OutputOptions;
use crate::entity::Entity;
use crate::error::{LeadflowError, Result};
use crate::remote::Fields;
use crate::store::FetchOutcome;
use crate::toast::Toast;
use crate::view::{column_name, compute_board, next_status, prev_status};

/// Tasks fetched for the board in one request.
const BOARD_PAGE_LIMIT: u32 = 100;

/// Moving a card one column over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardMove {
    Advance(String),
    Back(String),
}

/// Show the task board, optionally moving one card first
pub async fn cmd_board(
    ctx: &AppContext,
    search: Option<&str>,
    movement: Option<BoardMove>,
    output: OutputOptions,
) -> Result<()> {
    let store = &ctx.tasks;
    let query = ctx.list_query().limit(BOARD_PAGE_LIMIT);
    if store.fetch(&query).await? == FetchOutcome::Superseded {
        return Ok(());
    }

    if let Some(movement) = movement {
        let (id, forward) = match &movement {
            BoardMove::Advance(id) => (id.as_str(), true),
            BoardMove::Back(id) => (id.as_str(), false),
        };
        let task = store
            .get(id)
            .ok_or_else(|| LeadflowError::NotFound(format!("Task not found: {id}")))?;
        let current = task.status_kind().ok_or_else(|| {
            LeadflowError::Validation(format!(
                "task {id} has status '{}', which is not a board column",
                task.status
            ))
        })?;
        let target = if forward {
            next_status(current)
        } else {
            prev_status(current)
        }
        .ok_or_else(|| {
            LeadflowError::Validation(format!(
                "task {id} is already in the {} column",
                if forward { "last" } else { "first" }
            ))
        })?;

        debug!(id, from = %task.status, to = %target, "moving card");
        let mut fields = Fields::new();
        fields.insert("status".to_string(), Value::String(target.to_string()));
        store.update(id, &fields).await?;
        ctx.notifications
            .push(Toast::success(format!("Moved {id} to {}", column_name(target))));
    }

    let snapshot = store.snapshot();
    let board = compute_board(&snapshot.items, search.unwrap_or_default());

    let columns: Vec<Value> = board
        .columns
        .iter()
        .map(|column| {
            json!({
                "status": column.status.as_str(),
                "name": column.name,
                "tasks": column
                    .tasks
                    .iter()
                    .map(|task| Value::Object(task.fields()))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    let unplaced: Vec<Value> = board
        .unplaced
        .iter()
        .map(|task| Value::Object(task.fields()))
        .collect();

    CommandOutput::new(json!({
        "columns": columns,
        "other": unplaced,
        "total_filtered": board.total_filtered,
        "total": board.total_all,
    }))
    .with_text(board.render())
    .print(output)
}
