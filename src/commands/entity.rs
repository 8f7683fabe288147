//! Collection commands shared by leads, properties and tasks.
//!
//! - `ls`: fetch a page and print it as a table
//! - `add`: fill a blank form and submit it
//! - `update`: edit a record and submit the changes
//! - `rm`: delete a record

use owo_colors::OwoColorize;
use serde_json::{Value, json};

use super::{CommandOutput, parse_assignments};
use crate::app::{AppContext, StoreAccess};
use crate::cli::OutputOptions;
use crate::entity::Entity;
use crate::error::Result;
use crate::form::EditSession;
use crate::store::FetchOutcome;
use crate::toast::Toast;
use crate::types::StatusFilter;
use crate::view::{SortKey, ViewConfig, columns_for, project, sortable_column};

/// Arguments of `ls`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub desc: bool,
    pub page: u32,
    pub limit: Option<u32>,
}

/// List one page of a collection
pub async fn cmd_ls<E: StoreAccess>(
    ctx: &AppContext,
    options: ListOptions,
    output: OutputOptions,
) -> Result<()> {
    let columns = columns_for(E::KIND);

    // Reject bad arguments before any request goes out.
    let sort = options
        .sort
        .as_deref()
        .map(|column| sortable_column(columns, column))
        .transpose()?
        .map(|column| {
            if options.desc {
                SortKey::descending(column)
            } else {
                SortKey::ascending(column)
            }
        });
    let status = options.status.as_deref().map(|status| {
        let filter = E::KIND.parse_status(status);
        if let StatusFilter::Unlisted(value) = &filter {
            ctx.notifications.push(Toast::warning(format!(
                "'{}' is not a known {} status ({}); filtering on it as typed",
                value,
                E::KIND.singular(),
                E::KIND.known_statuses().join(", ")
            )));
        }
        filter.into_string()
    });

    let mut query = ctx.list_query().page(options.page);
    if let Some(limit) = options.limit {
        query = query.limit(limit);
    }
    if let Some(search) = &options.search {
        query = query.search(search.clone());
    }
    if let Some(status) = status {
        query = query.status(status);
    }

    let store = ctx.store::<E>();
    if store.fetch(&query).await? == FetchOutcome::Superseded {
        return Ok(());
    }

    let snapshot = store.snapshot();
    let mut config = ViewConfig::new().with_search(options.search.unwrap_or_default());
    config.sort = sort;
    let table = project(&snapshot, &config, columns);

    let items: Vec<Value> = table.records().iter().cloned().map(Value::Object).collect();
    let mut json_output = json!({
        "pagination": snapshot.pagination,
        "total": snapshot.total,
    });
    json_output[E::KIND.collection()] = Value::Array(items);

    let footer = format!(
        "Showing {} of {} {} (page {})",
        table.len(),
        snapshot.total,
        E::KIND.collection(),
        snapshot.pagination.page
    );
    let text_output = format!("{}\n{}", table.render(), footer.dimmed());

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Create a record from `FIELD=VALUE` assignments
pub async fn cmd_add<E: StoreAccess>(
    ctx: &AppContext,
    assignments: &[String],
    output: OutputOptions,
) -> Result<()> {
    let changes = parse_assignments::<E>(assignments)?;

    let mut session = EditSession::<E>::new();
    session.open(None);
    for (field, value) in changes {
        session.change(&field, value)?;
    }
    let created = session.submit(ctx.store::<E>()).await?;

    print_record(
        &created,
        format!("Created {} {}", E::KIND.singular(), created.id().cyan()),
        output,
    )
}

/// Update a record from `FIELD=VALUE` assignments
///
/// A record already in the snapshot is edited in full; otherwise only the
/// assigned fields are sent.
pub async fn cmd_update<E: StoreAccess>(
    ctx: &AppContext,
    id: &str,
    assignments: &[String],
    output: OutputOptions,
) -> Result<()> {
    let changes = parse_assignments::<E>(assignments)?;
    let store = ctx.store::<E>();

    let mut session = EditSession::<E>::new();
    match store.get(id) {
        Some(existing) => {
            session.open(Some(&existing));
        }
        None => session.open_by_id(id),
    }
    for (field, value) in changes {
        session.change(&field, value)?;
    }
    let updated = session.submit(store).await?;

    print_record(
        &updated,
        format!("Updated {} {}", E::KIND.singular(), updated.id().cyan()),
        output,
    )
}

/// Delete a record
pub async fn cmd_rm<E: StoreAccess>(ctx: &AppContext, id: &str, output: OutputOptions) -> Result<()> {
    let deleted = ctx.store::<E>().delete(id).await?;

    CommandOutput::new(json!({
        "action": "deleted",
        "kind": E::KIND.singular(),
        "id": &deleted,
    }))
    .with_text(format!("Deleted {} {}", E::KIND.singular(), deleted.cyan()))
    .print(output)
}

fn print_record<E: Entity>(record: &E, text: String, output: OutputOptions) -> Result<()> {
    CommandOutput::new(Value::Object(record.fields()))
        .with_text(text)
        .print(output)
}
