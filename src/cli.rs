use clap::{Args, Parser, Subcommand};

use crate::commands::ListOptions;

#[derive(Parser)]
#[command(name = "leadflow")]
#[command(about = "Leads, properties and tasks from the LeadFlow CRM")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage leads
    #[command(visible_alias = "l")]
    Leads {
        #[command(subcommand)]
        action: EntityAction,
    },

    /// Manage property listings
    #[command(visible_alias = "p")]
    Properties {
        #[command(subcommand)]
        action: EntityAction,
    },

    /// Manage tasks
    #[command(visible_alias = "t")]
    Tasks {
        #[command(subcommand)]
        action: EntityAction,
    },

    /// Show tasks as a board of status columns
    #[command(visible_alias = "b")]
    Board {
        /// Only show cards matching this text
        #[arg(short, long)]
        search: Option<String>,

        /// Move a task one column to the right before showing the board
        #[arg(long, value_name = "ID", value_parser = parse_record_id, conflicts_with = "back")]
        advance: Option<String>,

        /// Move a task one column to the left before showing the board
        #[arg(long, value_name = "ID", value_parser = parse_record_id)]
        back: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show dashboard statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum EntityAction {
    /// List one page of records
    Ls {
        #[command(flatten)]
        list: ListArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a record
    Add {
        /// Field assignment, repeatable (e.g. --set name=Alice)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update fields of a record
    Update {
        /// Record ID
        #[arg(value_parser = parse_record_id)]
        id: String,

        /// Field assignment, repeatable (e.g. --set status=won)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a record
    #[command(visible_alias = "delete")]
    Rm {
        /// Record ID
        #[arg(value_parser = parse_record_id)]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Search text, matched against every field
    #[arg(short, long)]
    pub search: Option<String>,

    /// Status filter (`all` for every status)
    #[arg(long)]
    pub status: Option<String>,

    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Records per page (default from config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
}

impl From<ListArgs> for ListOptions {
    fn from(args: ListArgs) -> Self {
        ListOptions {
            search: args.search,
            status: args.status,
            sort: args.sort,
            desc: args.desc,
            page: args.page,
            limit: args.limit,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a configuration value
    Set {
        /// Key: api_url, auth.token, page_limit, keep_stale_on_error, request_timeout
        key: String,

        /// Value to store (empty clears auth.token)
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_record_id(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("ID cannot be empty".to_string());
    }

    if s.chars().any(char::is_whitespace) {
        return Err("ID cannot contain whitespace".to_string());
    }

    Ok(s.to_string())
}
