// Argument definitions for the `otus` binary

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Otus - todos and project diary (relatos) from the terminal
#[derive(Parser, Debug)]
#[command(name = "otus")]
#[command(bin_name = "otus")]
#[command(about = "Manage todos and project relatos")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: <config dir>/otus/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Snapshot file, overriding store.data_path
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Acting user id (default: $USER)
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,

    /// Act as a privileged user
    #[arg(long, global = true)]
    pub admin: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Work with todos
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    /// Work with project relatos
    Relato {
        #[command(subcommand)]
        action: RelatoAction,
    },

    /// Maintain the tipo/prioridade catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

// ============================================================================
// todo
// ============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum TodoAction {
    /// List todos
    List(TodoListArgs),

    /// Show one todo
    Show { id: i64 },

    /// Create a todo
    Create(TodoCreateArgs),

    /// Edit a todo
    Update(TodoUpdateArgs),

    /// Set the status of a todo
    Status { id: i64, status: String },

    /// Mark a todo finalizado
    Complete { id: i64 },

    /// Move a closed todo back to a fazer
    Reopen { id: i64 },

    /// Delete a todo
    Delete { id: i64 },

    /// Counts by status and priority
    Stats {
        /// Only todos assigned to this user
        #[arg(long)]
        assignee: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TodoListArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub created_by: Option<String>,
    #[arg(long)]
    pub project: Option<i64>,
    #[arg(long)]
    pub agenda_task: Option<i64>,
    /// Case-insensitive match on name and description
    #[arg(long)]
    pub search: Option<String>,
    /// Hide finalizado and cancelado todos
    #[arg(long, conflicts_with = "show_closed")]
    pub hide_closed: bool,
    /// Show closed todos even when hidden by default
    #[arg(long)]
    pub show_closed: bool,
    #[arg(long)]
    pub sort: Option<String>,
    /// asc or desc
    #[arg(long)]
    pub direction: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TodoCreateArgs {
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start_date: Option<NaiveDate>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub due_date: Option<NaiveDate>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub project: Option<i64>,
    #[arg(long)]
    pub agenda_task: Option<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct TodoUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    #[arg(long)]
    pub clear_description: bool,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "clear_start_date")]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub clear_start_date: bool,
    #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "clear_due_date")]
    pub due_date: Option<NaiveDate>,
    #[arg(long)]
    pub clear_due_date: bool,
    #[arg(long, conflicts_with = "unassign")]
    pub assignee: Option<String>,
    #[arg(long)]
    pub unassign: bool,
    #[arg(long, conflicts_with = "clear_project")]
    pub project: Option<i64>,
    #[arg(long)]
    pub clear_project: bool,
    #[arg(long, conflicts_with = "clear_agenda_task")]
    pub agenda_task: Option<i64>,
    #[arg(long)]
    pub clear_agenda_task: bool,
}

// ============================================================================
// relato
// ============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum RelatoAction {
    /// List relatos of a project
    List {
        project_code: String,
        #[arg(long)]
        tipo: Option<String>,
        #[arg(long)]
        prioridade: Option<String>,
        /// Only resolved (true) or open (false) relatos
        #[arg(long)]
        resolved: Option<bool>,
    },

    /// Show one relato
    Show { id: i64 },

    /// Record a relato
    Create {
        project_code: String,
        #[arg(long)]
        tipo: String,
        #[arg(long)]
        prioridade: String,
        #[arg(long)]
        titulo: String,
        #[arg(long)]
        descricao: String,
        /// Display name to store with the relato
        #[arg(long)]
        author_name: Option<String>,
    },

    /// Edit a relato
    Update {
        id: i64,
        #[arg(long)]
        titulo: Option<String>,
        #[arg(long)]
        descricao: Option<String>,
        #[arg(long)]
        tipo: Option<String>,
        #[arg(long)]
        prioridade: Option<String>,
        #[arg(long)]
        resolved: Option<bool>,
    },

    /// Mark a relato resolved
    Resolve { id: i64 },

    /// Clear the resolution of a relato
    Reopen { id: i64 },

    /// Delete a relato
    Delete { id: i64 },

    /// Counts for one project
    Stats { project_code: String },
}

// ============================================================================
// catalog
// ============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum CatalogAction {
    /// List entries of one catalog (tipo or prioridade)
    List {
        kind: String,
        /// Include deactivated entries
        #[arg(long)]
        all: bool,
    },

    /// Add an entry
    Add {
        kind: String,
        slug: String,
        label: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        sort_order: Option<i32>,
    },

    /// Edit an entry; the slug cannot change
    Update {
        kind: String,
        id: i64,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, conflicts_with = "clear_color")]
        color: Option<String>,
        #[arg(long)]
        clear_color: bool,
        #[arg(long)]
        sort_order: Option<i32>,
        #[arg(long)]
        active: Option<bool>,
    },

    /// Remove an entry no relato uses
    Remove { kind: String, id: i64 },
}

impl Commands {
    /// Whether the command changes the store
    pub fn is_write(&self) -> bool {
        match self {
            Commands::Todo { action } => !matches!(
                action,
                TodoAction::List(_) | TodoAction::Show { .. } | TodoAction::Stats { .. }
            ),
            Commands::Relato { action } => !matches!(
                action,
                RelatoAction::List { .. } | RelatoAction::Show { .. } | RelatoAction::Stats { .. }
            ),
            Commands::Catalog { action } => !matches!(action, CatalogAction::List { .. }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_todo_create() {
        let cli = Cli::try_parse_from([
            "otus",
            "--user",
            "ana",
            "todo",
            "create",
            "Write report",
            "--priority",
            "alta",
            "--due-date",
            "2026-03-01",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("ana"));
        match cli.command {
            Commands::Todo {
                action: TodoAction::Create(args),
            } => {
                assert_eq!(args.name, "Write report");
                assert_eq!(args.priority.as_deref(), Some("alta"));
                assert_eq!(args.due_date, NaiveDate::from_ymd_opt(2026, 3, 1));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_patch_flags_rejected() {
        let result = Cli::try_parse_from([
            "otus",
            "todo",
            "update",
            "1",
            "--assignee",
            "bruno",
            "--unassign",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["otus", "relato", "resolve", "4", "--admin"]).unwrap();
        assert!(cli.admin);
        assert!(cli.command.is_write());
    }

    #[test]
    fn test_reads_are_not_writes() {
        let cli = Cli::try_parse_from(["otus", "catalog", "list", "tipo"]).unwrap();
        assert!(!cli.command.is_write());
        let cli = Cli::try_parse_from(["otus", "todo", "stats"]).unwrap();
        assert!(!cli.command.is_write());
    }
}
