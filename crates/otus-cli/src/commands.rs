// Command dispatch: one invocation runs one use case against the snapshot

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use otus_application::{
    CatalogUseCases, CreateCatalogEntryCommand, CreateRelatoCommand, CreateTodoCommand,
    DeleteCatalogEntryCommand, ListCatalogQuery, ListRelatosQuery, ListTodosQuery,
    RelatoActionCommand, RelatoUseCases, TodoActionCommand, TodoListDefaults, TodoUseCases,
    UpdateCatalogEntryCommand, UpdateRelatoCommand, UpdateTodoCommand, UseCase, UseCases,
};
use otus_config::{init_tracing, AppConfig, ConfigManager};
use otus_domain::{Actor, CatalogKind, Patch, UserId};
use otus_persistence::{InMemoryRelatoRepository, InMemoryTodoRepository, SnapshotFile};

use crate::cli::{CatalogAction, Cli, Commands, RelatoAction, TodoAction, TodoUpdateArgs};
use crate::output;

/// Entry point used by `main`
pub async fn run(cli: Cli) -> Result<()> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager
        .load_validated()
        .with_context(|| format!("loading {}", manager.config_path().display()))?;
    init_tracing(&config.logging)?;

    let value = execute(&cli, &config).await?;
    output::print_json(&value)
}

/// Run the command and return its JSON output; persists after writes
pub async fn execute(cli: &Cli, config: &AppConfig) -> Result<Value> {
    let data_path = cli
        .data
        .clone()
        .unwrap_or_else(|| config.store.data_path.clone());
    let snapshot = SnapshotFile::new(data_path);
    let store = snapshot
        .open_store(config.store.seed_catalog)
        .await
        .with_context(|| format!("opening {}", snapshot.path().display()))?;

    let defaults = TodoListDefaults {
        sort: config.todos.sort()?,
        hide_closed: config.todos.hide_closed_by_default,
    };
    let use_cases = UseCases::new(
        Arc::new(InMemoryTodoRepository::new(store.clone())),
        Arc::new(InMemoryRelatoRepository::new(store.clone())),
        defaults,
    );

    let value = match &cli.command {
        Commands::Todo { action } => todo(&use_cases.todos, action, cli).await?,
        Commands::Relato { action } => relato(&use_cases.relatos, action, cli).await?,
        Commands::Catalog { action } => catalog(&use_cases.catalog, action, cli).await?,
    };

    if cli.command.is_write() {
        snapshot
            .save_store(&store)
            .await
            .with_context(|| format!("saving {}", snapshot.path().display()))?;
        debug!(path = %snapshot.path().display(), "Snapshot saved");
    }
    Ok(value)
}

fn actor(cli: &Cli) -> Result<Actor> {
    let raw = match &cli.user {
        Some(user) => user.clone(),
        None => std::env::var("USER").context("no --user given and $USER is unset")?,
    };
    let user_id = UserId::new(raw)?;
    Ok(if cli.admin {
        Actor::privileged(user_id)
    } else {
        Actor::member(user_id)
    })
}

/// `--x value` sets, `--clear-x` nulls, neither leaves the field alone
fn patch<T>(value: Option<T>, clear: bool) -> Patch<T> {
    match (value, clear) {
        (_, true) => Patch::Null,
        (Some(v), false) => Patch::Value(v),
        (None, false) => Patch::Absent,
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn kind(raw: &str) -> Result<CatalogKind> {
    Ok(raw.parse()?)
}

async fn todo(uc: &TodoUseCases, action: &TodoAction, cli: &Cli) -> Result<Value> {
    match action {
        TodoAction::List(args) => {
            let hide_closed = if args.hide_closed {
                Some(true)
            } else if args.show_closed {
                Some(false)
            } else {
                None
            };
            let query = ListTodosQuery {
                status: args.status.clone(),
                priority: args.priority.clone(),
                assignee: args.assignee.clone(),
                created_by: args.created_by.clone(),
                project_id: args.project,
                agenda_task_id: args.agenda_task,
                search: args.search.clone(),
                hide_closed,
                sort: args.sort.clone(),
                direction: args.direction.clone(),
            };
            to_json(uc.list.execute(query).await?)
        }
        TodoAction::Show { id } => {
            let todo = uc
                .get
                .execute(*id)
                .await?
                .ok_or_else(|| anyhow!("Todo not found: {}", id))?;
            to_json(todo)
        }
        TodoAction::Create(args) => {
            let cmd = CreateTodoCommand {
                actor: actor(cli)?,
                name: args.name.clone(),
                description: args.description.clone(),
                status: args.status.clone(),
                priority: args.priority.clone(),
                start_date: args.start_date,
                due_date: args.due_date,
                assignee: args.assignee.clone(),
                project_id: args.project,
                agenda_task_id: args.agenda_task,
            };
            to_json(uc.create.execute(cmd).await?)
        }
        TodoAction::Update(args) => to_json(uc.update.execute(update_command(cli, args)?).await?),
        TodoAction::Status { id, status } => {
            let mut cmd = UpdateTodoCommand::new(actor(cli)?, *id);
            cmd.status = Some(status.clone());
            to_json(uc.update.execute(cmd).await?)
        }
        TodoAction::Complete { id } => {
            let cmd = TodoActionCommand {
                actor: actor(cli)?,
                id: *id,
            };
            to_json(uc.complete.execute(cmd).await?)
        }
        TodoAction::Reopen { id } => {
            let cmd = TodoActionCommand {
                actor: actor(cli)?,
                id: *id,
            };
            to_json(uc.reopen.execute(cmd).await?)
        }
        TodoAction::Delete { id } => {
            let cmd = TodoActionCommand {
                actor: actor(cli)?,
                id: *id,
            };
            uc.delete.execute(cmd).await?;
            Ok(json!({ "deleted": id }))
        }
        TodoAction::Stats { assignee } => to_json(uc.stats.execute(assignee.clone()).await?),
    }
}

fn update_command(cli: &Cli, args: &TodoUpdateArgs) -> Result<UpdateTodoCommand> {
    let mut cmd = UpdateTodoCommand::new(actor(cli)?, args.id);
    cmd.name = args.name.clone();
    cmd.description = patch(args.description.clone(), args.clear_description);
    cmd.status = args.status.clone();
    cmd.priority = args.priority.clone();
    cmd.start_date = patch(args.start_date, args.clear_start_date);
    cmd.due_date = patch(args.due_date, args.clear_due_date);
    cmd.assignee = patch(args.assignee.clone(), args.unassign);
    cmd.project_id = patch(args.project, args.clear_project);
    cmd.agenda_task_id = patch(args.agenda_task, args.clear_agenda_task);
    Ok(cmd)
}

async fn relato(uc: &RelatoUseCases, action: &RelatoAction, cli: &Cli) -> Result<Value> {
    match action {
        RelatoAction::List {
            project_code,
            tipo,
            prioridade,
            resolved,
        } => {
            let query = ListRelatosQuery {
                project_code: project_code.clone(),
                tipo: tipo.clone(),
                prioridade: prioridade.clone(),
                resolved: *resolved,
            };
            to_json(uc.list.execute(query).await?)
        }
        RelatoAction::Show { id } => {
            let relato = uc
                .get
                .execute(*id)
                .await?
                .ok_or_else(|| anyhow!("Relato not found: {}", id))?;
            to_json(relato)
        }
        RelatoAction::Create {
            project_code,
            tipo,
            prioridade,
            titulo,
            descricao,
            author_name,
        } => {
            let cmd = CreateRelatoCommand {
                actor: actor(cli)?,
                project_code: project_code.clone(),
                tipo: tipo.clone(),
                prioridade: prioridade.clone(),
                titulo: titulo.clone(),
                descricao: descricao.clone(),
                author_name: author_name.clone(),
            };
            to_json(uc.create.execute(cmd).await?)
        }
        RelatoAction::Update {
            id,
            titulo,
            descricao,
            tipo,
            prioridade,
            resolved,
        } => {
            let mut cmd = UpdateRelatoCommand::new(actor(cli)?, *id);
            cmd.titulo = titulo.clone();
            cmd.descricao = descricao.clone();
            cmd.tipo = tipo.clone();
            cmd.prioridade = prioridade.clone();
            cmd.is_resolved = *resolved;
            to_json(uc.update.execute(cmd).await?)
        }
        RelatoAction::Resolve { id } => {
            let cmd = RelatoActionCommand {
                actor: actor(cli)?,
                id: *id,
            };
            to_json(uc.resolve.execute(cmd).await?)
        }
        RelatoAction::Reopen { id } => {
            let cmd = RelatoActionCommand {
                actor: actor(cli)?,
                id: *id,
            };
            to_json(uc.reopen.execute(cmd).await?)
        }
        RelatoAction::Delete { id } => {
            let cmd = RelatoActionCommand {
                actor: actor(cli)?,
                id: *id,
            };
            uc.delete.execute(cmd).await?;
            Ok(json!({ "deleted": id }))
        }
        RelatoAction::Stats { project_code } => {
            to_json(uc.stats.execute(project_code.clone()).await?)
        }
    }
}

async fn catalog(uc: &CatalogUseCases, action: &CatalogAction, cli: &Cli) -> Result<Value> {
    match action {
        CatalogAction::List { kind: raw, all } => {
            let query = ListCatalogQuery {
                kind: kind(raw)?,
                include_inactive: *all,
            };
            to_json(uc.list.execute(query).await?)
        }
        CatalogAction::Add {
            kind: raw,
            slug,
            label,
            color,
            sort_order,
        } => {
            let cmd = CreateCatalogEntryCommand {
                actor: actor(cli)?,
                kind: kind(raw)?,
                slug: slug.clone(),
                label: label.clone(),
                color: color.clone(),
                sort_order: *sort_order,
            };
            to_json(uc.create.execute(cmd).await?)
        }
        CatalogAction::Update {
            kind: raw,
            id,
            label,
            color,
            clear_color,
            sort_order,
            active,
        } => {
            let mut cmd = UpdateCatalogEntryCommand::new(actor(cli)?, kind(raw)?, *id);
            cmd.label = label.clone();
            cmd.color = patch(color.clone(), *clear_color);
            cmd.sort_order = *sort_order;
            cmd.active = *active;
            to_json(uc.update.execute(cmd).await?)
        }
        CatalogAction::Remove { kind: raw, id } => {
            let cmd = DeleteCatalogEntryCommand {
                actor: actor(cli)?,
                kind: kind(raw)?,
                id: *id,
            };
            uc.delete.execute(cmd).await?;
            Ok(json!({ "deleted": id }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_flags() {
        assert_eq!(patch(Some(1), false), Patch::Value(1));
        assert_eq!(patch(None::<i32>, true), Patch::Null);
        assert_eq!(patch(None::<i32>, false), Patch::Absent);
    }
}
