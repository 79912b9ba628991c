//! Todo use cases

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use otus_domain::{
    AgendaTaskId, NewTodo, ProjectId, TaskPriority, TaskStatus, Todo, TodoDetailsPatch,
    TodoFilters, TodoId, TodoQuery, TodoRepository, TodoSort, TodoStats, UserId,
};

use super::{optional_user, require_text, UseCase};
use crate::dto::{
    CreateTodoCommand, ListTodosQuery, TodoActionCommand, TodoResponse, UpdateTodoCommand,
};
use crate::enrichment::load_todo_lookups;
use crate::errors::{ApplicationError, ApplicationResult};

pub type SharedTodoRepository = Arc<dyn TodoRepository>;

/// List behaviour when the caller leaves sort or visibility unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoListDefaults {
    pub sort: TodoSort,
    pub hide_closed: bool,
}

async fn load(repo: &dyn TodoRepository, id: TodoId) -> ApplicationResult<Todo> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Todo", id))
}

async fn respond(repo: &dyn TodoRepository, todo: &Todo) -> TodoResponse {
    let lookups = load_todo_lookups(repo, std::slice::from_ref(todo)).await;
    TodoResponse::from_domain(todo, &lookups)
}

/// Upsert the agenda/project link when both are set; failure is logged only
async fn link_agenda_best_effort(repo: &dyn TodoRepository, todo: &Todo) {
    let (Some(agenda_task_id), Some(project_id)) = (todo.agenda_task_id(), todo.project_id())
    else {
        return;
    };
    if let Err(err) = repo
        .ensure_agenda_project_link(agenda_task_id, project_id)
        .await
    {
        warn!(
            todo_id = ?todo.id().map(|id| id.value()),
            %agenda_task_id,
            %project_id,
            error = %err,
            "Agenda/project link failed; todo was saved without it"
        );
    }
}

fn parse_status(raw: Option<&str>) -> ApplicationResult<Option<TaskStatus>> {
    Ok(raw.map(TaskStatus::parse).transpose()?)
}

fn parse_priority(raw: Option<&str>) -> ApplicationResult<Option<TaskPriority>> {
    Ok(raw.map(TaskPriority::parse).transpose()?)
}

// ============================================================================
// CreateTodo
// ============================================================================

pub struct CreateTodo {
    repo: SharedTodoRepository,
}

impl CreateTodo {
    pub fn new(repo: SharedTodoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for CreateTodo {
    type Input = CreateTodoCommand;
    type Output = TodoResponse;

    async fn execute(&self, cmd: CreateTodoCommand) -> ApplicationResult<TodoResponse> {
        let name = require_text("name", &cmd.name)?;
        let props = NewTodo {
            name,
            description: cmd.description,
            status: parse_status(cmd.status.as_deref())?,
            priority: parse_priority(cmd.priority.as_deref())?,
            start_date: cmd.start_date,
            due_date: cmd.due_date,
            assignee: optional_user(cmd.assignee.as_deref())?,
            created_by: Some(cmd.actor.user_id.clone()),
            project_id: cmd.project_id.map(ProjectId::new).transpose()?,
            agenda_task_id: cmd.agenda_task_id.map(AgendaTaskId::new).transpose()?,
        };
        let todo = Todo::create(props)?;

        let saved = self.repo.save(&todo).await?;
        info!(id = ?saved.id().map(|id| id.value()), user = %cmd.actor.user_id, "Todo created");
        link_agenda_best_effort(&*self.repo, &saved).await;

        Ok(respond(&*self.repo, &saved).await)
    }
}

// ============================================================================
// ListTodos
// ============================================================================

pub struct ListTodos {
    repo: SharedTodoRepository,
    defaults: TodoListDefaults,
}

impl ListTodos {
    pub fn new(repo: SharedTodoRepository, defaults: TodoListDefaults) -> Self {
        Self { repo, defaults }
    }
}

#[async_trait]
impl UseCase for ListTodos {
    type Input = ListTodosQuery;
    type Output = Vec<TodoResponse>;

    async fn execute(&self, query: ListTodosQuery) -> ApplicationResult<Vec<TodoResponse>> {
        let filters = TodoFilters {
            status: parse_status(query.status.as_deref())?,
            priority: parse_priority(query.priority.as_deref())?,
            assignee: optional_user(query.assignee.as_deref())?,
            created_by: optional_user(query.created_by.as_deref())?,
            project_id: query.project_id.map(ProjectId::new).transpose()?,
            agenda_task_id: query.agenda_task_id.map(AgendaTaskId::new).transpose()?,
            search: query.search.filter(|s| !s.trim().is_empty()),
            hide_closed: query.hide_closed.unwrap_or(self.defaults.hide_closed),
        };
        let sort = TodoSort::parse(
            query.sort.as_deref(),
            query.direction.as_deref(),
            self.defaults.sort,
        )?;
        debug!(?filters, ?sort, "Listing todos");

        let todos = self.repo.find_all(&TodoQuery { filters, sort }).await?;
        let lookups = load_todo_lookups(&*self.repo, &todos).await;
        Ok(todos
            .iter()
            .map(|todo| TodoResponse::from_domain(todo, &lookups))
            .collect())
    }
}

// ============================================================================
// GetTodo
// ============================================================================

pub struct GetTodo {
    repo: SharedTodoRepository,
}

impl GetTodo {
    pub fn new(repo: SharedTodoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for GetTodo {
    type Input = i64;
    type Output = Option<TodoResponse>;

    async fn execute(&self, id: i64) -> ApplicationResult<Option<TodoResponse>> {
        let id = TodoId::new(id)?;
        match self.repo.find_by_id(id).await? {
            Some(todo) => Ok(Some(respond(&*self.repo, &todo).await)),
            None => Ok(None),
        }
    }
}

// ============================================================================
// UpdateTodo
// ============================================================================

pub struct UpdateTodo {
    repo: SharedTodoRepository,
}

impl UpdateTodo {
    pub fn new(repo: SharedTodoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for UpdateTodo {
    type Input = UpdateTodoCommand;
    type Output = TodoResponse;

    async fn execute(&self, cmd: UpdateTodoCommand) -> ApplicationResult<TodoResponse> {
        let id = TodoId::new(cmd.id)?;
        let name = cmd
            .name
            .as_deref()
            .map(|n| require_text("name", n))
            .transpose()?;
        let status = parse_status(cmd.status.as_deref())?;
        let priority = parse_priority(cmd.priority.as_deref())?;
        let assignee = cmd.assignee.try_map(UserId::new)?;
        let project_id = cmd.project_id.try_map(ProjectId::new)?;
        let agenda_task_id = cmd.agenda_task_id.try_map(AgendaTaskId::new)?;

        let mut todo = load(&*self.repo, id).await?;

        let details = TodoDetailsPatch {
            name,
            description: cmd.description,
            start_date: cmd.start_date,
            due_date: cmd.due_date,
        };
        if details.name.is_some()
            || details.description.is_present()
            || details.start_date.is_present()
            || details.due_date.is_present()
        {
            todo.update_details(details)?;
        }
        if let Some(status) = status {
            todo.update_status(status, &cmd.actor.user_id);
        }
        if let Some(priority) = priority {
            todo.update_priority(priority);
        }
        if let Some(assignee) = assignee.into_option() {
            todo.reassign(assignee);
        }
        if let Some(project_id) = project_id.into_option() {
            todo.link_to_project(project_id);
        }
        if let Some(agenda_task_id) = agenda_task_id.into_option() {
            todo.link_to_agenda_task(agenda_task_id);
        }

        let saved = self.repo.update(&todo).await?;
        info!(id = %id, user = %cmd.actor.user_id, status = %saved.status(), "Todo updated");
        link_agenda_best_effort(&*self.repo, &saved).await;

        Ok(respond(&*self.repo, &saved).await)
    }
}

// ============================================================================
// CompleteTodo / ReopenTodo
// ============================================================================

pub struct CompleteTodo {
    repo: SharedTodoRepository,
}

impl CompleteTodo {
    pub fn new(repo: SharedTodoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for CompleteTodo {
    type Input = TodoActionCommand;
    type Output = TodoResponse;

    async fn execute(&self, cmd: TodoActionCommand) -> ApplicationResult<TodoResponse> {
        let id = TodoId::new(cmd.id)?;
        let mut todo = load(&*self.repo, id).await?;
        todo.complete(&cmd.actor.user_id)?;
        let saved = self.repo.update(&todo).await?;
        info!(id = %id, user = %cmd.actor.user_id, "Todo completed");
        Ok(respond(&*self.repo, &saved).await)
    }
}

pub struct ReopenTodo {
    repo: SharedTodoRepository,
}

impl ReopenTodo {
    pub fn new(repo: SharedTodoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for ReopenTodo {
    type Input = TodoActionCommand;
    type Output = TodoResponse;

    async fn execute(&self, cmd: TodoActionCommand) -> ApplicationResult<TodoResponse> {
        let id = TodoId::new(cmd.id)?;
        let mut todo = load(&*self.repo, id).await?;
        todo.reopen()?;
        let saved = self.repo.update(&todo).await?;
        info!(id = %id, user = %cmd.actor.user_id, "Todo reopened");
        Ok(respond(&*self.repo, &saved).await)
    }
}

// ============================================================================
// DeleteTodo
// ============================================================================

pub struct DeleteTodo {
    repo: SharedTodoRepository,
}

impl DeleteTodo {
    pub fn new(repo: SharedTodoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for DeleteTodo {
    type Input = TodoActionCommand;
    type Output = ();

    async fn execute(&self, cmd: TodoActionCommand) -> ApplicationResult<()> {
        let id = TodoId::new(cmd.id)?;
        let todo = load(&*self.repo, id).await?;
        if !cmd.actor.privileged && !todo.is_owned_by(&cmd.actor.user_id) {
            return Err(ApplicationError::Forbidden(format!(
                "only the creator, the assignee or a privileged user may delete todo {}",
                id
            )));
        }
        self.repo.delete(id).await?;
        info!(id = %id, user = %cmd.actor.user_id, "Todo deleted");
        Ok(())
    }
}

// ============================================================================
// GetTodoStats
// ============================================================================

pub struct GetTodoStats {
    repo: SharedTodoRepository,
}

impl GetTodoStats {
    pub fn new(repo: SharedTodoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for GetTodoStats {
    /// Restrict to todos assigned to this user
    type Input = Option<String>;
    type Output = TodoStats;

    async fn execute(&self, assignee: Option<String>) -> ApplicationResult<TodoStats> {
        let assignee = optional_user(assignee.as_deref())?;
        Ok(self.repo.get_stats(assignee.as_ref()).await?)
    }
}
