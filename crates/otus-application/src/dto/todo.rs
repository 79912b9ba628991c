//! Todo-related DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use otus_domain::{Actor, Patch, Todo};

use crate::enrichment::TodoLookups;

/// Command to create a todo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoCommand {
    pub actor: Actor,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub agenda_task_id: Option<i64>,
}

/// Partial update of a todo; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodoCommand {
    pub actor: Actor,
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub start_date: Patch<NaiveDate>,
    #[serde(default)]
    pub due_date: Patch<NaiveDate>,
    #[serde(default)]
    pub assignee: Patch<String>,
    #[serde(default)]
    pub project_id: Patch<i64>,
    #[serde(default)]
    pub agenda_task_id: Patch<i64>,
}

impl UpdateTodoCommand {
    /// Empty patch for `id`
    pub fn new(actor: Actor, id: i64) -> Self {
        Self {
            actor,
            id,
            name: None,
            description: Patch::Absent,
            status: None,
            priority: None,
            start_date: Patch::Absent,
            due_date: Patch::Absent,
            assignee: Patch::Absent,
            project_id: Patch::Absent,
            agenda_task_id: Patch::Absent,
        }
    }
}

/// Complete, reopen or delete one todo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoActionCommand {
    pub actor: Actor,
    pub id: i64,
}

/// List filters and ordering, all optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListTodosQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub created_by: Option<String>,
    pub project_id: Option<i64>,
    pub agenda_task_id: Option<i64>,
    pub search: Option<String>,
    /// Falls back to the configured default when unset
    pub hide_closed: Option<bool>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

/// Todo response with joined display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub status_label: String,
    pub priority: String,
    pub priority_label: String,
    pub priority_color: String,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub assignee_name: Option<String>,
    pub created_by: Option<String>,
    pub created_by_name: Option<String>,
    pub project_id: Option<i64>,
    pub project_name: Option<String>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub agenda_task_id: Option<i64>,
    pub agenda_task_name: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_closed: bool,
    pub is_overdue: bool,
}

impl TodoResponse {
    /// Create from domain aggregate
    pub fn from_domain(todo: &Todo, lookups: &TodoLookups) -> Self {
        let project = lookups.project(todo.project_id());
        Self {
            id: todo.id().map(|id| id.value()),
            name: todo.name().to_string(),
            description: todo.description().map(str::to_string),
            status: todo.status().as_str().to_string(),
            status_label: todo.status().label().to_string(),
            priority: todo.priority().as_str().to_string(),
            priority_label: todo.priority().label().to_string(),
            priority_color: todo.priority().color().to_string(),
            start_date: todo.start_date(),
            due_date: todo.due_date(),
            assignee: todo.assignee().map(|u| u.to_string()),
            assignee_name: lookups.user_name(todo.assignee()),
            created_by: todo.created_by().map(|u| u.to_string()),
            created_by_name: lookups.user_name(todo.created_by()),
            project_id: todo.project_id().map(|p| p.value()),
            project_name: project.map(|p| p.name.clone()),
            team_id: project.and_then(|p| p.team_id),
            team_name: project.and_then(|p| p.team_name.clone()),
            agenda_task_id: todo.agenda_task_id().map(|a| a.value()),
            agenda_task_name: lookups
                .agenda_task(todo.agenda_task_id())
                .map(|a| a.name.clone()),
            closed_at: todo.closed_at(),
            closed_by: todo.closed_by().map(|u| u.to_string()),
            created_at: todo.created_at(),
            updated_at: todo.updated_at(),
            is_closed: todo.is_closed(),
            is_overdue: todo.is_overdue(),
        }
    }
}
