//! Repository interfaces for data persistence
//!
//! The domain layer defines only the contracts. The row-store adapter lives
//! in `otus-persistence`.
//!
//! Auxiliary lookups (`get_users_by_ids`, `get_projects_by_ids`, ...) are
//! batch calls by contract: callers collect distinct ids first and issue one
//! call per foreign entity type.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{CatalogEntry, CatalogKind, Relato, Todo};
use crate::errors::DomainResult;
use crate::query::{RelatoFilters, TodoQuery};
use crate::value_objects::{
    AgendaTaskId, CatalogEntryId, ProjectId, RelatoId, TaskPriority, TaskStatus, TodoId, UserId,
};

// ============================================================================
// Lookup records
// ============================================================================

/// Display data for a user reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
}

/// Display data for a project reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub code: Option<String>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

/// Display data for an agenda task reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaTaskSummary {
    pub id: AgendaTaskId,
    pub name: String,
    pub project_id: Option<ProjectId>,
}

// ============================================================================
// Stats
// ============================================================================

/// Todo counts; every known status and priority is present, zero or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
}

impl TodoStats {
    pub fn from_todos<'a>(todos: impl IntoIterator<Item = &'a Todo>) -> Self {
        let mut stats = Self {
            total: 0,
            by_status: TaskStatus::ALL
                .iter()
                .map(|s| (s.as_str().to_string(), 0))
                .collect(),
            by_priority: TaskPriority::ALL
                .iter()
                .map(|p| (p.as_str().to_string(), 0))
                .collect(),
        };
        for todo in todos {
            stats.total += 1;
            *stats
                .by_status
                .entry(todo.status().as_str().to_string())
                .or_default() += 1;
            *stats
                .by_priority
                .entry(todo.priority().as_str().to_string())
                .or_default() += 1;
        }
        stats
    }
}

/// Relato counts for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatoStats {
    pub total: u64,
    pub by_tipo: BTreeMap<String, u64>,
    pub by_prioridade: BTreeMap<String, u64>,
    pub resolved: u64,
}

impl RelatoStats {
    pub fn from_relatos<'a>(relatos: impl IntoIterator<Item = &'a Relato>) -> Self {
        let mut stats = Self {
            total: 0,
            by_tipo: BTreeMap::new(),
            by_prioridade: BTreeMap::new(),
            resolved: 0,
        };
        for relato in relatos {
            stats.total += 1;
            *stats
                .by_tipo
                .entry(relato.tipo().slug().to_string())
                .or_default() += 1;
            *stats
                .by_prioridade
                .entry(relato.prioridade().slug().to_string())
                .or_default() += 1;
            if relato.is_resolved() {
                stats.resolved += 1;
            }
        }
        stats
    }
}

// ============================================================================
// Repositories
// ============================================================================

/// Repository for todos and the lookups their responses need
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Todos matching the query, in query order
    async fn find_all(&self, query: &TodoQuery) -> DomainResult<Vec<Todo>>;

    async fn find_by_id(&self, id: TodoId) -> DomainResult<Option<Todo>>;

    /// Insert a new todo; the returned copy carries the store-assigned id
    async fn save(&self, todo: &Todo) -> DomainResult<Todo>;

    /// Overwrite an existing todo (last write wins)
    async fn update(&self, todo: &Todo) -> DomainResult<Todo>;

    async fn delete(&self, id: TodoId) -> DomainResult<()>;

    /// Counts over all todos, or those assigned to `assignee`
    async fn get_stats(&self, assignee: Option<&UserId>) -> DomainResult<TodoStats>;

    async fn get_users_by_ids(&self, ids: &[UserId]) -> DomainResult<HashMap<UserId, UserSummary>>;

    async fn get_projects_by_ids(
        &self,
        ids: &[ProjectId],
    ) -> DomainResult<HashMap<ProjectId, ProjectSummary>>;

    async fn get_agenda_tasks_by_ids(
        &self,
        ids: &[AgendaTaskId],
    ) -> DomainResult<HashMap<AgendaTaskId, AgendaTaskSummary>>;

    /// Single agenda task, for callers resolving one link target
    async fn get_agenda_task_by_id(&self, id: AgendaTaskId) -> DomainResult<Option<AgendaTaskSummary>>;

    /// Upsert the agenda-task/project link row
    async fn ensure_agenda_project_link(
        &self,
        agenda_task_id: AgendaTaskId,
        project_id: ProjectId,
    ) -> DomainResult<()>;
}

/// Repository for relatos, their catalogs and author lookups
#[async_trait]
pub trait RelatoRepository: Send + Sync {
    /// Relatos of one project, newest first
    async fn find_by_project_code(
        &self,
        project_code: &str,
        filters: &RelatoFilters,
    ) -> DomainResult<Vec<Relato>>;

    async fn find_by_id(&self, id: RelatoId) -> DomainResult<Option<Relato>>;

    async fn save(&self, relato: &Relato) -> DomainResult<Relato>;

    async fn update(&self, relato: &Relato) -> DomainResult<Relato>;

    async fn delete(&self, id: RelatoId) -> DomainResult<()>;

    async fn get_stats_by_project(&self, project_code: &str) -> DomainResult<RelatoStats>;

    /// Every entry of one catalog, active or not
    async fn find_catalog(&self, kind: CatalogKind) -> DomainResult<Vec<CatalogEntry>>;

    async fn find_catalog_entry(
        &self,
        kind: CatalogKind,
        id: CatalogEntryId,
    ) -> DomainResult<Option<CatalogEntry>>;

    async fn save_catalog_entry(&self, entry: &CatalogEntry) -> DomainResult<CatalogEntry>;

    async fn update_catalog_entry(&self, entry: &CatalogEntry) -> DomainResult<CatalogEntry>;

    async fn delete_catalog_entry(&self, kind: CatalogKind, id: CatalogEntryId) -> DomainResult<()>;

    /// Number of relatos whose tipo/prioridade is `slug`
    async fn count_relatos_using(&self, kind: CatalogKind, slug: &str) -> DomainResult<u64>;

    async fn get_user_by_id(&self, id: &UserId) -> DomainResult<Option<UserSummary>>;

    async fn get_users_by_ids(&self, ids: &[UserId]) -> DomainResult<HashMap<UserId, UserSummary>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewTodo;

    #[test]
    fn test_todo_stats_include_zero_buckets() {
        let todo = Todo::create(NewTodo {
            name: "x".into(),
            priority: Some(TaskPriority::High),
            ..Default::default()
        })
        .unwrap();
        let stats = TodoStats::from_todos([&todo]);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_status.len(), 6);
        assert_eq!(stats.by_status["backlog"], 1);
        assert_eq!(stats.by_status["finalizado"], 0);
        assert_eq!(stats.by_priority["alta"], 1);
    }
}
