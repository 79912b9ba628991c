//! In-Memory Todo Repository Implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use otus_domain::{
    errors::DomainResult,
    query::TodoQuery,
    repositories::{AgendaTaskSummary, ProjectSummary, TodoRepository, TodoStats, UserSummary},
    value_objects::{AgendaTaskId, ProjectId, TodoId, UserId},
    Todo, TodoRecord,
};

use super::store::{AgendaProjectLink, MemoryStore};
use crate::error::{PersistenceError, PersistenceResult};

/// Thread-safe in-memory implementation of TodoRepository
///
/// Counts every batch lookup so callers can assert that enrichment issues
/// one call per foreign table rather than one per row.
///
/// # Example
///
/// ```ignore
/// use otus_persistence::memory::{InMemoryTodoRepository, MemoryStore};
/// use otus_domain::repositories::TodoRepository;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let repo: Arc<dyn TodoRepository> = Arc::new(InMemoryTodoRepository::new(store));
/// ```
#[derive(Debug)]
pub struct InMemoryTodoRepository {
    store: Arc<MemoryStore>,
    user_lookups: AtomicUsize,
    project_lookups: AtomicUsize,
    agenda_task_lookups: AtomicUsize,
}

impl InMemoryTodoRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            user_lookups: AtomicUsize::new(0),
            project_lookups: AtomicUsize::new(0),
            agenda_task_lookups: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Get the current count of todos (for testing)
    pub fn count(&self) -> usize {
        self.store.read(|t| t.todos.len())
    }

    /// Clear all todos (for testing)
    pub fn clear(&self) {
        self.store.write(|t| t.todos.clear());
    }

    /// Number of `get_users_by_ids` calls served
    pub fn user_batch_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    /// Number of `get_projects_by_ids` calls served
    pub fn project_batch_lookups(&self) -> usize {
        self.project_lookups.load(Ordering::SeqCst)
    }

    /// Number of `get_agenda_tasks_by_ids` calls served
    pub fn agenda_task_batch_lookups(&self) -> usize {
        self.agenda_task_lookups.load(Ordering::SeqCst)
    }
}

fn restore(record: &TodoRecord) -> PersistenceResult<Todo> {
    Todo::from_persistence(record.clone()).map_err(|e| {
        PersistenceError::CorruptRecord(format!("todo {}: {}", record.id.unwrap_or_default(), e))
    })
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn find_all(&self, query: &TodoQuery) -> DomainResult<Vec<Todo>> {
        let todos = self.store.read(|t| {
            t.todos
                .values()
                .map(restore)
                .collect::<PersistenceResult<Vec<_>>>()
        })?;
        let selected = query.apply(todos);
        debug!(count = selected.len(), "Loaded todos");
        Ok(selected)
    }

    async fn find_by_id(&self, id: TodoId) -> DomainResult<Option<Todo>> {
        let todo = self
            .store
            .read(|t| t.todos.get(&id.value()).map(restore).transpose())?;
        Ok(todo)
    }

    async fn save(&self, todo: &Todo) -> DomainResult<Todo> {
        let record = self.store.write(|t| {
            let id = match todo.id() {
                Some(id) if t.todos.contains_key(&id.value()) => {
                    return Err(PersistenceError::Duplicate(format!("todo {}", id)));
                }
                Some(id) => id.value(),
                None => t.next_todo_id(),
            };
            let mut record = todo.to_persistence();
            record.id = Some(id);
            t.todos.insert(id, record.clone());
            Ok(record)
        })?;
        debug!(id = ?record.id, "Inserted todo");
        Ok(restore(&record)?)
    }

    async fn update(&self, todo: &Todo) -> DomainResult<Todo> {
        let id = todo
            .id()
            .ok_or_else(|| PersistenceError::not_found("Todo", "(unsaved)"))?;
        let record = self.store.write(|t| {
            let slot = t
                .todos
                .get_mut(&id.value())
                .ok_or_else(|| PersistenceError::not_found("Todo", id))?;
            *slot = todo.to_persistence();
            Ok::<_, PersistenceError>(slot.clone())
        })?;
        debug!(id = %id, "Updated todo");
        Ok(restore(&record)?)
    }

    async fn delete(&self, id: TodoId) -> DomainResult<()> {
        self.store
            .write(|t| t.todos.remove(&id.value()))
            .ok_or_else(|| PersistenceError::not_found("Todo", id))?;
        debug!(id = %id, "Deleted todo");
        Ok(())
    }

    async fn get_stats(&self, assignee: Option<&UserId>) -> DomainResult<TodoStats> {
        let todos = self.store.read(|t| {
            t.todos
                .values()
                .filter(|r| assignee.map_or(true, |u| r.assignee.as_deref() == Some(u.as_str())))
                .map(restore)
                .collect::<PersistenceResult<Vec<_>>>()
        })?;
        Ok(TodoStats::from_todos(todos.iter()))
    }

    async fn get_users_by_ids(&self, ids: &[UserId]) -> DomainResult<HashMap<UserId, UserSummary>> {
        self.store.check_lookups("users")?;
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        debug!(ids = ids.len(), "Batch user lookup");
        Ok(self.store.read(|t| {
            ids.iter()
                .filter_map(|id| t.users.get(id.as_str()).map(|u| (id.clone(), u.clone())))
                .collect()
        }))
    }

    async fn get_projects_by_ids(
        &self,
        ids: &[ProjectId],
    ) -> DomainResult<HashMap<ProjectId, ProjectSummary>> {
        self.store.check_lookups("projects")?;
        self.project_lookups.fetch_add(1, Ordering::SeqCst);
        debug!(ids = ids.len(), "Batch project lookup");
        Ok(self.store.read(|t| {
            ids.iter()
                .filter_map(|id| t.projects.get(&id.value()).map(|p| (*id, p.clone())))
                .collect()
        }))
    }

    async fn get_agenda_tasks_by_ids(
        &self,
        ids: &[AgendaTaskId],
    ) -> DomainResult<HashMap<AgendaTaskId, AgendaTaskSummary>> {
        self.store.check_lookups("agenda_tasks")?;
        self.agenda_task_lookups.fetch_add(1, Ordering::SeqCst);
        debug!(ids = ids.len(), "Batch agenda task lookup");
        Ok(self.store.read(|t| {
            ids.iter()
                .filter_map(|id| t.agenda_tasks.get(&id.value()).map(|a| (*id, a.clone())))
                .collect()
        }))
    }

    async fn get_agenda_task_by_id(&self, id: AgendaTaskId) -> DomainResult<Option<AgendaTaskSummary>> {
        self.store.check_lookups("agenda_tasks")?;
        Ok(self.store.read(|t| t.agenda_tasks.get(&id.value()).cloned()))
    }

    async fn ensure_agenda_project_link(
        &self,
        agenda_task_id: AgendaTaskId,
        project_id: ProjectId,
    ) -> DomainResult<()> {
        self.store.check_agenda_links()?;
        let inserted = self.store.write(|t| {
            t.agenda_project_links.insert(AgendaProjectLink {
                agenda_task_id: agenda_task_id.value(),
                project_id: project_id.value(),
            })
        });
        debug!(%agenda_task_id, %project_id, inserted, "Agenda/project link upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otus_domain::{DomainError, NewTodo, TaskPriority, TaskStatus, TodoFilters};

    fn repo() -> InMemoryTodoRepository {
        InMemoryTodoRepository::new(Arc::new(MemoryStore::new()))
    }

    fn new_todo(name: &str, assignee: Option<&str>) -> Todo {
        Todo::create(NewTodo {
            name: name.to_string(),
            assignee: assignee.map(|a| UserId::new(a).unwrap()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let repo = repo();
        let a = repo.save(&new_todo("a", None)).await.unwrap();
        let b = repo.save(&new_todo("b", None)).await.unwrap();
        assert_eq!(a.id().map(|id| id.value()), Some(1));
        assert_eq!(b.id().map(|id| id.value()), Some(2));
        assert_eq!(repo.count(), 2);
    }

    #[tokio::test]
    async fn test_save_rejects_existing_id() {
        let repo = repo();
        let saved = repo.save(&new_todo("a", None)).await.unwrap();
        let err = repo.save(&saved).await.unwrap_err();
        assert!(matches!(err, DomainError::Repository { .. }));
    }

    #[tokio::test]
    async fn test_update_persists_changes() {
        let repo = repo();
        let mut todo = repo.save(&new_todo("a", None)).await.unwrap();
        todo.complete(&UserId::new("u1").unwrap()).unwrap();
        repo.update(&todo).await.unwrap();

        let found = repo.find_by_id(todo.id().unwrap()).await.unwrap().unwrap();
        assert_eq!(found.status(), TaskStatus::Done);
        assert_eq!(found.closed_by().map(|u| u.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let repo = repo();
        let mut record = new_todo("a", None).to_persistence();
        record.id = Some(99);
        let ghost = Todo::from_persistence(record).unwrap();
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, DomainError::EntityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo();
        let todo = repo.save(&new_todo("a", None)).await.unwrap();
        let id = todo.id().unwrap();
        repo.delete(id).await.unwrap();
        assert!(repo.find_by_id(id).await.unwrap().is_none());
        assert!(repo.delete(id).await.is_err());
    }

    #[tokio::test]
    async fn test_find_all_applies_query() {
        let repo = repo();
        repo.save(&new_todo("Alpha", Some("u1"))).await.unwrap();
        repo.save(&new_todo("Beta", Some("u2"))).await.unwrap();
        let query = TodoQuery {
            filters: TodoFilters {
                assignee: Some(UserId::new("u2").unwrap()),
                ..Default::default()
            },
            ..Default::default()
        };
        let found = repo.find_all(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "Beta");
    }

    #[tokio::test]
    async fn test_stats_by_assignee() {
        let repo = repo();
        repo.save(&new_todo("a", Some("u1"))).await.unwrap();
        repo.save(&new_todo("b", Some("u1"))).await.unwrap();
        repo.save(&new_todo("c", Some("u2"))).await.unwrap();

        let all = repo.get_stats(None).await.unwrap();
        assert_eq!(all.total, 3);
        let mine = repo.get_stats(Some(&UserId::new("u1").unwrap())).await.unwrap();
        assert_eq!(mine.total, 2);
        assert_eq!(mine.by_priority[TaskPriority::Medium.as_str()], 2);
    }

    #[tokio::test]
    async fn test_batch_user_lookup_counts_calls() {
        let repo = repo();
        let u1 = UserId::new("u1").unwrap();
        repo.store().seed_user(&u1, "Ana", Some("ana@otus.dev"));
        let users = repo
            .get_users_by_ids(&[u1.clone(), UserId::new("ghost").unwrap()])
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[&u1].name, "Ana");
        assert_eq!(repo.user_batch_lookups(), 1);
    }

    #[tokio::test]
    async fn test_lookups_fail_when_switched() {
        let repo = repo();
        repo.store().set_lookups_failing(true);
        assert!(repo.get_projects_by_ids(&[ProjectId::new(1).unwrap()]).await.is_err());
        assert_eq!(repo.project_batch_lookups(), 0);
    }

    #[tokio::test]
    async fn test_single_agenda_task_lookup() {
        let repo = repo();
        let task = AgendaTaskId::new(5).unwrap();
        repo.store().seed_agenda_task(AgendaTaskSummary {
            id: task,
            name: "Concretagem".into(),
            project_id: Some(ProjectId::new(7).unwrap()),
        });

        let found = repo.get_agenda_task_by_id(task).await.unwrap().unwrap();
        assert_eq!(found.name, "Concretagem");
        assert_eq!(found.project_id, Some(ProjectId::new(7).unwrap()));
        assert!(repo
            .get_agenda_task_by_id(AgendaTaskId::new(6).unwrap())
            .await
            .unwrap()
            .is_none());
        // Single lookups are not batch calls.
        assert_eq!(repo.agenda_task_batch_lookups(), 0);

        repo.store().set_lookups_failing(true);
        assert!(repo.get_agenda_task_by_id(task).await.is_err());
    }

    #[tokio::test]
    async fn test_agenda_link_upsert() {
        let repo = repo();
        let task = AgendaTaskId::new(5).unwrap();
        let project = ProjectId::new(7).unwrap();
        repo.ensure_agenda_project_link(task, project).await.unwrap();
        repo.ensure_agenda_project_link(task, project).await.unwrap();
        assert!(repo.store().has_agenda_project_link(5, 7));
        assert_eq!(repo.store().snapshot().agenda_project_links.len(), 1);
    }
}
