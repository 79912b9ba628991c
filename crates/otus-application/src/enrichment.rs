//! Batched lookups that decorate responses with display data
//!
//! Distinct foreign ids are collected from the whole result set first, then
//! one batch call per foreign table is issued, all of them concurrently.
//! A failed lookup leaves its map empty: responses lose names, never the
//! primary result.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;

use tracing::warn;

use otus_domain::{
    AgendaTaskId, AgendaTaskSummary, Catalog, CatalogKind, DomainResult, ProjectId,
    ProjectSummary, Relato, RelatoRepository, Todo, TodoRepository, UserId, UserSummary,
};

/// Display data for a set of todos
#[derive(Debug, Clone, Default)]
pub struct TodoLookups {
    pub users: HashMap<UserId, UserSummary>,
    pub projects: HashMap<ProjectId, ProjectSummary>,
    pub agenda_tasks: HashMap<AgendaTaskId, AgendaTaskSummary>,
}

impl TodoLookups {
    pub fn user_name(&self, id: Option<&UserId>) -> Option<String> {
        id.and_then(|id| self.users.get(id)).map(|u| u.name.clone())
    }

    pub fn project(&self, id: Option<ProjectId>) -> Option<&ProjectSummary> {
        id.and_then(|id| self.projects.get(&id))
    }

    pub fn agenda_task(&self, id: Option<AgendaTaskId>) -> Option<&AgendaTaskSummary> {
        id.and_then(|id| self.agenda_tasks.get(&id))
    }
}

/// Display data for a set of relatos
#[derive(Debug, Clone)]
pub struct RelatoLookups {
    pub users: HashMap<UserId, UserSummary>,
    pub tipos: Catalog,
    pub prioridades: Catalog,
}

impl Default for RelatoLookups {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            tipos: Catalog::empty(CatalogKind::Tipo),
            prioridades: Catalog::empty(CatalogKind::Prioridade),
        }
    }
}

impl RelatoLookups {
    pub fn user_name(&self, id: Option<&UserId>) -> Option<String> {
        id.and_then(|id| self.users.get(id)).map(|u| u.name.clone())
    }
}

/// Await an optional lookup; skipped when `wanted` is false, empty on error
async fn degrade<T, F>(lookup: &'static str, wanted: bool, fut: F) -> T
where
    T: Default,
    F: Future<Output = DomainResult<T>>,
{
    if !wanted {
        return T::default();
    }
    match fut.await {
        Ok(value) => value,
        Err(err) => {
            warn!(lookup, error = %err, "Enrichment lookup failed, continuing without it");
            T::default()
        }
    }
}

/// Fetch users, projects and agenda tasks referenced by `todos`
pub async fn load_todo_lookups(repo: &dyn TodoRepository, todos: &[Todo]) -> TodoLookups {
    let mut user_ids = BTreeSet::new();
    let mut project_ids = BTreeSet::new();
    let mut agenda_task_ids = BTreeSet::new();
    for todo in todos {
        user_ids.extend(todo.assignee().cloned());
        user_ids.extend(todo.created_by().cloned());
        user_ids.extend(todo.closed_by().cloned());
        project_ids.extend(todo.project_id());
        agenda_task_ids.extend(todo.agenda_task_id());
    }
    let user_ids: Vec<UserId> = user_ids.into_iter().collect();
    let project_ids: Vec<ProjectId> = project_ids.into_iter().collect();
    let agenda_task_ids: Vec<AgendaTaskId> = agenda_task_ids.into_iter().collect();

    let (users, projects, agenda_tasks) = tokio::join!(
        degrade("users", !user_ids.is_empty(), repo.get_users_by_ids(&user_ids)),
        degrade(
            "projects",
            !project_ids.is_empty(),
            repo.get_projects_by_ids(&project_ids)
        ),
        degrade(
            "agenda_tasks",
            !agenda_task_ids.is_empty(),
            repo.get_agenda_tasks_by_ids(&agenda_task_ids)
        )
    );

    TodoLookups {
        users,
        projects,
        agenda_tasks,
    }
}

/// Fetch users and both catalogs for `relatos`
pub async fn load_relato_lookups(repo: &dyn RelatoRepository, relatos: &[Relato]) -> RelatoLookups {
    let mut user_ids = BTreeSet::new();
    for relato in relatos {
        user_ids.insert(relato.author_id().clone());
        user_ids.extend(relato.resolved_by_id().cloned());
    }
    let user_ids: Vec<UserId> = user_ids.into_iter().collect();
    let wanted = !relatos.is_empty();

    let (users, tipos, prioridades) = tokio::join!(
        degrade("users", !user_ids.is_empty(), repo.get_users_by_ids(&user_ids)),
        degrade("tipos", wanted, repo.find_catalog(CatalogKind::Tipo)),
        degrade("prioridades", wanted, repo.find_catalog(CatalogKind::Prioridade))
    );

    RelatoLookups {
        users,
        tipos: Catalog::new(CatalogKind::Tipo, tipos),
        prioridades: Catalog::new(CatalogKind::Prioridade, prioridades),
    }
}
