//! Shared in-memory table set
//!
//! Both repositories read and write the same `MemoryTables` so a relato
//! author lookup and a todo assignee lookup see the same user rows, the way
//! two adapters over one database would.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use otus_domain::{
    AgendaTaskSummary, CatalogEntry, CatalogEntryId, CatalogKind, ProjectSummary, RelatoRecord,
    TodoRecord, UserId, UserSummary,
};

use crate::error::{PersistenceError, PersistenceResult};

/// Row of the agenda-task/project link table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgendaProjectLink {
    pub agenda_task_id: i64,
    pub project_id: i64,
}

/// Last id handed out per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    pub todo: i64,
    pub relato: i64,
    pub catalog_entry: i64,
}

/// Every table the adapters use; this is also the snapshot file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTables {
    pub todos: BTreeMap<i64, TodoRecord>,
    pub relatos: BTreeMap<i64, RelatoRecord>,
    pub users: BTreeMap<String, UserSummary>,
    pub projects: BTreeMap<i64, ProjectSummary>,
    pub agenda_tasks: BTreeMap<i64, AgendaTaskSummary>,
    pub agenda_project_links: BTreeSet<AgendaProjectLink>,
    pub catalog: Vec<CatalogEntry>,
    pub sequences: Sequences,
}

impl MemoryTables {
    pub(crate) fn next_todo_id(&mut self) -> i64 {
        self.sequences.todo =
            self.sequences.todo.max(self.todos.keys().max().copied().unwrap_or(0)) + 1;
        self.sequences.todo
    }

    pub(crate) fn next_relato_id(&mut self) -> i64 {
        self.sequences.relato =
            self.sequences.relato.max(self.relatos.keys().max().copied().unwrap_or(0)) + 1;
        self.sequences.relato
    }

    pub(crate) fn next_catalog_entry_id(&mut self) -> i64 {
        let highest = self
            .catalog
            .iter()
            .filter_map(|e| e.id.map(|id| id.value()))
            .max()
            .unwrap_or(0);
        self.sequences.catalog_entry = self.sequences.catalog_entry.max(highest) + 1;
        self.sequences.catalog_entry
    }
}

/// Thread-safe table set shared by the in-memory repositories
///
/// The fault switches make auxiliary lookups or the agenda link write fail
/// on demand, so callers can exercise their degradation paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
    fail_lookups: AtomicBool,
    fail_agenda_links: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create over previously saved tables
    pub fn with_tables(tables: MemoryTables) -> Self {
        Self {
            tables: RwLock::new(tables),
            ..Self::default()
        }
    }

    /// Copy of every table, for snapshotting
    pub fn snapshot(&self) -> MemoryTables {
        self.tables.read().clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&MemoryTables) -> R) -> R {
        f(&self.tables.read())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut MemoryTables) -> R) -> R {
        f(&mut self.tables.write())
    }

    // ========================================================================
    // Reference data
    // ========================================================================

    pub fn seed_user(&self, id: &UserId, name: &str, email: Option<&str>) {
        self.tables.write().users.insert(
            id.as_str().to_string(),
            UserSummary {
                id: id.clone(),
                name: name.to_string(),
                email: email.map(str::to_string),
            },
        );
    }

    pub fn seed_project(&self, project: ProjectSummary) {
        self.tables
            .write()
            .projects
            .insert(project.id.value(), project);
    }

    pub fn seed_agenda_task(&self, task: AgendaTaskSummary) {
        self.tables
            .write()
            .agenda_tasks
            .insert(task.id.value(), task);
    }

    /// Insert the default tipo and prioridade catalogs; no-op unless the
    /// catalog table is empty. Returns whether rows were inserted.
    pub fn seed_default_catalog(&self) -> bool {
        let mut tables = self.tables.write();
        if !tables.catalog.is_empty() {
            return false;
        }
        let defaults = CatalogEntry::default_tipos()
            .into_iter()
            .chain(CatalogEntry::default_prioridades());
        for mut entry in defaults {
            let id = tables.next_catalog_entry_id();
            entry.id = CatalogEntryId::new(id).ok();
            tables.catalog.push(entry);
        }
        debug!(rows = tables.catalog.len(), "Seeded default catalog");
        true
    }

    pub fn catalog_len(&self, kind: CatalogKind) -> usize {
        self.tables
            .read()
            .catalog
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    pub fn has_agenda_project_link(&self, agenda_task_id: i64, project_id: i64) -> bool {
        self.tables
            .read()
            .agenda_project_links
            .contains(&AgendaProjectLink {
                agenda_task_id,
                project_id,
            })
    }

    // ========================================================================
    // Fault switches
    // ========================================================================

    /// Make user/project/agenda-task lookups fail until switched back
    pub fn set_lookups_failing(&self, failing: bool) {
        self.fail_lookups.store(failing, Ordering::SeqCst);
    }

    /// Make `ensure_agenda_project_link` fail until switched back
    pub fn set_agenda_links_failing(&self, failing: bool) {
        self.fail_agenda_links.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn check_lookups(&self, table: &str) -> PersistenceResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(table.to_string()));
        }
        Ok(())
    }

    pub(crate) fn check_agenda_links(&self) -> PersistenceResult<()> {
        if self.fail_agenda_links.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "agenda_project_links".to_string(),
            ));
        }
        Ok(())
    }
}
