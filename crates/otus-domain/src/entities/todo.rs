//! Todo aggregate root
//!
//! Invariants:
//! - `name` is non-empty after trimming, at creation and on every rename
//! - close metadata (`closed_at`, `closed_by`) is present if and only if the
//!   status is closed
//!
//! Status transitions are deliberately permissive: `update_status` accepts
//! any status and only maintains the close bookkeeping. `complete` and
//! `reopen` are the guarded conveniences.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::patch::Patch;
use crate::value_objects::{AgendaTaskId, ProjectId, TaskPriority, TaskStatus, TodoId, UserId};

/// When and by whom a todo was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    pub at: DateTime<Utc>,
    pub by: UserId,
}

/// Input for [`Todo::create`]
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `backlog`
    pub status: Option<TaskStatus>,
    /// Defaults to `média`
    pub priority: Option<TaskPriority>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<UserId>,
    pub created_by: Option<UserId>,
    pub project_id: Option<ProjectId>,
    pub agenda_task_id: Option<AgendaTaskId>,
}

/// Partial update of the descriptive fields
#[derive(Debug, Clone, Default)]
pub struct TodoDetailsPatch {
    pub name: Option<String>,
    pub description: Patch<String>,
    pub start_date: Patch<NaiveDate>,
    pub due_date: Patch<NaiveDate>,
}

/// Todo aggregate root
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    id: Option<TodoId>,
    name: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    assignee: Option<UserId>,
    created_by: Option<UserId>,
    project_id: Option<ProjectId>,
    agenda_task_id: Option<AgendaTaskId>,
    closure: Option<Closure>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Todo {
    // ========================================================================
    // Factory Methods
    // ========================================================================

    /// Create a new, not yet persisted todo
    ///
    /// A todo created directly in a closed status is closed by its creator,
    /// so `created_by` is required in that case.
    pub fn create(props: NewTodo) -> DomainResult<Self> {
        let name = Self::validate_name(&props.name)?;
        Self::validate_dates(props.start_date, props.due_date)?;

        let status = props.status.unwrap_or_default();
        let now = Utc::now();
        let closure = if status.is_closed() {
            let by = props.created_by.clone().ok_or_else(|| {
                DomainError::validation(
                    "created_by",
                    "required when creating a todo in a closed status",
                )
            })?;
            Some(Closure { at: now, by })
        } else {
            None
        };

        Ok(Self {
            id: None,
            name,
            description: clean_text(props.description),
            status,
            priority: props.priority.unwrap_or_default(),
            start_date: props.start_date,
            due_date: props.due_date,
            assignee: props.assignee,
            created_by: props.created_by,
            project_id: props.project_id,
            agenda_task_id: props.agenda_task_id,
            closure,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild from a stored row
    ///
    /// Status, priority and name are re-validated; timestamps and close
    /// metadata are trusted as stored.
    pub fn from_persistence(record: TodoRecord) -> DomainResult<Self> {
        let id = record.id.map(TodoId::new).transpose()?;
        let status = TaskStatus::parse(&record.status)?;
        let priority = TaskPriority::parse(&record.priority)?;
        let name = Self::validate_name(&record.name)?;
        // Rows written before close tracking may lack the stamp; fall back to
        // the last update and the creator.
        let closure = if status.is_closed() {
            let by = record
                .closed_by
                .or_else(|| record.created_by.clone())
                .ok_or_else(|| {
                    DomainError::validation("closed_by", "closed todo has no closing user")
                })?;
            Some(Closure {
                at: record.closed_at.unwrap_or(record.updated_at),
                by: UserId::new(by)?,
            })
        } else {
            None
        };

        Ok(Self {
            id,
            name,
            description: record.description,
            status,
            priority,
            start_date: record.start_date,
            due_date: record.due_date,
            assignee: record.assignee.map(UserId::new).transpose()?,
            created_by: record.created_by.map(UserId::new).transpose()?,
            project_id: record.project_id.map(ProjectId::new).transpose()?,
            agenda_task_id: record.agenda_task_id.map(AgendaTaskId::new).transpose()?,
            closure,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Project into a storable row
    pub fn to_persistence(&self) -> TodoRecord {
        TodoRecord {
            id: self.id.map(|id| id.value()),
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status.as_str().to_string(),
            priority: self.priority.as_str().to_string(),
            start_date: self.start_date,
            due_date: self.due_date,
            assignee: self.assignee.as_ref().map(|u| u.as_str().to_string()),
            created_by: self.created_by.as_ref().map(|u| u.as_str().to_string()),
            project_id: self.project_id.map(|p| p.value()),
            agenda_task_id: self.agenda_task_id.map(|a| a.value()),
            closed_at: self.closure.as_ref().map(|c| c.at),
            closed_by: self.closure.as_ref().map(|c| c.by.as_str().to_string()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // ========================================================================
    // Behaviours
    // ========================================================================

    /// Move to `finalizado`; fails if already closed
    pub fn complete(&mut self, user: &UserId) -> DomainResult<()> {
        if self.is_closed() {
            return Err(DomainError::AlreadyClosed { id: self.id_label() });
        }
        self.update_status(TaskStatus::Done, user);
        Ok(())
    }

    /// Back to `a fazer`, whatever open state preceded the close
    pub fn reopen(&mut self) -> DomainResult<()> {
        if !self.is_closed() {
            return Err(DomainError::NotClosed { id: self.id_label() });
        }
        self.status = TaskStatus::ToDo;
        self.closure = None;
        self.touch();
        Ok(())
    }

    /// Set any status, keeping close metadata consistent
    ///
    /// open -> closed stamps `closed_at`/`closed_by`; closed -> open clears
    /// them; closed -> closed keeps the original stamp.
    pub fn update_status(&mut self, new_status: TaskStatus, user: &UserId) {
        let was_closed = self.status.is_closed();
        if new_status.is_closed() && !was_closed {
            self.closure = Some(Closure {
                at: Utc::now(),
                by: user.clone(),
            });
        } else if was_closed && new_status.is_open() {
            self.closure = None;
        }
        self.status = new_status;
        self.touch();
    }

    pub fn update_priority(&mut self, priority: TaskPriority) {
        self.priority = priority;
        self.touch();
    }

    /// Apply a details patch atomically: nothing changes if validation fails
    pub fn update_details(&mut self, patch: TodoDetailsPatch) -> DomainResult<()> {
        let name = match patch.name {
            Some(name) => Self::validate_name(&name)?,
            None => self.name.clone(),
        };
        let start_date = patch.start_date.resolve(self.start_date);
        let due_date = patch.due_date.resolve(self.due_date);
        Self::validate_dates(start_date, due_date)?;

        self.name = name;
        self.description = clean_text(patch.description.resolve(self.description.take()));
        self.start_date = start_date;
        self.due_date = due_date;
        self.touch();
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        self.name = Self::validate_name(name)?;
        self.touch();
        Ok(())
    }

    pub fn reassign(&mut self, assignee: Option<UserId>) {
        self.assignee = assignee;
        self.touch();
    }

    pub fn link_to_project(&mut self, project_id: Option<ProjectId>) {
        self.project_id = project_id;
        self.touch();
    }

    pub fn link_to_agenda_task(&mut self, agenda_task_id: Option<AgendaTaskId>) {
        self.agenda_task_id = agenda_task_id;
        self.touch();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn id(&self) -> Option<TodoId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn assignee(&self) -> Option<&UserId> {
        self.assignee.as_ref()
    }

    pub fn created_by(&self) -> Option<&UserId> {
        self.created_by.as_ref()
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn agenda_task_id(&self) -> Option<AgendaTaskId> {
        self.agenda_task_id
    }

    pub fn closure(&self) -> Option<&Closure> {
        self.closure.as_ref()
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closure.as_ref().map(|c| c.at)
    }

    pub fn closed_by(&self) -> Option<&UserId> {
        self.closure.as_ref().map(|c| &c.by)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// Due date strictly before `today` and still open
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.is_closed() && self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }

    /// Creator and assignee both count as owners
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.created_by.as_ref() == Some(user) || self.assignee.as_ref() == Some(user)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn id_label(&self) -> String {
        self.id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(unsaved)".to_string())
    }

    fn validate_name(name: &str) -> DomainResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("name", "Todo name cannot be empty"));
        }
        Ok(trimmed.to_string())
    }

    fn validate_dates(start: Option<NaiveDate>, due: Option<NaiveDate>) -> DomainResult<()> {
        if let (Some(start), Some(due)) = (start, due) {
            if start > due {
                return Err(DomainError::validation(
                    "due_date",
                    format!("due date {} is before start date {}", due, start),
                ));
            }
        }
        Ok(())
    }
}

/// Blank optional text is stored as absent
fn clean_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Storable row for a todo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub created_by: Option<String>,
    pub project_id: Option<i64>,
    pub agenda_task_id: Option<i64>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
