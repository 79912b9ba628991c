//! Filtering and ordering rules for list queries
//!
//! Repository adapters push these down to their store when they can; the
//! in-memory adapter calls `matches`/`compare` directly, so both paths share
//! one definition.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::{Relato, Todo};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{normalize, AgendaTaskId, ProjectId, TaskPriority, TaskStatus, UserId};

/// Todo list filters; every set field must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<UserId>,
    pub created_by: Option<UserId>,
    pub project_id: Option<ProjectId>,
    pub agenda_task_id: Option<AgendaTaskId>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub hide_closed: bool,
}

impl TodoFilters {
    pub fn matches(&self, todo: &Todo) -> bool {
        if self.status.is_some_and(|s| s != todo.status()) {
            return false;
        }
        if self.priority.is_some_and(|p| p != todo.priority()) {
            return false;
        }
        if self.assignee.is_some() && self.assignee.as_ref() != todo.assignee() {
            return false;
        }
        if self.created_by.is_some() && self.created_by.as_ref() != todo.created_by() {
            return false;
        }
        if self.project_id.is_some() && self.project_id != todo.project_id() {
            return false;
        }
        if self.agenda_task_id.is_some() && self.agenda_task_id != todo.agenda_task_id() {
            return false;
        }
        if self.hide_closed && todo.is_closed() {
            return false;
        }
        if let Some(needle) = self.search.as_deref().map(normalize).filter(|s| !s.is_empty()) {
            let in_name = todo.name().to_lowercase().contains(&needle);
            let in_description = todo
                .description()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }
        true
    }
}

/// Sortable todo columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    StartDate,
    Priority,
    Name,
    Status,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::DueDate,
        SortField::StartDate,
        SortField::Priority,
        SortField::Name,
        SortField::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::DueDate => "due_date",
            SortField::StartDate => "start_date",
            SortField::Priority => "priority",
            SortField::Name => "name",
            SortField::Status => "status",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidEnumValue {
                field: "sort".to_string(),
                provided_value: s.to_string(),
                allowed_values: Self::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(DomainError::InvalidEnumValue {
                field: "direction".to_string(),
                provided_value: s.to_string(),
                allowed_values: vec!["asc".to_string(), "desc".to_string()],
            }),
        }
    }
}

/// Ordering for todo lists
///
/// Missing dates sort last in both directions. Ties fall back to id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for TodoSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TodoSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parse the raw query pair; missing parts fall back to `fallback`
    pub fn parse(
        field: Option<&str>,
        direction: Option<&str>,
        fallback: TodoSort,
    ) -> DomainResult<Self> {
        let field = field.map(str::parse::<SortField>).transpose()?;
        let direction = direction.map(str::parse::<SortDirection>).transpose()?;
        Ok(Self {
            field: field.unwrap_or(fallback.field),
            direction: direction.unwrap_or(fallback.direction),
        })
    }

    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        let primary = match self.field {
            SortField::CreatedAt => self.direction.apply(a.created_at().cmp(&b.created_at())),
            SortField::UpdatedAt => self.direction.apply(a.updated_at().cmp(&b.updated_at())),
            SortField::DueDate => self.nulls_last(a.due_date(), b.due_date()),
            SortField::StartDate => self.nulls_last(a.start_date(), b.start_date()),
            SortField::Priority => self
                .direction
                .apply(a.priority().order().cmp(&b.priority().order())),
            SortField::Name => self
                .direction
                .apply(a.name().to_lowercase().cmp(&b.name().to_lowercase())),
            SortField::Status => self
                .direction
                .apply(status_rank(a.status()).cmp(&status_rank(b.status()))),
        };
        primary.then_with(|| self.direction.apply(a.id().cmp(&b.id())))
    }

    fn nulls_last<T: Ord>(&self, a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.direction.apply(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Workflow position, used for status ordering
fn status_rank(status: TaskStatus) -> usize {
    TaskStatus::ALL
        .iter()
        .position(|s| *s == status)
        .unwrap_or(usize::MAX)
}

/// Full todo list query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoQuery {
    pub filters: TodoFilters,
    pub sort: TodoSort,
}

impl TodoQuery {
    /// Filter then sort a loaded set
    pub fn apply(&self, todos: impl IntoIterator<Item = Todo>) -> Vec<Todo> {
        let mut selected: Vec<Todo> = todos
            .into_iter()
            .filter(|t| self.filters.matches(t))
            .collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));
        selected
    }
}

/// Relato list filters within one project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatoFilters {
    /// Tipo slug
    pub tipo: Option<String>,
    /// Prioridade slug
    pub prioridade: Option<String>,
    pub resolved: Option<bool>,
}

impl RelatoFilters {
    pub fn matches(&self, relato: &Relato) -> bool {
        if let Some(tipo) = &self.tipo {
            if relato.tipo().slug() != normalize(tipo) {
                return false;
            }
        }
        if let Some(prioridade) = &self.prioridade {
            if relato.prioridade().slug() != normalize(prioridade) {
                return false;
            }
        }
        if let Some(resolved) = self.resolved {
            if relato.is_resolved() != resolved {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::entities::NewTodo;

    fn todo(name: &str, priority: TaskPriority, due: Option<NaiveDate>) -> Todo {
        Todo::create(NewTodo {
            name: name.into(),
            priority: Some(priority),
            due_date: due,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_priority_sort_puts_alta_first() {
        let query = TodoQuery {
            filters: TodoFilters::default(),
            sort: TodoSort::new(SortField::Priority, SortDirection::Asc),
        };
        let sorted = query.apply(vec![
            todo("low", TaskPriority::Low, None),
            todo("high", TaskPriority::High, None),
            todo("medium", TaskPriority::Medium, None),
        ]);
        let names: Vec<&str> = sorted.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["high", "medium", "low"]);
    }

    #[test]
    fn test_due_date_sort_puts_missing_last_both_ways() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1);
        let d2 = NaiveDate::from_ymd_opt(2024, 2, 1);
        let items = vec![
            todo("none", TaskPriority::Low, None),
            todo("jan", TaskPriority::Low, d1),
            todo("feb", TaskPriority::Low, d2),
        ];
        for (direction, expected) in [
            (SortDirection::Asc, vec!["jan", "feb", "none"]),
            (SortDirection::Desc, vec!["feb", "jan", "none"]),
        ] {
            let query = TodoQuery {
                filters: TodoFilters::default(),
                sort: TodoSort::new(SortField::DueDate, direction),
            };
            let sorted = query.apply(items.clone());
            let names: Vec<&str> = sorted.iter().map(|t| t.name()).collect();
            assert_eq!(names, expected);
        }
    }

    #[test]
    fn test_search_and_hide_closed() {
        let mut done = todo("Revisar projeto", TaskPriority::Low, None);
        done.complete(&UserId::new("u1").unwrap()).unwrap();
        let open = todo("Revisar orçamento", TaskPriority::Low, None);
        let filters = TodoFilters {
            search: Some("REVISAR".into()),
            hide_closed: true,
            ..Default::default()
        };
        assert!(filters.matches(&open));
        assert!(!filters.matches(&done));
    }

    #[test]
    fn test_sort_parse_falls_back() {
        let sort = TodoSort::parse(Some("due_date"), None, TodoSort::default()).unwrap();
        assert_eq!(sort.field, SortField::DueDate);
        assert_eq!(sort.direction, SortDirection::Desc);
        assert!(TodoSort::parse(Some("color"), None, TodoSort::default()).is_err());
    }
}
