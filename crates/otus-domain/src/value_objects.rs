//! Value objects representing immutable domain concepts
//!
//! Two flavours of enumerated values live here:
//!
//! - closed-set values (`TaskStatus`, `TaskPriority`) whose members are fixed
//!   in code and validated at construction;
//! - open-catalog values (`RelatoTipo`, `RelatoPrioridade`) that only reject
//!   blank input. Membership in the admin-managed catalog is checked by the
//!   application layer, which has repository access.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// Lowercase + trim, the normalisation every enumerated value goes through
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

macro_rules! store_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a store-assigned identifier; must be positive
            pub fn new(value: i64) -> DomainResult<Self> {
                if value <= 0 {
                    return Err(DomainError::validation(
                        concat!($entity, "_id"),
                        format!("must be a positive integer, got {}", value),
                    ));
                }
                Ok(Self(value))
            }

            /// Raw integer value
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

store_id!(
    /// Identifier assigned by the store to a persisted todo
    TodoId,
    "todo"
);
store_id!(
    /// Identifier assigned by the store to a persisted relato
    RelatoId,
    "relato"
);
store_id!(
    /// Project reference
    ProjectId,
    "project"
);
store_id!(
    /// Agenda task reference
    AgendaTaskId,
    "agenda_task"
);
store_id!(
    /// Catalog row identifier
    CatalogEntryId,
    "catalog_entry"
);

/// Opaque user reference (the auth provider's user id)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a user id; blank input is rejected
    pub fn new(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("user_id", "cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user performing an operation, with their privilege level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    #[serde(default)]
    pub privileged: bool,
}

impl Actor {
    /// Regular member; may only modify what they own
    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            privileged: false,
        }
    }

    /// Privileged user (admin/leader); bypasses ownership checks
    pub fn privileged(user_id: UserId) -> Self {
        Self {
            user_id,
            privileged: true,
        }
    }

    /// Allowed when privileged or when `owner` is this actor
    pub fn can_modify(&self, owner: Option<&UserId>) -> bool {
        self.privileged || owner == Some(&self.user_id)
    }
}

// ============================================================================
// Closed-set values
// ============================================================================

/// Todo lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaskStatus {
    /// `backlog`
    Backlog,
    /// `a fazer`
    ToDo,
    /// `em progresso`
    InProgress,
    /// `finalizado`
    Done,
    /// `validação`
    Validation,
    /// `cancelado`
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Backlog,
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Validation,
        TaskStatus::Cancelled,
    ];

    /// Parse a raw value after lowercasing and trimming
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = normalize(raw);
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidEnumValue {
                field: "status".to_string(),
                provided_value: raw.to_string(),
                allowed_values: Self::allowed_values(),
            })
    }

    pub fn allowed_values() -> Vec<String> {
        Self::ALL.iter().map(|s| s.as_str().to_string()).collect()
    }

    /// Stored value
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::ToDo => "a fazer",
            TaskStatus::InProgress => "em progresso",
            TaskStatus::Done => "finalizado",
            TaskStatus::Validation => "validação",
            TaskStatus::Cancelled => "cancelado",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "Backlog",
            TaskStatus::ToDo => "A Fazer",
            TaskStatus::InProgress => "Em Progresso",
            TaskStatus::Done => "Finalizado",
            TaskStatus::Validation => "Validação",
            TaskStatus::Cancelled => "Cancelado",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Cancelled)
    }

    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    /// Work that someone can pick up right now
    pub fn is_actionable(&self) -> bool {
        matches!(self, TaskStatus::ToDo | TaskStatus::InProgress)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Backlog
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Todo priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaskPriority {
    /// `baixa`
    Low,
    /// `média`
    Medium,
    /// `alta`
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    /// Parse a raw value after lowercasing and trimming
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = normalize(raw);
        Self::ALL
            .iter()
            .copied()
            .find(|priority| priority.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidEnumValue {
                field: "priority".to_string(),
                provided_value: raw.to_string(),
                allowed_values: Self::allowed_values(),
            })
    }

    pub fn allowed_values() -> Vec<String> {
        Self::ALL.iter().map(|p| p.as_str().to_string()).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "baixa",
            TaskPriority::Medium => "média",
            TaskPriority::High => "alta",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Baixa",
            TaskPriority::Medium => "Média",
            TaskPriority::High => "Alta",
        }
    }

    /// Presentation hint
    pub fn color(&self) -> &'static str {
        match self {
            TaskPriority::Low => "#27ae60",
            TaskPriority::Medium => "#f39c12",
            TaskPriority::High => "#e74c3c",
        }
    }

    /// Ascending urgency: `alta` sorts first
    pub fn order(&self) -> u8 {
        match self {
            TaskPriority::High => 1,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 3,
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, TaskPriority::High)
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl FromStr for TaskPriority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaskPriority {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskPriority> for String {
    fn from(priority: TaskPriority) -> Self {
        priority.as_str().to_string()
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Open-catalog values
// ============================================================================

/// Turn a slug into a display label: `licao-aprendida` -> `Licao aprendida`
fn humanize_slug(slug: &str) -> String {
    let spaced = slug.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

macro_rules! catalog_value {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        ///
        /// Equality and hashing consider only the slug.
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $name {
            slug: String,
            label: Option<String>,
            color: Option<String>,
        }

        impl $name {
            /// Build from a raw slug; only blank input is rejected
            pub fn new(raw: &str) -> DomainResult<Self> {
                let slug = normalize(raw);
                if slug.is_empty() {
                    return Err(DomainError::validation($field, "cannot be empty"));
                }
                Ok(Self {
                    slug,
                    label: None,
                    color: None,
                })
            }

            /// Attach fallback display metadata
            pub fn with_display(mut self, label: Option<String>, color: Option<String>) -> Self {
                self.label = label;
                self.color = color;
                self
            }

            pub fn slug(&self) -> &str {
                &self.slug
            }

            /// Fallback label: explicit label, otherwise the humanised slug
            pub fn label(&self) -> String {
                self.label
                    .clone()
                    .unwrap_or_else(|| humanize_slug(&self.slug))
            }

            pub fn color(&self) -> Option<&str> {
                self.color.as_deref()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.slug == other.slug
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.slug.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.slug)
            }
        }
    };
}

catalog_value!(
    /// Kind of a relato (`risco`, `decisao`, ...), validated against the tipo catalog
    RelatoTipo,
    "tipo"
);
catalog_value!(
    /// Urgency of a relato, validated against the prioridade catalog
    RelatoPrioridade,
    "prioridade"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_normalizes_input() {
        assert_eq!(TaskStatus::parse("  Finalizado  ").unwrap(), TaskStatus::Done);
        assert_eq!(TaskStatus::parse("EM PROGRESSO").unwrap(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse("Validação").unwrap(), TaskStatus::Validation);
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        let err = TaskStatus::parse("invalid-value").unwrap_err();
        match err {
            DomainError::InvalidEnumValue {
                provided_value,
                allowed_values,
                ..
            } => {
                assert_eq!(provided_value, "invalid-value");
                assert_eq!(allowed_values.len(), 6);
                assert!(allowed_values.contains(&"a fazer".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_derived_flags() {
        assert!(TaskStatus::Done.is_closed());
        assert!(TaskStatus::Cancelled.is_closed());
        assert!(TaskStatus::Validation.is_open());
        assert!(TaskStatus::ToDo.is_actionable());
        assert!(!TaskStatus::Backlog.is_actionable());
    }

    #[test]
    fn test_priority_order_and_labels() {
        assert_eq!(TaskPriority::parse("MÉDIA").unwrap(), TaskPriority::Medium);
        assert!(TaskPriority::High.order() < TaskPriority::Medium.order());
        assert!(TaskPriority::Medium.order() < TaskPriority::Low.order());
        assert!(TaskPriority::High.is_high());
        assert_eq!(TaskPriority::Low.label(), "Baixa");
    }

    #[test]
    fn test_status_serde_uses_stored_value() {
        let json = serde_json::to_string(&TaskStatus::ToDo).unwrap();
        assert_eq!(json, "\"a fazer\"");
        let parsed: TaskStatus = serde_json::from_str("\"Cancelado\"").unwrap();
        assert_eq!(parsed, TaskStatus::Cancelled);
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_catalog_value_equality_is_slug_based() {
        let a = RelatoTipo::new(" Risco ").unwrap();
        let b = RelatoTipo::new("risco")
            .unwrap()
            .with_display(Some("Risco alto".into()), Some("#f00".into()));
        assert_eq!(a, b);
        assert_eq!(a.slug(), "risco");
        assert_eq!(a.label(), "Risco");
        assert_eq!(b.label(), "Risco alto");
    }

    #[test]
    fn test_catalog_value_rejects_blank() {
        assert!(RelatoPrioridade::new("   ").is_err());
    }

    #[test]
    fn test_humanize_slug() {
        assert_eq!(humanize_slug("licao-aprendida"), "Licao aprendida");
    }

    #[test]
    fn test_store_id_must_be_positive() {
        assert!(TodoId::new(0).is_err());
        assert!(RelatoId::new(-3).is_err());
        assert_eq!(ProjectId::new(7).unwrap().value(), 7);
    }

    #[test]
    fn test_user_id_trims() {
        assert_eq!(UserId::new(" u1 ").unwrap().as_str(), "u1");
        assert!(UserId::new("").is_err());
    }

    #[test]
    fn test_actor_can_modify() {
        let owner = UserId::new("u1").unwrap();
        let other = UserId::new("u2").unwrap();
        assert!(Actor::member(owner.clone()).can_modify(Some(&owner)));
        assert!(!Actor::member(other.clone()).can_modify(Some(&owner)));
        assert!(Actor::privileged(other).can_modify(None));
    }
}
