//! Relato aggregate root (project diary entry)
//!
//! A relato is either open or resolved. Resolution metadata is a single
//! optional value, so "resolved" and "has resolver + timestamp" cannot
//! drift apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{RelatoId, RelatoPrioridade, RelatoTipo, UserId};

/// Maximum title length, in characters
pub const MAX_TITULO_LEN: usize = 200;

/// When and by whom a relato was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub at: DateTime<Utc>,
    pub by: UserId,
}

/// Input for [`Relato::create`]
///
/// `tipo` and `prioridade` must already have been checked against the live
/// catalog by the caller.
#[derive(Debug, Clone)]
pub struct NewRelato {
    pub project_code: String,
    pub tipo: RelatoTipo,
    pub prioridade: RelatoPrioridade,
    pub titulo: String,
    pub descricao: String,
    pub author_id: UserId,
    pub author_name: Option<String>,
}

/// Relato aggregate root
#[derive(Debug, Clone, PartialEq)]
pub struct Relato {
    id: Option<RelatoId>,
    project_code: String,
    tipo: RelatoTipo,
    prioridade: RelatoPrioridade,
    titulo: String,
    descricao: String,
    author_id: UserId,
    author_name: Option<String>,
    resolution: Option<Resolution>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Relato {
    pub fn create(props: NewRelato) -> DomainResult<Self> {
        let project_code = Self::validate_project_code(&props.project_code)?;
        let titulo = Self::validate_titulo(&props.titulo)?;
        let descricao = Self::validate_descricao(&props.descricao)?;
        let now = Utc::now();

        Ok(Self {
            id: None,
            project_code,
            tipo: props.tipo,
            prioridade: props.prioridade,
            titulo,
            descricao,
            author_id: props.author_id,
            author_name: props
                .author_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            resolution: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild from a stored row; a half-filled resolution is treated as open
    pub fn from_persistence(record: RelatoRecord) -> DomainResult<Self> {
        let resolution = match (record.is_resolved, record.resolved_at, record.resolved_by_id) {
            (true, Some(at), Some(by)) => Some(Resolution {
                at,
                by: UserId::new(by)?,
            }),
            _ => None,
        };

        Ok(Self {
            id: record.id.map(RelatoId::new).transpose()?,
            project_code: Self::validate_project_code(&record.project_code)?,
            tipo: RelatoTipo::new(&record.tipo)?,
            prioridade: RelatoPrioridade::new(&record.prioridade)?,
            titulo: record.titulo,
            descricao: record.descricao,
            author_id: UserId::new(record.author_id)?,
            author_name: record.author_name,
            resolution,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn to_persistence(&self) -> RelatoRecord {
        RelatoRecord {
            id: self.id.map(|id| id.value()),
            project_code: self.project_code.clone(),
            tipo: self.tipo.slug().to_string(),
            prioridade: self.prioridade.slug().to_string(),
            titulo: self.titulo.clone(),
            descricao: self.descricao.clone(),
            author_id: self.author_id.as_str().to_string(),
            author_name: self.author_name.clone(),
            is_resolved: self.resolution.is_some(),
            resolved_at: self.resolution.as_ref().map(|r| r.at),
            resolved_by_id: self.resolution.as_ref().map(|r| r.by.as_str().to_string()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Replace title and/or description; both stay non-empty
    pub fn update_content(
        &mut self,
        titulo: Option<&str>,
        descricao: Option<&str>,
    ) -> DomainResult<()> {
        let titulo = titulo.map(Self::validate_titulo).transpose()?;
        let descricao = descricao.map(Self::validate_descricao).transpose()?;
        if titulo.is_none() && descricao.is_none() {
            return Ok(());
        }
        if let Some(titulo) = titulo {
            self.titulo = titulo;
        }
        if let Some(descricao) = descricao {
            self.descricao = descricao;
        }
        self.touch();
        Ok(())
    }

    pub fn change_tipo(&mut self, tipo: RelatoTipo) {
        self.tipo = tipo;
        self.touch();
    }

    pub fn change_prioridade(&mut self, prioridade: RelatoPrioridade) {
        self.prioridade = prioridade;
        self.touch();
    }

    /// Mark resolved; a blank resolver is refused
    pub fn resolve(&mut self, resolved_by_id: &str) -> DomainResult<()> {
        let by = UserId::new(resolved_by_id).map_err(|_| DomainError::MissingResolver)?;
        self.resolution = Some(Resolution {
            at: Utc::now(),
            by,
        });
        self.touch();
        Ok(())
    }

    /// Clear resolution; idempotent
    pub fn reopen(&mut self) {
        if self.resolution.take().is_some() {
            self.touch();
        }
    }

    pub fn id(&self) -> Option<RelatoId> {
        self.id
    }

    /// Display code, `RL-<id>`, once persisted
    pub fn code(&self) -> Option<String> {
        self.id.map(|id| format!("RL-{}", id))
    }

    pub fn project_code(&self) -> &str {
        &self.project_code
    }

    pub fn tipo(&self) -> &RelatoTipo {
        &self.tipo
    }

    pub fn prioridade(&self) -> &RelatoPrioridade {
        &self.prioridade
    }

    pub fn titulo(&self) -> &str {
        &self.titulo
    }

    pub fn descricao(&self) -> &str {
        &self.descricao
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolution.as_ref().map(|r| r.at)
    }

    pub fn resolved_by_id(&self) -> Option<&UserId> {
        self.resolution.as_ref().map(|r| &r.by)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.author_id == user
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn validate_project_code(code: &str) -> DomainResult<String> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("project_code", "cannot be empty"));
        }
        Ok(trimmed.to_string())
    }

    fn validate_titulo(titulo: &str) -> DomainResult<String> {
        let trimmed = titulo.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("titulo", "cannot be empty"));
        }
        if trimmed.chars().count() > MAX_TITULO_LEN {
            return Err(DomainError::validation(
                "titulo",
                format!("cannot exceed {} characters", MAX_TITULO_LEN),
            ));
        }
        Ok(trimmed.to_string())
    }

    fn validate_descricao(descricao: &str) -> DomainResult<String> {
        let trimmed = descricao.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("descricao", "cannot be empty"));
        }
        Ok(trimmed.to_string())
    }
}

/// Storable row for a relato
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatoRecord {
    pub id: Option<i64>,
    pub project_code: String,
    pub tipo: String,
    pub prioridade: String,
    pub titulo: String,
    pub descricao: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> NewRelato {
        NewRelato {
            project_code: "PRJ1".into(),
            tipo: RelatoTipo::new("risco").unwrap(),
            prioridade: RelatoPrioridade::new("alta").unwrap(),
            titulo: "X".into(),
            descricao: "Y".into(),
            author_id: UserId::new("u1").unwrap(),
            author_name: None,
        }
    }

    fn relato() -> Relato {
        Relato::create(props()).unwrap()
    }

    #[test]
    fn test_create_starts_open() {
        let r = relato();
        assert!(!r.is_resolved());
        assert!(r.code().is_none());
        assert_eq!(r.tipo().slug(), "risco");
    }

    #[test]
    fn test_create_requires_content() {
        let result = Relato::create(NewRelato {
            titulo: " ".into(),
            ..props()
        });
        assert!(matches!(result, Err(DomainError::ValidationError { .. })));

        let long_title = "a".repeat(MAX_TITULO_LEN + 1);
        let result = Relato::create(NewRelato {
            titulo: long_title,
            ..props()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_then_reopen() {
        let mut r = relato();
        r.resolve("u2").unwrap();
        assert!(r.is_resolved());
        assert_eq!(r.resolved_by_id().map(|u| u.as_str()), Some("u2"));
        r.reopen();
        assert!(!r.is_resolved());
        assert!(r.resolved_at().is_none());
        assert!(r.resolved_by_id().is_none());
    }

    #[test]
    fn test_resolve_without_resolver_fails() {
        let mut r = relato();
        assert_eq!(r.resolve("  "), Err(DomainError::MissingResolver));
        assert!(!r.is_resolved());
    }

    #[test]
    fn test_reopen_twice_is_idempotent() {
        let mut r = relato();
        r.resolve("u2").unwrap();
        r.reopen();
        let once = r.clone();
        r.reopen();
        assert_eq!(r, once);
    }

    #[test]
    fn test_update_content_validates_before_mutating() {
        let mut r = relato();
        let result = r.update_content(Some("new title"), Some(""));
        assert!(result.is_err());
        assert_eq!(r.titulo(), "X");
    }

    #[test]
    fn test_code_after_persistence() {
        let mut record = relato().to_persistence();
        record.id = Some(15);
        let r = Relato::from_persistence(record).unwrap();
        assert_eq!(r.code().as_deref(), Some("RL-15"));
    }

    #[test]
    fn test_from_persistence_half_resolution_is_open() {
        let mut record = relato().to_persistence();
        record.is_resolved = true;
        record.resolved_at = Some(Utc::now());
        record.resolved_by_id = None;
        let r = Relato::from_persistence(record).unwrap();
        assert!(!r.is_resolved());
    }
}
