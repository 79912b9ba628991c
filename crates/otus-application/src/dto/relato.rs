//! Relato-related DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use otus_domain::{Actor, Relato};

use crate::enrichment::RelatoLookups;

/// Command to create a relato; tipo and prioridade are catalog slugs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelatoCommand {
    pub actor: Actor,
    pub project_code: String,
    pub tipo: String,
    pub prioridade: String,
    pub titulo: String,
    pub descricao: String,
    /// Snapshot of the author's display name; looked up when absent
    #[serde(default)]
    pub author_name: Option<String>,
}

/// Partial update of a relato
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRelatoCommand {
    pub actor: Actor,
    pub id: i64,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub prioridade: Option<String>,
    /// `true` resolves as the actor, `false` reopens
    #[serde(default)]
    pub is_resolved: Option<bool>,
}

impl UpdateRelatoCommand {
    pub fn new(actor: Actor, id: i64) -> Self {
        Self {
            actor,
            id,
            titulo: None,
            descricao: None,
            tipo: None,
            prioridade: None,
            is_resolved: None,
        }
    }
}

/// Resolve, reopen or delete one relato
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatoActionCommand {
    pub actor: Actor,
    pub id: i64,
}

/// Relatos of one project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRelatosQuery {
    pub project_code: String,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub prioridade: Option<String>,
    #[serde(default)]
    pub resolved: Option<bool>,
}

/// Relato response with catalog metadata and names joined in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatoResponse {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub project_code: String,
    pub tipo_slug: String,
    pub tipo_label: String,
    pub tipo_color: Option<String>,
    pub prioridade_slug: String,
    pub prioridade_label: String,
    pub prioridade_color: Option<String>,
    pub titulo: String,
    pub descricao: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by_id: Option<String>,
    pub resolved_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RelatoResponse {
    /// Create from domain aggregate
    ///
    /// Catalog metadata wins over the value object's own defaults; the
    /// stored author name wins over the user lookup.
    pub fn from_domain(relato: &Relato, lookups: &RelatoLookups) -> Self {
        let tipo = relato.tipo();
        let tipo_entry = lookups.tipos.find(tipo.slug());
        let prioridade = relato.prioridade();
        let prioridade_entry = lookups.prioridades.find(prioridade.slug());

        Self {
            id: relato.id().map(|id| id.value()),
            code: relato.code(),
            project_code: relato.project_code().to_string(),
            tipo_slug: tipo.slug().to_string(),
            tipo_label: tipo_entry
                .map(|e| e.label.clone())
                .unwrap_or_else(|| tipo.label()),
            tipo_color: tipo_entry
                .and_then(|e| e.color.clone())
                .or_else(|| tipo.color().map(str::to_string)),
            prioridade_slug: prioridade.slug().to_string(),
            prioridade_label: prioridade_entry
                .map(|e| e.label.clone())
                .unwrap_or_else(|| prioridade.label()),
            prioridade_color: prioridade_entry
                .and_then(|e| e.color.clone())
                .or_else(|| prioridade.color().map(str::to_string)),
            titulo: relato.titulo().to_string(),
            descricao: relato.descricao().to_string(),
            author_id: relato.author_id().to_string(),
            author_name: relato
                .author_name()
                .map(str::to_string)
                .or_else(|| lookups.user_name(Some(relato.author_id()))),
            is_resolved: relato.is_resolved(),
            resolved_at: relato.resolved_at(),
            resolved_by_id: relato.resolved_by_id().map(|u| u.to_string()),
            resolved_by_name: lookups.user_name(relato.resolved_by_id()),
            created_at: relato.created_at(),
            updated_at: relato.updated_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otus_domain::{
        Catalog, CatalogEntry, CatalogKind, NewRelato, RelatoPrioridade, RelatoTipo, UserId,
    };

    fn relato() -> Relato {
        Relato::create(NewRelato {
            project_code: "PRJ1".into(),
            tipo: RelatoTipo::new("licao-aprendida").unwrap(),
            prioridade: RelatoPrioridade::new("alta").unwrap(),
            titulo: "X".into(),
            descricao: "Y".into(),
            author_id: UserId::new("u1").unwrap(),
            author_name: None,
        })
        .unwrap()
    }

    #[test]
    fn test_catalog_metadata_overrides_defaults() {
        let lookups = RelatoLookups {
            tipos: Catalog::new(CatalogKind::Tipo, CatalogEntry::default_tipos()),
            ..Default::default()
        };
        let response = RelatoResponse::from_domain(&relato(), &lookups);
        assert_eq!(response.tipo_label, "Lição aprendida");
        assert_eq!(response.tipo_color.as_deref(), Some("#27ae60"));
        // no prioridade catalog loaded: fall back to the slug
        assert_eq!(response.prioridade_label, "Alta");
        assert!(response.prioridade_color.is_none());
        assert!(response.code.is_none());
    }

    #[test]
    fn test_resolved_by_name_from_lookup() {
        let mut r = relato();
        r.resolve("u2").unwrap();
        let mut lookups = RelatoLookups::default();
        let u2 = UserId::new("u2").unwrap();
        lookups.users.insert(
            u2.clone(),
            otus_domain::UserSummary {
                id: u2,
                name: "Bruno".into(),
                email: None,
            },
        );
        let response = RelatoResponse::from_domain(&r, &lookups);
        assert!(response.is_resolved);
        assert_eq!(response.resolved_by_name.as_deref(), Some("Bruno"));
        assert!(response.author_name.is_none());
    }
}
