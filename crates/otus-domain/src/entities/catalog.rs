//! Admin-managed catalogs of relato tipos and prioridades
//!
//! Catalog rows are plain records; the only rule they carry is that the slug
//! is normalised and immutable. `Catalog` wraps a loaded list and answers
//! membership questions for the application layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{normalize, CatalogEntryId};

/// Which catalog a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Tipo,
    Prioridade,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Tipo => "tipo",
            CatalogKind::Prioridade => "prioridade",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "tipo" | "tipos" => Ok(CatalogKind::Tipo),
            "prioridade" | "prioridades" => Ok(CatalogKind::Prioridade),
            _ => Err(DomainError::InvalidEnumValue {
                field: "catalog".to_string(),
                provided_value: s.to_string(),
                allowed_values: vec!["tipo".to_string(), "prioridade".to_string()],
            }),
        }
    }
}

/// One row of a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Option<CatalogEntryId>,
    pub kind: CatalogKind,
    pub slug: String,
    pub label: String,
    pub color: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}

impl CatalogEntry {
    /// New active entry; slug is normalised, slug and label must be non-blank
    pub fn new(kind: CatalogKind, slug: &str, label: &str) -> DomainResult<Self> {
        let slug = normalize(slug);
        if slug.is_empty() {
            return Err(DomainError::validation("slug", "cannot be empty"));
        }
        if slug.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(
                "slug",
                format!("'{}' must not contain whitespace", slug),
            ));
        }
        let label = label.trim();
        if label.is_empty() {
            return Err(DomainError::validation("label", "cannot be empty"));
        }
        Ok(Self {
            id: None,
            kind,
            slug,
            label: label.to_string(),
            color: None,
            sort_order: 0,
            active: true,
        })
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn relabel(&mut self, label: &str) -> DomainResult<()> {
        let label = label.trim();
        if label.is_empty() {
            return Err(DomainError::validation("label", "cannot be empty"));
        }
        self.label = label.to_string();
        Ok(())
    }

    /// Seed tipos for an empty store
    pub fn default_tipos() -> Vec<CatalogEntry> {
        [
            ("risco", "Risco", "#e74c3c"),
            ("problema", "Problema", "#e67e22"),
            ("decisao", "Decisão", "#3498db"),
            ("mudanca", "Mudança", "#9b59b6"),
            ("licao-aprendida", "Lição aprendida", "#27ae60"),
            ("informacao", "Informação", "#95a5a6"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (slug, label, color))| seed(CatalogKind::Tipo, slug, label, color, i))
        .collect()
    }

    /// Seed prioridades for an empty store
    pub fn default_prioridades() -> Vec<CatalogEntry> {
        [
            ("baixa", "Baixa", "#27ae60"),
            ("media", "Média", "#f39c12"),
            ("alta", "Alta", "#e67e22"),
            ("critica", "Crítica", "#e74c3c"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (slug, label, color))| seed(CatalogKind::Prioridade, slug, label, color, i))
        .collect()
    }
}

fn seed(kind: CatalogKind, slug: &str, label: &str, color: &str, position: usize) -> CatalogEntry {
    CatalogEntry {
        id: None,
        kind,
        slug: slug.to_string(),
        label: label.to_string(),
        color: Some(color.to_string()),
        sort_order: position as i32 + 1,
        active: true,
    }
}

/// A loaded catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    kind: CatalogKind,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Entries of other kinds are dropped; the rest are kept in sort order
    pub fn new(kind: CatalogKind, entries: Vec<CatalogEntry>) -> Self {
        let mut entries: Vec<CatalogEntry> =
            entries.into_iter().filter(|e| e.kind == kind).collect();
        entries.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.slug.cmp(&b.slug)));
        Self { kind, entries }
    }

    pub fn empty(kind: CatalogKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Lookup by slug regardless of active flag; used for display metadata
    pub fn find(&self, slug: &str) -> Option<&CatalogEntry> {
        let slug = normalize(slug);
        self.entries.iter().find(|e| e.slug == slug)
    }

    /// Slugs that may be assigned to a relato
    pub fn active_slugs(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.active)
            .map(|e| e.slug.clone())
            .collect()
    }

    /// The active entry for `slug`, or a validation error listing valid slugs
    pub fn ensure_allows(&self, slug: &str) -> DomainResult<&CatalogEntry> {
        let normalized = normalize(slug);
        self.entries
            .iter()
            .find(|e| e.active && e.slug == normalized)
            .ok_or_else(|| {
                DomainError::validation(
                    self.kind.as_str(),
                    format!(
                        "'{}' is not a valid {}. Valid values: {}",
                        slug.trim(),
                        self.kind,
                        self.active_slugs().join(", ")
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_allows_lists_valid_slugs() {
        let catalog = Catalog::new(CatalogKind::Tipo, CatalogEntry::default_tipos());
        assert!(catalog.ensure_allows(" RISCO ").is_ok());
        let err = catalog.ensure_allows("not-a-real-slug").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not-a-real-slug"));
        assert!(message.contains("risco"));
        assert!(message.contains("licao-aprendida"));
    }

    #[test]
    fn test_inactive_entries_are_not_allowed_but_still_found() {
        let mut entries = CatalogEntry::default_prioridades();
        entries[0].active = false;
        let catalog = Catalog::new(CatalogKind::Prioridade, entries);
        assert!(catalog.ensure_allows("baixa").is_err());
        assert!(catalog.find("baixa").is_some());
        assert!(!catalog.active_slugs().contains(&"baixa".to_string()));
    }

    #[test]
    fn test_catalog_filters_by_kind_and_sorts() {
        let mut entries = CatalogEntry::default_tipos();
        entries.extend(CatalogEntry::default_prioridades());
        entries.reverse();
        let catalog = Catalog::new(CatalogKind::Tipo, entries);
        assert_eq!(catalog.entries().len(), 6);
        assert_eq!(catalog.entries()[0].slug, "risco");
    }

    #[test]
    fn test_new_entry_validation() {
        assert!(CatalogEntry::new(CatalogKind::Tipo, "  ", "x").is_err());
        assert!(CatalogEntry::new(CatalogKind::Tipo, "a b", "x").is_err());
        assert!(CatalogEntry::new(CatalogKind::Tipo, "ok", " ").is_err());
        let entry = CatalogEntry::new(CatalogKind::Tipo, " Oportunidade ", "Oportunidade").unwrap();
        assert_eq!(entry.slug, "oportunidade");
        assert!(entry.active);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Tipos".parse::<CatalogKind>().unwrap(), CatalogKind::Tipo);
        assert!("status".parse::<CatalogKind>().is_err());
    }
}
