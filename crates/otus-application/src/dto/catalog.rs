//! Catalog DTOs

use serde::{Deserialize, Serialize};

use otus_domain::{Actor, CatalogEntry, CatalogKind, Patch};

/// List one catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCatalogQuery {
    pub kind: CatalogKind,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCatalogEntryCommand {
    pub actor: Actor,
    pub kind: CatalogKind,
    pub slug: String,
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Appended after the last entry when absent
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Edit an entry; the slug is immutable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCatalogEntryCommand {
    pub actor: Actor,
    pub kind: CatalogKind,
    pub id: i64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Patch<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl UpdateCatalogEntryCommand {
    pub fn new(actor: Actor, kind: CatalogKind, id: i64) -> Self {
        Self {
            actor,
            kind,
            id,
            label: None,
            color: Patch::Absent,
            sort_order: None,
            active: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCatalogEntryCommand {
    pub actor: Actor,
    pub kind: CatalogKind,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntryResponse {
    pub id: Option<i64>,
    pub kind: CatalogKind,
    pub slug: String,
    pub label: String,
    pub color: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}

impl CatalogEntryResponse {
    pub fn from_domain(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.map(|id| id.value()),
            kind: entry.kind,
            slug: entry.slug.clone(),
            label: entry.label.clone(),
            color: entry.color.clone(),
            sort_order: entry.sort_order,
            active: entry.active,
        }
    }
}
