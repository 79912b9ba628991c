//! Catalog maintenance use cases
//!
//! Reads are open to everyone; writes need a privileged actor.

use async_trait::async_trait;
use tracing::info;

use otus_domain::{Actor, Catalog, CatalogEntry, CatalogEntryId, CatalogKind, RelatoRepository};

use super::{require_text, SharedRelatoRepository, UseCase};
use crate::dto::{
    CatalogEntryResponse, CreateCatalogEntryCommand, DeleteCatalogEntryCommand, ListCatalogQuery,
    UpdateCatalogEntryCommand,
};
use crate::errors::{ApplicationError, ApplicationResult};

fn ensure_privileged(actor: &Actor, kind: CatalogKind) -> ApplicationResult<()> {
    if actor.privileged {
        Ok(())
    } else {
        Err(ApplicationError::Forbidden(format!(
            "only privileged users may change the {} catalog",
            kind
        )))
    }
}

async fn load_entry(
    repo: &dyn RelatoRepository,
    kind: CatalogKind,
    id: i64,
) -> ApplicationResult<CatalogEntry> {
    let id = CatalogEntryId::new(id)?;
    repo.find_catalog_entry(kind, id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("CatalogEntry", id))
}

fn normalize_color(raw: &str) -> Option<String> {
    let color = raw.trim();
    (!color.is_empty()).then(|| color.to_string())
}

pub struct ListCatalog {
    repo: SharedRelatoRepository,
}

impl ListCatalog {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for ListCatalog {
    type Input = ListCatalogQuery;
    type Output = Vec<CatalogEntryResponse>;

    async fn execute(&self, query: ListCatalogQuery) -> ApplicationResult<Vec<CatalogEntryResponse>> {
        let catalog = Catalog::new(query.kind, self.repo.find_catalog(query.kind).await?);
        Ok(catalog
            .entries()
            .iter()
            .filter(|e| query.include_inactive || e.active)
            .map(CatalogEntryResponse::from_domain)
            .collect())
    }
}

pub struct CreateCatalogEntry {
    repo: SharedRelatoRepository,
}

impl CreateCatalogEntry {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for CreateCatalogEntry {
    type Input = CreateCatalogEntryCommand;
    type Output = CatalogEntryResponse;

    async fn execute(&self, cmd: CreateCatalogEntryCommand) -> ApplicationResult<CatalogEntryResponse> {
        ensure_privileged(&cmd.actor, cmd.kind)?;
        let slug = require_text("slug", &cmd.slug)?;
        let label = require_text("label", &cmd.label)?;
        let mut entry = CatalogEntry::new(cmd.kind, &slug, &label)?;

        let catalog = Catalog::new(cmd.kind, self.repo.find_catalog(cmd.kind).await?);
        if catalog.find(&entry.slug).is_some() {
            return Err(ApplicationError::Conflict(format!(
                "{} '{}' already exists",
                cmd.kind, entry.slug
            )));
        }

        entry.color = cmd.color.as_deref().and_then(normalize_color);
        entry.sort_order = match cmd.sort_order {
            Some(order) => order,
            None => catalog
                .entries()
                .iter()
                .map(|e| e.sort_order)
                .max()
                .unwrap_or(0)
                .checked_add(1)
                .ok_or_else(|| {
                    ApplicationError::ValidationFailed(format!(
                        "sort_order: the {} catalog has no free position after {}; pass one explicitly",
                        cmd.kind,
                        i32::MAX
                    ))
                })?,
        };

        let saved = self.repo.save_catalog_entry(&entry).await?;
        info!(kind = %saved.kind, slug = %saved.slug, user = %cmd.actor.user_id, "Catalog entry created");
        Ok(CatalogEntryResponse::from_domain(&saved))
    }
}

pub struct UpdateCatalogEntry {
    repo: SharedRelatoRepository,
}

impl UpdateCatalogEntry {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for UpdateCatalogEntry {
    type Input = UpdateCatalogEntryCommand;
    type Output = CatalogEntryResponse;

    async fn execute(&self, cmd: UpdateCatalogEntryCommand) -> ApplicationResult<CatalogEntryResponse> {
        ensure_privileged(&cmd.actor, cmd.kind)?;
        let mut entry = load_entry(&*self.repo, cmd.kind, cmd.id).await?;

        if let Some(label) = cmd.label.as_deref() {
            entry.relabel(label)?;
        }
        if let Some(color) = cmd.color.into_option() {
            entry.color = color.as_deref().and_then(normalize_color);
        }
        if let Some(order) = cmd.sort_order {
            entry.sort_order = order;
        }
        if let Some(active) = cmd.active {
            entry.active = active;
        }

        let saved = self.repo.update_catalog_entry(&entry).await?;
        info!(kind = %saved.kind, slug = %saved.slug, active = saved.active, "Catalog entry updated");
        Ok(CatalogEntryResponse::from_domain(&saved))
    }
}

/// Removes an entry no relato references; referenced entries should be
/// deactivated instead
pub struct DeleteCatalogEntry {
    repo: SharedRelatoRepository,
}

impl DeleteCatalogEntry {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for DeleteCatalogEntry {
    type Input = DeleteCatalogEntryCommand;
    type Output = ();

    async fn execute(&self, cmd: DeleteCatalogEntryCommand) -> ApplicationResult<()> {
        ensure_privileged(&cmd.actor, cmd.kind)?;
        let entry = load_entry(&*self.repo, cmd.kind, cmd.id).await?;

        let in_use = self.repo.count_relatos_using(cmd.kind, &entry.slug).await?;
        if in_use > 0 {
            return Err(ApplicationError::Conflict(format!(
                "{} '{}' is used by {} relato(s); deactivate it instead",
                cmd.kind, entry.slug, in_use
            )));
        }

        if let Some(id) = entry.id {
            self.repo.delete_catalog_entry(cmd.kind, id).await?;
        }
        info!(kind = %cmd.kind, slug = %entry.slug, user = %cmd.actor.user_id, "Catalog entry deleted");
        Ok(())
    }
}
