//! In-Memory Relato Repository Implementation
//!
//! Also serves the tipo/prioridade catalog tables and author lookups.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use otus_domain::{
    errors::DomainResult,
    query::RelatoFilters,
    repositories::{RelatoRepository, RelatoStats, UserSummary},
    value_objects::{CatalogEntryId, RelatoId, UserId},
    CatalogEntry, CatalogKind, Relato, RelatoRecord,
};

use super::store::MemoryStore;
use crate::error::{PersistenceError, PersistenceResult};

/// Thread-safe in-memory implementation of RelatoRepository
#[derive(Debug)]
pub struct InMemoryRelatoRepository {
    store: Arc<MemoryStore>,
    user_lookups: AtomicUsize,
    catalog_lookups: AtomicUsize,
}

impl InMemoryRelatoRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            user_lookups: AtomicUsize::new(0),
            catalog_lookups: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Get the current count of relatos (for testing)
    pub fn count(&self) -> usize {
        self.store.read(|t| t.relatos.len())
    }

    /// Clear all relatos (for testing)
    pub fn clear(&self) {
        self.store.write(|t| t.relatos.clear());
    }

    /// Number of `get_users_by_ids` calls served
    pub fn user_batch_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }

    /// Number of `find_catalog` calls served
    pub fn catalog_lookups(&self) -> usize {
        self.catalog_lookups.load(Ordering::SeqCst)
    }
}

fn restore(record: &RelatoRecord) -> PersistenceResult<Relato> {
    Relato::from_persistence(record.clone()).map_err(|e| {
        PersistenceError::CorruptRecord(format!("relato {}: {}", record.id.unwrap_or_default(), e))
    })
}

#[async_trait]
impl RelatoRepository for InMemoryRelatoRepository {
    async fn find_by_project_code(
        &self,
        project_code: &str,
        filters: &RelatoFilters,
    ) -> DomainResult<Vec<Relato>> {
        let code = project_code.trim();
        let mut relatos = self.store.read(|t| {
            t.relatos
                .values()
                .filter(|r| r.project_code == code)
                .map(restore)
                .collect::<PersistenceResult<Vec<_>>>()
        })?;
        relatos.retain(|r| filters.matches(r));
        relatos.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        debug!(project_code = code, count = relatos.len(), "Loaded relatos");
        Ok(relatos)
    }

    async fn find_by_id(&self, id: RelatoId) -> DomainResult<Option<Relato>> {
        let relato = self
            .store
            .read(|t| t.relatos.get(&id.value()).map(restore).transpose())?;
        Ok(relato)
    }

    async fn save(&self, relato: &Relato) -> DomainResult<Relato> {
        let record = self.store.write(|t| {
            let id = match relato.id() {
                Some(id) if t.relatos.contains_key(&id.value()) => {
                    return Err(PersistenceError::Duplicate(format!("relato {}", id)));
                }
                Some(id) => id.value(),
                None => t.next_relato_id(),
            };
            let mut record = relato.to_persistence();
            record.id = Some(id);
            t.relatos.insert(id, record.clone());
            Ok(record)
        })?;
        debug!(id = ?record.id, "Inserted relato");
        Ok(restore(&record)?)
    }

    async fn update(&self, relato: &Relato) -> DomainResult<Relato> {
        let id = relato
            .id()
            .ok_or_else(|| PersistenceError::not_found("Relato", "(unsaved)"))?;
        let record = self.store.write(|t| {
            let slot = t
                .relatos
                .get_mut(&id.value())
                .ok_or_else(|| PersistenceError::not_found("Relato", id))?;
            *slot = relato.to_persistence();
            Ok::<_, PersistenceError>(slot.clone())
        })?;
        debug!(id = %id, "Updated relato");
        Ok(restore(&record)?)
    }

    async fn delete(&self, id: RelatoId) -> DomainResult<()> {
        self.store
            .write(|t| t.relatos.remove(&id.value()))
            .ok_or_else(|| PersistenceError::not_found("Relato", id))?;
        debug!(id = %id, "Deleted relato");
        Ok(())
    }

    async fn get_stats_by_project(&self, project_code: &str) -> DomainResult<RelatoStats> {
        let relatos = self
            .find_by_project_code(project_code, &RelatoFilters::default())
            .await?;
        Ok(RelatoStats::from_relatos(relatos.iter()))
    }

    async fn find_catalog(&self, kind: CatalogKind) -> DomainResult<Vec<CatalogEntry>> {
        self.store.check_lookups("catalog")?;
        self.catalog_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.read(|t| {
            t.catalog
                .iter()
                .filter(|e| e.kind == kind)
                .cloned()
                .collect()
        }))
    }

    async fn find_catalog_entry(
        &self,
        kind: CatalogKind,
        id: CatalogEntryId,
    ) -> DomainResult<Option<CatalogEntry>> {
        Ok(self.store.read(|t| {
            t.catalog
                .iter()
                .find(|e| e.kind == kind && e.id == Some(id))
                .cloned()
        }))
    }

    async fn save_catalog_entry(&self, entry: &CatalogEntry) -> DomainResult<CatalogEntry> {
        let saved = self.store.write(|t| {
            if t.catalog
                .iter()
                .any(|e| e.kind == entry.kind && e.slug == entry.slug)
            {
                return Err(PersistenceError::Duplicate(format!(
                    "{} '{}'",
                    entry.kind, entry.slug
                )));
            }
            let mut saved = entry.clone();
            let id = t.next_catalog_entry_id();
            saved.id = Some(
                CatalogEntryId::new(id).map_err(|e| PersistenceError::CorruptRecord(e.to_string()))?,
            );
            t.catalog.push(saved.clone());
            Ok(saved)
        })?;
        debug!(kind = %saved.kind, slug = %saved.slug, "Inserted catalog entry");
        Ok(saved)
    }

    async fn update_catalog_entry(&self, entry: &CatalogEntry) -> DomainResult<CatalogEntry> {
        let id = entry
            .id
            .ok_or_else(|| PersistenceError::not_found("CatalogEntry", "(unsaved)"))?;
        self.store.write(|t| {
            let slot = t
                .catalog
                .iter_mut()
                .find(|e| e.kind == entry.kind && e.id == Some(id))
                .ok_or_else(|| PersistenceError::not_found("CatalogEntry", id))?;
            *slot = entry.clone();
            Ok::<_, PersistenceError>(())
        })?;
        debug!(id = %id, "Updated catalog entry");
        Ok(entry.clone())
    }

    async fn delete_catalog_entry(&self, kind: CatalogKind, id: CatalogEntryId) -> DomainResult<()> {
        self.store.write(|t| {
            let before = t.catalog.len();
            t.catalog.retain(|e| !(e.kind == kind && e.id == Some(id)));
            if t.catalog.len() == before {
                return Err(PersistenceError::not_found("CatalogEntry", id));
            }
            Ok(())
        })?;
        debug!(%kind, id = %id, "Deleted catalog entry");
        Ok(())
    }

    async fn count_relatos_using(&self, kind: CatalogKind, slug: &str) -> DomainResult<u64> {
        Ok(self.store.read(|t| {
            t.relatos
                .values()
                .filter(|r| match kind {
                    CatalogKind::Tipo => r.tipo == slug,
                    CatalogKind::Prioridade => r.prioridade == slug,
                })
                .count() as u64
        }))
    }

    async fn get_user_by_id(&self, id: &UserId) -> DomainResult<Option<UserSummary>> {
        self.store.check_lookups("users")?;
        Ok(self.store.read(|t| t.users.get(id.as_str()).cloned()))
    }

    async fn get_users_by_ids(&self, ids: &[UserId]) -> DomainResult<HashMap<UserId, UserSummary>> {
        self.store.check_lookups("users")?;
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        debug!(ids = ids.len(), "Batch user lookup");
        Ok(self.store.read(|t| {
            ids.iter()
                .filter_map(|id| t.users.get(id.as_str()).map(|u| (id.clone(), u.clone())))
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otus_domain::{DomainError, NewRelato, RelatoPrioridade, RelatoTipo};

    fn repo() -> InMemoryRelatoRepository {
        let store = Arc::new(MemoryStore::new());
        store.seed_default_catalog();
        InMemoryRelatoRepository::new(store)
    }

    fn new_relato(project: &str, tipo: &str) -> Relato {
        Relato::create(NewRelato {
            project_code: project.into(),
            tipo: RelatoTipo::new(tipo).unwrap(),
            prioridade: RelatoPrioridade::new("alta").unwrap(),
            titulo: "Titulo".into(),
            descricao: "Descricao".into(),
            author_id: UserId::new("u1").unwrap(),
            author_name: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_by_project_code_filters_and_orders() {
        let repo = repo();
        let first = repo.save(&new_relato("PRJ1", "risco")).await.unwrap();
        let second = repo.save(&new_relato("PRJ1", "decisao")).await.unwrap();
        repo.save(&new_relato("PRJ2", "risco")).await.unwrap();

        let all = repo
            .find_by_project_code("PRJ1", &RelatoFilters::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at() >= all[1].created_at());
        let ids: Vec<_> = all.iter().map(|r| r.id()).collect();
        assert!(ids.contains(&first.id()) && ids.contains(&second.id()));

        let riscos = repo
            .find_by_project_code(
                "PRJ1",
                &RelatoFilters {
                    tipo: Some("risco".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(riscos.len(), 1);
    }

    #[tokio::test]
    async fn test_stats_by_project() {
        let repo = repo();
        let mut r = repo.save(&new_relato("PRJ1", "risco")).await.unwrap();
        repo.save(&new_relato("PRJ1", "risco")).await.unwrap();
        r.resolve("u2").unwrap();
        repo.update(&r).await.unwrap();

        let stats = repo.get_stats_by_project("PRJ1").await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.by_tipo["risco"], 2);
    }

    #[tokio::test]
    async fn test_catalog_crud() {
        let repo = repo();
        let entry = CatalogEntry::new(CatalogKind::Tipo, "oportunidade", "Oportunidade").unwrap();
        let mut saved = repo.save_catalog_entry(&entry).await.unwrap();
        assert!(saved.id.is_some());
        assert_eq!(repo.find_catalog(CatalogKind::Tipo).await.unwrap().len(), 7);

        let duplicate = repo.save_catalog_entry(&entry).await.unwrap_err();
        assert!(matches!(duplicate, DomainError::Repository { .. }));

        saved.active = false;
        repo.update_catalog_entry(&saved).await.unwrap();
        let found = repo
            .find_catalog_entry(CatalogKind::Tipo, saved.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!found.active);

        repo.delete_catalog_entry(CatalogKind::Tipo, saved.id.unwrap())
            .await
            .unwrap();
        assert!(repo
            .delete_catalog_entry(CatalogKind::Tipo, saved.id.unwrap())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_count_relatos_using() {
        let repo = repo();
        repo.save(&new_relato("PRJ1", "risco")).await.unwrap();
        repo.save(&new_relato("PRJ2", "risco")).await.unwrap();
        assert_eq!(repo.count_relatos_using(CatalogKind::Tipo, "risco").await.unwrap(), 2);
        assert_eq!(repo.count_relatos_using(CatalogKind::Tipo, "decisao").await.unwrap(), 0);
        assert_eq!(
            repo.count_relatos_using(CatalogKind::Prioridade, "alta").await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_user_lookups() {
        let repo = repo();
        let u1 = UserId::new("u1").unwrap();
        repo.store().seed_user(&u1, "Ana", None);
        assert_eq!(repo.get_user_by_id(&u1).await.unwrap().unwrap().name, "Ana");
        let users = repo.get_users_by_ids(&[u1.clone()]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(repo.user_batch_lookups(), 1);
    }
}
