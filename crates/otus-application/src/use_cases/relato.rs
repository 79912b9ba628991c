//! Relato use cases
//!
//! Tipo and prioridade are checked against the live catalog here, before
//! the aggregate is loaded, so a bad slug never reaches the store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use otus_domain::{
    Catalog, CatalogKind, NewRelato, Relato, RelatoFilters, RelatoId, RelatoPrioridade,
    RelatoRepository, RelatoStats, RelatoTipo,
};

use super::{require_text, UseCase};
use crate::dto::{
    CreateRelatoCommand, ListRelatosQuery, RelatoActionCommand, RelatoResponse,
    UpdateRelatoCommand,
};
use crate::enrichment::load_relato_lookups;
use crate::errors::{ApplicationError, ApplicationResult};

pub type SharedRelatoRepository = Arc<dyn RelatoRepository>;

async fn load(repo: &dyn RelatoRepository, id: RelatoId) -> ApplicationResult<Relato> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Relato", id))
}

async fn respond(repo: &dyn RelatoRepository, relato: &Relato) -> RelatoResponse {
    let lookups = load_relato_lookups(repo, std::slice::from_ref(relato)).await;
    RelatoResponse::from_domain(relato, &lookups)
}

async fn load_catalog(repo: &dyn RelatoRepository, kind: CatalogKind) -> ApplicationResult<Catalog> {
    Ok(Catalog::new(kind, repo.find_catalog(kind).await?))
}

/// Only hits the store when the caller is changing this field
async fn load_catalog_if(
    repo: &dyn RelatoRepository,
    kind: CatalogKind,
    wanted: bool,
) -> ApplicationResult<Option<Catalog>> {
    if !wanted {
        return Ok(None);
    }
    load_catalog(repo, kind).await.map(Some)
}

fn tipo_from(catalog: &Catalog, slug: &str) -> ApplicationResult<RelatoTipo> {
    let entry = catalog.ensure_allows(slug)?;
    Ok(RelatoTipo::new(&entry.slug)?.with_display(Some(entry.label.clone()), entry.color.clone()))
}

fn prioridade_from(catalog: &Catalog, slug: &str) -> ApplicationResult<RelatoPrioridade> {
    let entry = catalog.ensure_allows(slug)?;
    Ok(RelatoPrioridade::new(&entry.slug)?
        .with_display(Some(entry.label.clone()), entry.color.clone()))
}

fn ensure_author_or_privileged(
    relato: &Relato,
    cmd_actor: &otus_domain::Actor,
    action: &str,
) -> ApplicationResult<()> {
    if cmd_actor.can_modify(Some(relato.author_id())) {
        return Ok(());
    }
    Err(ApplicationError::Forbidden(format!(
        "only the author or a privileged user may {} relato {}",
        action,
        relato.code().unwrap_or_default()
    )))
}

// ============================================================================
// CreateRelato
// ============================================================================

pub struct CreateRelato {
    repo: SharedRelatoRepository,
}

impl CreateRelato {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for CreateRelato {
    type Input = CreateRelatoCommand;
    type Output = RelatoResponse;

    async fn execute(&self, cmd: CreateRelatoCommand) -> ApplicationResult<RelatoResponse> {
        let project_code = require_text("project_code", &cmd.project_code)?;
        let tipo_slug = require_text("tipo", &cmd.tipo)?;
        let prioridade_slug = require_text("prioridade", &cmd.prioridade)?;
        let titulo = require_text("titulo", &cmd.titulo)?;
        let descricao = require_text("descricao", &cmd.descricao)?;

        let (tipos, prioridades) = tokio::try_join!(
            load_catalog(&*self.repo, CatalogKind::Tipo),
            load_catalog(&*self.repo, CatalogKind::Prioridade)
        )?;
        let tipo = tipo_from(&tipos, &tipo_slug)?;
        let prioridade = prioridade_from(&prioridades, &prioridade_slug)?;

        let author_name = match cmd.author_name.filter(|n| !n.trim().is_empty()) {
            Some(name) => Some(name),
            None => match self.repo.get_user_by_id(&cmd.actor.user_id).await {
                Ok(user) => user.map(|u| u.name),
                Err(err) => {
                    warn!(user = %cmd.actor.user_id, error = %err, "Author lookup failed");
                    None
                }
            },
        };

        let relato = Relato::create(NewRelato {
            project_code,
            tipo,
            prioridade,
            titulo,
            descricao,
            author_id: cmd.actor.user_id.clone(),
            author_name,
        })?;
        let saved = self.repo.save(&relato).await?;
        info!(
            code = ?saved.code(),
            project = saved.project_code(),
            tipo = saved.tipo().slug(),
            "Relato created"
        );

        Ok(respond(&*self.repo, &saved).await)
    }
}

// ============================================================================
// ListRelatos / GetRelato
// ============================================================================

pub struct ListRelatos {
    repo: SharedRelatoRepository,
}

impl ListRelatos {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for ListRelatos {
    type Input = ListRelatosQuery;
    type Output = Vec<RelatoResponse>;

    async fn execute(&self, query: ListRelatosQuery) -> ApplicationResult<Vec<RelatoResponse>> {
        let project_code = require_text("project_code", &query.project_code)?;
        let filters = RelatoFilters {
            tipo: query.tipo.filter(|s| !s.trim().is_empty()),
            prioridade: query.prioridade.filter(|s| !s.trim().is_empty()),
            resolved: query.resolved,
        };

        let relatos = self
            .repo
            .find_by_project_code(&project_code, &filters)
            .await?;
        let lookups = load_relato_lookups(&*self.repo, &relatos).await;
        Ok(relatos
            .iter()
            .map(|relato| RelatoResponse::from_domain(relato, &lookups))
            .collect())
    }
}

pub struct GetRelato {
    repo: SharedRelatoRepository,
}

impl GetRelato {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for GetRelato {
    type Input = i64;
    type Output = Option<RelatoResponse>;

    async fn execute(&self, id: i64) -> ApplicationResult<Option<RelatoResponse>> {
        let id = RelatoId::new(id)?;
        match self.repo.find_by_id(id).await? {
            Some(relato) => Ok(Some(respond(&*self.repo, &relato).await)),
            None => Ok(None),
        }
    }
}

// ============================================================================
// UpdateRelato
// ============================================================================

pub struct UpdateRelato {
    repo: SharedRelatoRepository,
}

impl UpdateRelato {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for UpdateRelato {
    type Input = UpdateRelatoCommand;
    type Output = RelatoResponse;

    async fn execute(&self, cmd: UpdateRelatoCommand) -> ApplicationResult<RelatoResponse> {
        let id = RelatoId::new(cmd.id)?;
        let titulo = cmd
            .titulo
            .as_deref()
            .map(|t| require_text("titulo", t))
            .transpose()?;
        let descricao = cmd
            .descricao
            .as_deref()
            .map(|d| require_text("descricao", d))
            .transpose()?;
        let tipo_slug = cmd
            .tipo
            .as_deref()
            .map(|t| require_text("tipo", t))
            .transpose()?;
        let prioridade_slug = cmd
            .prioridade
            .as_deref()
            .map(|p| require_text("prioridade", p))
            .transpose()?;

        let (tipos, prioridades) = tokio::try_join!(
            load_catalog_if(&*self.repo, CatalogKind::Tipo, tipo_slug.is_some()),
            load_catalog_if(&*self.repo, CatalogKind::Prioridade, prioridade_slug.is_some())
        )?;
        let tipo = match (tipos, tipo_slug) {
            (Some(catalog), Some(slug)) => Some(tipo_from(&catalog, &slug)?),
            _ => None,
        };
        let prioridade = match (prioridades, prioridade_slug) {
            (Some(catalog), Some(slug)) => Some(prioridade_from(&catalog, &slug)?),
            _ => None,
        };

        let mut relato = load(&*self.repo, id).await?;
        ensure_author_or_privileged(&relato, &cmd.actor, "edit")?;

        relato.update_content(titulo.as_deref(), descricao.as_deref())?;
        if let Some(tipo) = tipo {
            relato.change_tipo(tipo);
        }
        if let Some(prioridade) = prioridade {
            relato.change_prioridade(prioridade);
        }
        match cmd.is_resolved {
            Some(true) if !relato.is_resolved() => relato.resolve(cmd.actor.user_id.as_str())?,
            Some(false) => relato.reopen(),
            _ => {}
        }

        let saved = self.repo.update(&relato).await?;
        info!(code = ?saved.code(), user = %cmd.actor.user_id, "Relato updated");
        Ok(respond(&*self.repo, &saved).await)
    }
}

// ============================================================================
// ResolveRelato / ReopenRelato
// ============================================================================

pub struct ResolveRelato {
    repo: SharedRelatoRepository,
}

impl ResolveRelato {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for ResolveRelato {
    type Input = RelatoActionCommand;
    type Output = RelatoResponse;

    async fn execute(&self, cmd: RelatoActionCommand) -> ApplicationResult<RelatoResponse> {
        let id = RelatoId::new(cmd.id)?;
        let mut relato = load(&*self.repo, id).await?;
        relato.resolve(cmd.actor.user_id.as_str())?;
        let saved = self.repo.update(&relato).await?;
        info!(code = ?saved.code(), user = %cmd.actor.user_id, "Relato resolved");
        Ok(respond(&*self.repo, &saved).await)
    }
}

pub struct ReopenRelato {
    repo: SharedRelatoRepository,
}

impl ReopenRelato {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for ReopenRelato {
    type Input = RelatoActionCommand;
    type Output = RelatoResponse;

    async fn execute(&self, cmd: RelatoActionCommand) -> ApplicationResult<RelatoResponse> {
        let id = RelatoId::new(cmd.id)?;
        let mut relato = load(&*self.repo, id).await?;
        relato.reopen();
        let saved = self.repo.update(&relato).await?;
        info!(code = ?saved.code(), user = %cmd.actor.user_id, "Relato reopened");
        Ok(respond(&*self.repo, &saved).await)
    }
}

// ============================================================================
// DeleteRelato / GetRelatoStats
// ============================================================================

pub struct DeleteRelato {
    repo: SharedRelatoRepository,
}

impl DeleteRelato {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for DeleteRelato {
    type Input = RelatoActionCommand;
    type Output = ();

    async fn execute(&self, cmd: RelatoActionCommand) -> ApplicationResult<()> {
        let id = RelatoId::new(cmd.id)?;
        let relato = load(&*self.repo, id).await?;
        ensure_author_or_privileged(&relato, &cmd.actor, "delete")?;
        self.repo.delete(id).await?;
        info!(id = %id, user = %cmd.actor.user_id, "Relato deleted");
        Ok(())
    }
}

pub struct GetRelatoStats {
    repo: SharedRelatoRepository,
}

impl GetRelatoStats {
    pub fn new(repo: SharedRelatoRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UseCase for GetRelatoStats {
    /// Project code
    type Input = String;
    type Output = RelatoStats;

    async fn execute(&self, project_code: String) -> ApplicationResult<RelatoStats> {
        let project_code = require_text("project_code", &project_code)?;
        Ok(self.repo.get_stats_by_project(&project_code).await?)
    }
}
