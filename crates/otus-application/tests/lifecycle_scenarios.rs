//! End-to-end lifecycle scenarios
//!
//! Each test drives the use cases over the in-memory store the way a caller
//! would, then inspects the store directly.

use std::sync::Arc;

use otus_application::{
    ApplicationError, CreateRelatoCommand, CreateTodoCommand, ListRelatosQuery, ListTodosQuery,
    RelatoActionCommand, TodoActionCommand, TodoListDefaults, UpdateRelatoCommand,
    UpdateTodoCommand, UseCase, UseCases,
};
use otus_domain::{
    Actor, AgendaTaskId, AgendaTaskSummary, DomainError, Patch, ProjectId, ProjectSummary,
    RelatoId, RelatoRepository, UserId,
};
use otus_persistence::{InMemoryRelatoRepository, InMemoryTodoRepository, MemoryStore};

struct Harness {
    store: Arc<MemoryStore>,
    todos: Arc<InMemoryTodoRepository>,
    relatos: Arc<InMemoryRelatoRepository>,
    use_cases: UseCases,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    store.seed_default_catalog();
    let todos = Arc::new(InMemoryTodoRepository::new(store.clone()));
    let relatos = Arc::new(InMemoryRelatoRepository::new(store.clone()));
    let use_cases = UseCases::new(todos.clone(), relatos.clone(), TodoListDefaults::default());
    Harness {
        store,
        todos,
        relatos,
        use_cases,
    }
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn actor(id: &str) -> Actor {
    Actor::member(user(id))
}

fn new_todo(by: &str, name: &str) -> CreateTodoCommand {
    CreateTodoCommand {
        actor: actor(by),
        name: name.to_string(),
        description: None,
        status: None,
        priority: None,
        start_date: None,
        due_date: None,
        assignee: None,
        project_id: None,
        agenda_task_id: None,
    }
}

fn new_relato(by: &str, tipo: &str) -> CreateRelatoCommand {
    CreateRelatoCommand {
        actor: actor(by),
        project_code: "PRJ1".into(),
        tipo: tipo.into(),
        prioridade: "alta".into(),
        titulo: "X".into(),
        descricao: "Y".into(),
        author_name: None,
    }
}

#[tokio::test]
async fn test_complete_sets_closure_metadata() {
    let h = harness();
    let mut cmd = new_todo("user1", "Write report");
    cmd.priority = Some("alta".into());
    let created = h.use_cases.todos.create.execute(cmd).await.unwrap();
    assert_eq!(created.status, "backlog");
    assert!(!created.is_closed);

    let done = h
        .use_cases
        .todos
        .complete
        .execute(TodoActionCommand {
            actor: actor("user1"),
            id: created.id.unwrap(),
        })
        .await
        .unwrap();

    assert_eq!(done.status, "finalizado");
    assert!(done.is_closed);
    assert_eq!(done.closed_by.as_deref(), Some("user1"));
    assert!(done.closed_at.is_some());
}

#[tokio::test]
async fn test_second_complete_is_rejected() {
    let h = harness();
    let created = h
        .use_cases
        .todos
        .create
        .execute(new_todo("user1", "Write report"))
        .await
        .unwrap();
    let action = TodoActionCommand {
        actor: actor("user1"),
        id: created.id.unwrap(),
    };

    h.use_cases.todos.complete.execute(action.clone()).await.unwrap();
    let err = h.use_cases.todos.complete.execute(action).await.unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::AlreadyClosed { .. })
    ));
}

#[tokio::test]
async fn test_resolve_then_reopen_clears_resolution() {
    let h = harness();
    let created = h
        .use_cases
        .relatos
        .create
        .execute(new_relato("u1", "risco"))
        .await
        .unwrap();
    let id = created.id.unwrap();
    assert_eq!(created.code.as_deref(), Some(format!("RL-{}", id).as_str()));

    let resolved = h
        .use_cases
        .relatos
        .resolve
        .execute(RelatoActionCommand {
            actor: actor("u2"),
            id,
        })
        .await
        .unwrap();
    assert!(resolved.is_resolved);
    assert_eq!(resolved.resolved_by_id.as_deref(), Some("u2"));

    let reopened = h
        .use_cases
        .relatos
        .reopen
        .execute(RelatoActionCommand {
            actor: actor("u1"),
            id,
        })
        .await
        .unwrap();
    assert!(!reopened.is_resolved);
    assert!(reopened.resolved_at.is_none());
    assert!(reopened.resolved_by_id.is_none());
}

#[tokio::test]
async fn test_list_issues_one_user_batch_for_many_todos() {
    let h = harness();
    h.store.seed_user(&user("ana"), "Ana", None);
    h.store.seed_user(&user("bruno"), "Bruno", None);
    for (name, assignee) in [("a", "ana"), ("b", "bruno"), ("c", "ana")] {
        let mut cmd = new_todo("ana", name);
        cmd.assignee = Some(assignee.into());
        h.use_cases.todos.create.execute(cmd).await.unwrap();
    }
    let before = h.todos.user_batch_lookups();

    let listed = h
        .use_cases
        .todos
        .list
        .execute(ListTodosQuery::default())
        .await
        .unwrap();

    assert_eq!(listed.len(), 3);
    assert_eq!(h.todos.user_batch_lookups() - before, 1);
    for todo in &listed {
        let expected = match todo.assignee.as_deref() {
            Some("ana") => "Ana",
            Some("bruno") => "Bruno",
            other => panic!("unexpected assignee {:?}", other),
        };
        assert_eq!(todo.assignee_name.as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn test_unknown_tipo_is_rejected_before_any_write() {
    let h = harness();
    let created = h
        .use_cases
        .relatos
        .create
        .execute(new_relato("u1", "risco"))
        .await
        .unwrap();
    let id = created.id.unwrap();
    let before = h.relatos.find_by_id(RelatoId::new(id).unwrap()).await.unwrap();

    let mut cmd = UpdateRelatoCommand::new(actor("u1"), id);
    cmd.tipo = Some("not-a-real-slug".into());
    cmd.titulo = Some("changed".into());
    let err = h.use_cases.relatos.update.execute(cmd).await.unwrap_err();

    match err {
        ApplicationError::ValidationFailed(message) => {
            assert!(message.contains("not-a-real-slug"));
            for slug in ["risco", "problema", "decisao"] {
                assert!(message.contains(slug), "{} missing from {}", slug, message);
            }
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    let after = h.relatos.find_by_id(RelatoId::new(id).unwrap()).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_agenda_link_failure_does_not_fail_update() {
    let h = harness();
    let project = ProjectId::new(7).unwrap();
    let agenda = AgendaTaskId::new(11).unwrap();
    h.store.seed_project(ProjectSummary {
        id: project,
        name: "Sede".into(),
        code: Some("PRJ1".into()),
        team_id: None,
        team_name: None,
    });
    h.store.seed_agenda_task(AgendaTaskSummary {
        id: agenda,
        name: "Vistoria".into(),
        project_id: None,
    });
    let created = h
        .use_cases
        .todos
        .create
        .execute(new_todo("ana", "Vistoria"))
        .await
        .unwrap();

    h.store.set_agenda_links_failing(true);
    let mut cmd = UpdateTodoCommand::new(actor("ana"), created.id.unwrap());
    cmd.project_id = Patch::Value(project.value());
    cmd.agenda_task_id = Patch::Value(agenda.value());
    let updated = h.use_cases.todos.update.execute(cmd).await.unwrap();

    assert_eq!(updated.project_id, Some(7));
    assert_eq!(updated.agenda_task_id, Some(11));
    assert_eq!(updated.agenda_task_name.as_deref(), Some("Vistoria"));
    assert!(!h.store.has_agenda_project_link(11, 7));

    h.store.set_agenda_links_failing(false);
    let mut retry = UpdateTodoCommand::new(actor("ana"), created.id.unwrap());
    retry.name = Some("Vistoria final".into());
    h.use_cases.todos.update.execute(retry).await.unwrap();
    assert!(h.store.has_agenda_project_link(11, 7));
}

#[tokio::test]
async fn test_lookup_failure_degrades_to_missing_names() {
    let h = harness();
    h.store.seed_user(&user("ana"), "Ana", None);
    let mut cmd = new_todo("ana", "Orçamento");
    cmd.assignee = Some("ana".into());
    h.use_cases.todos.create.execute(cmd).await.unwrap();

    h.store.set_lookups_failing(true);
    let listed = h
        .use_cases
        .todos
        .list
        .execute(ListTodosQuery::default())
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].assignee.as_deref(), Some("ana"));
    assert!(listed[0].assignee_name.is_none());
}

#[tokio::test]
async fn test_relato_lookup_failure_falls_back_to_slugs() {
    let h = harness();
    let created = h
        .use_cases
        .relatos
        .create
        .execute(new_relato("ana", "licao-aprendida"))
        .await
        .unwrap();
    let id = created.id.unwrap();
    assert!(created.author_name.is_none());

    h.store.seed_user(&user("ana"), "Ana", None);
    h.store.seed_user(&user("bruno"), "Bruno", None);
    h.use_cases
        .relatos
        .resolve
        .execute(RelatoActionCommand {
            actor: actor("bruno"),
            id,
        })
        .await
        .unwrap();

    let healthy = h.use_cases.relatos.get.execute(id).await.unwrap().unwrap();
    assert_eq!(healthy.tipo_label, "Lição aprendida");
    assert_eq!(healthy.author_name.as_deref(), Some("Ana"));
    assert_eq!(healthy.resolved_by_name.as_deref(), Some("Bruno"));

    h.store.set_lookups_failing(true);
    let shown = h.use_cases.relatos.get.execute(id).await.unwrap().unwrap();
    assert_eq!(shown.tipo_label, "Licao aprendida");
    assert_eq!(shown.prioridade_label, "Alta");
    assert!(shown.author_name.is_none());
    assert!(shown.resolved_by_name.is_none());
    assert_eq!(shown.resolved_by_id.as_deref(), Some("bruno"));

    let listed = h
        .use_cases
        .relatos
        .list
        .execute(ListRelatosQuery {
            project_code: "PRJ1".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].tipo_label, "Licao aprendida");
    assert!(listed[0].author_name.is_none());
    assert!(listed[0].resolved_by_name.is_none());
}

#[tokio::test]
async fn test_update_checks_only_the_catalogs_it_changes() {
    let h = harness();
    let created = h
        .use_cases
        .relatos
        .create
        .execute(new_relato("u1", "risco"))
        .await
        .unwrap();
    let id = created.id.unwrap();

    // Building the response reads both catalogs once.
    let before = h.relatos.catalog_lookups();
    let mut cmd = UpdateRelatoCommand::new(actor("u1"), id);
    cmd.titulo = Some("Novo título".into());
    h.use_cases.relatos.update.execute(cmd).await.unwrap();
    assert_eq!(h.relatos.catalog_lookups() - before, 2);

    let before = h.relatos.catalog_lookups();
    let mut cmd = UpdateRelatoCommand::new(actor("u1"), id);
    cmd.tipo = Some("problema".into());
    cmd.prioridade = Some("critica".into());
    let updated = h.use_cases.relatos.update.execute(cmd).await.unwrap();
    assert_eq!(h.relatos.catalog_lookups() - before, 4);
    assert_eq!(updated.tipo_slug, "problema");
    assert_eq!(updated.prioridade_label, "Crítica");
    assert_eq!(updated.titulo, "Novo título");
}
