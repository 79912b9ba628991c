//! Drive the binary's dispatch against a snapshot in a temp dir

use clap::Parser;
use tempfile::TempDir;

use otus_cli::{execute, Cli};
use otus_config::AppConfig;

struct Session {
    _dir: TempDir,
    data: String,
    config: AppConfig,
}

impl Session {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("otus.json").display().to_string();
        Self {
            _dir: dir,
            data,
            config: AppConfig::default(),
        }
    }

    async fn run(&self, args: &[&str]) -> anyhow::Result<serde_json::Value> {
        let mut argv = vec!["otus", "--data", self.data.as_str(), "--user", "ana"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        execute(&cli, &self.config).await
    }
}

#[tokio::test]
async fn test_todo_lifecycle_persists_between_invocations() {
    let session = Session::new();

    let created = session
        .run(&["todo", "create", "Write report", "--priority", "alta"])
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], "backlog");

    let done = session
        .run(&["todo", "complete", &id.to_string()])
        .await
        .unwrap();
    assert_eq!(done["status"], "finalizado");
    assert_eq!(done["closed_by"], "ana");

    let shown = session.run(&["todo", "show", &id.to_string()]).await.unwrap();
    assert_eq!(shown["is_closed"], true);

    let err = session
        .run(&["todo", "complete", &id.to_string()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already closed"));
}

#[tokio::test]
async fn test_update_clears_fields() {
    let session = Session::new();
    let created = session
        .run(&["todo", "create", "Vistoria", "--assignee", "bruno", "--description", "Bloco A"])
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap().to_string();

    let updated = session
        .run(&["todo", "update", &id, "--unassign", "--clear-description"])
        .await
        .unwrap();
    assert!(updated["assignee"].is_null());
    assert!(updated["description"].is_null());
    assert_eq!(updated["name"], "Vistoria");
}

#[tokio::test]
async fn test_relato_against_seeded_catalog() {
    let session = Session::new();
    let created = session
        .run(&[
            "relato", "create", "PRJ1", "--tipo", "risco", "--prioridade", "alta", "--titulo",
            "X", "--descricao", "Y",
        ])
        .await
        .unwrap();
    assert_eq!(created["tipo_label"], "Risco");
    let id = created["id"].as_i64().unwrap().to_string();

    let err = session
        .run(&["relato", "update", &id, "--tipo", "not-a-real-slug"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Valid values"));

    let listed = session.run(&["relato", "list", "PRJ1"]).await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["tipo_slug"], "risco");
}

#[tokio::test]
async fn test_catalog_writes_need_admin() {
    let session = Session::new();
    let err = session
        .run(&["catalog", "add", "tipo", "oportunidade", "Oportunidade"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Permission denied"));

    let added = session
        .run(&["--admin", "catalog", "add", "tipo", "oportunidade", "Oportunidade"])
        .await
        .unwrap();
    assert_eq!(added["slug"], "oportunidade");

    let listed = session.run(&["catalog", "list", "tipo"]).await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_show_missing_todo_fails() {
    let session = Session::new();
    let err = session.run(&["todo", "show", "5"]).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}
