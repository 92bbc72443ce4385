use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn edihub_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("edihub");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/edihub.sqlite"

[server]
bind = "127.0.0.1:8000"

[search]
default_threshold = 0.5
"#,
        root.display()
    );
    let config_path = config_dir.join("edihub.toml");
    fs::write(&config_path, config_content).unwrap();

    fs::write(
        root.join("seed.json"),
        r#"{
  "tarefas": [
    {"titulo": "revisão do projeto alpha hoje", "prioridade": "urgente", "projeto": "alpha"},
    {"titulo": "comprar material de escritório", "prioridade": "baixa"}
  ],
  "contratos": [
    {"titulo": "revisão do projeto alpha hoje", "tipo": "servico", "contratante": "Acme"},
    {"titulo": "nda com fornecedor", "tipo": "nda", "contratante": "Globex"}
  ]
}"#,
    )
    .unwrap();

    (tmp, config_path)
}

fn run_edihub(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = edihub_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run edihub binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn seed_path(config_path: &Path) -> String {
    config_path
        .parent()
        .and_then(Path::parent)
        .unwrap()
        .join("seed.json")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_edihub(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/edihub.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_edihub(&config_path, &["init"]);
    assert!(success1, "First init failed");
    let (_, _, success2) = run_edihub(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_import_then_search() {
    let (_tmp, config_path) = setup_test_env();
    let seed = seed_path(&config_path);

    run_edihub(&config_path, &["init"]);
    let (stdout, stderr, success) = run_edihub(&config_path, &["import", &seed]);
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Imported 2 tarefas and 2 contratos"));

    let (stdout, stderr, success) = run_edihub(
        &config_path,
        &["search", "projeto alpha revisão", "--projeto", "alpha"],
    );
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("2 of 2 matches"), "stdout={}", stdout);
    assert!(stdout.contains("1. [0.900] contrato"), "stdout={}", stdout);
    assert!(stdout.contains("2. [0.620] tarefa"), "stdout={}", stdout);
}

#[test]
fn test_search_by_kind_and_no_results() {
    let (_tmp, config_path) = setup_test_env();
    let seed = seed_path(&config_path);

    run_edihub(&config_path, &["init"]);
    run_edihub(&config_path, &["import", &seed]);

    let (stdout, _, success) = run_edihub(
        &config_path,
        &["search", "nda com fornecedor", "--tipo", "contratos"],
    );
    assert!(success);
    assert!(stdout.contains("contratante: Globex"), "stdout={}", stdout);
    assert!(!stdout.contains("tarefa #"));

    let (stdout, _, success) = run_edihub(&config_path, &["search", "xyzzy"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_rejects_unknown_kind() {
    let (_tmp, config_path) = setup_test_env();
    run_edihub(&config_path, &["init"]);

    let (_, stderr, success) = run_edihub(&config_path, &["search", "nda", "--tipo", "sprints"]);
    assert!(!success);
    assert!(stderr.contains("sprints"), "stderr={}", stderr);
}

#[test]
fn test_import_rejects_invalid_payload() {
    let (tmp, config_path) = setup_test_env();
    run_edihub(&config_path, &["init"]);

    let bad = tmp.path().join("bad.json");
    fs::write(&bad, r#"{"contratos": [{"titulo": "", "tipo": "nda", "contratante": "Acme"}]}"#)
        .unwrap();

    let (_, stderr, success) = run_edihub(&config_path, &["import", bad.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("contratos[0]"), "stderr={}", stderr);
}
