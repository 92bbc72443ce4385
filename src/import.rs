//! Bulk import of tasks and contracts from a JSON file.
//!
//! ```json
//! {
//!   "tarefas":   [{ "titulo": "Revisar proposta", "prioridade": "alta" }],
//!   "contratos": [{ "titulo": "NDA Acme", "tipo": "nda", "contratante": "Acme" }]
//! }
//! ```
//!
//! Every payload is validated before anything is written, so a bad entry
//! aborts the import without a partial load.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use edihub_core::models::{NewContract, NewTask};
use edihub_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportFile {
    pub tarefas: Vec<NewTask>,
    pub contratos: Vec<NewContract>,
}

/// Counts of records created by an import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub tarefas: usize,
    pub contratos: usize,
}

pub fn read_import_file(path: &Path) -> Result<ImportFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let file: ImportFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file: {}", path.display()))?;

    for (i, task) in file.tarefas.iter().enumerate() {
        task.validate()
            .with_context(|| format!("tarefas[{}] is invalid", i))?;
    }
    for (i, contract) in file.contratos.iter().enumerate() {
        contract
            .validate()
            .with_context(|| format!("contratos[{}] is invalid", i))?;
    }

    Ok(file)
}

/// Writes every payload in `file` to `store`.
pub async fn import_into<S: Store + ?Sized>(store: &S, file: &ImportFile) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for task in &file.tarefas {
        store.create_task(task).await?;
        summary.tarefas += 1;
    }
    for contract in &file.contratos {
        store.create_contract(contract).await?;
        summary.contratos += 1;
    }
    tracing::info!(
        tarefas = summary.tarefas,
        contratos = summary.contratos,
        "import complete"
    );
    Ok(summary)
}

/// CLI entry point: loads `path` into the configured database.
pub async fn run_import(config: &Config, path: &Path) -> Result<()> {
    let file = read_import_file(path)?;

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let summary = import_into(&store, &file).await;
    pool.close().await;
    let summary = summary?;

    println!(
        "Imported {} tarefas and {} contratos.",
        summary.tarefas, summary.contratos
    );
    Ok(())
}
