//! Application-level entry points for similarity search.
//!
//! The ranking algorithm lives in `edihub_core::search` and runs against
//! any [`Store`](edihub_core::store::Store). This wrapper resolves request
//! defaults from [`SearchConfig`], opens the SQLite store and formats
//! results for the CLI.

use anyhow::Result;

pub use edihub_core::search::{
    search_all, search_contracts, search_tasks, ScoredResult, SearchError, SearchKind,
    SearchParams, SearchRequest, SearchResponse,
};

use crate::config::{Config, SearchConfig};
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Raw search inputs as they arrive from the CLI or HTTP query string.
///
/// A missing `query` deserializes as empty so it is rejected by request
/// validation like a blank one.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SearchArgs {
    #[serde(default)]
    pub query: String,
    pub tipo: Option<String>,
    pub limite: Option<usize>,
    pub threshold: Option<f64>,
    pub projeto: Option<String>,
    pub coluna: Option<String>,
}

impl SearchArgs {
    /// Builds a core request, filling unset fields from config.
    ///
    /// An unrecognized `tipo` is rejected with [`SearchError::UnknownKind`].
    pub fn to_request<'a>(
        &'a self,
        defaults: &SearchConfig,
    ) -> Result<SearchRequest<'a>, SearchError> {
        let kind = match self.tipo.as_deref() {
            Some(t) => t.parse::<SearchKind>()?,
            None => SearchKind::All,
        };
        Ok(self.request_for(kind, defaults))
    }

    /// Like [`to_request`](Self::to_request) with a fixed kind; `tipo` is
    /// not consulted.
    pub fn request_for<'a>(
        &'a self,
        kind: SearchKind,
        defaults: &SearchConfig,
    ) -> SearchRequest<'a> {
        SearchRequest {
            query: &self.query,
            kind,
            limit: self.limite.unwrap_or(defaults.default_limit),
            threshold: self.threshold.unwrap_or(defaults.default_threshold),
            project: self.projeto.as_deref(),
            column: self.coluna.as_deref(),
        }
    }
}

/// CLI entry point: runs a combined search and prints results to stdout.
pub async fn run_search(config: &Config, args: &SearchArgs) -> Result<()> {
    let req = args.to_request(&config.search)?;

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let response = search_all(&store, &req, &config.search.params()).await;
    pool.close().await;
    let response = response?;

    if response.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!(
        "{} of {} matches (threshold {:.2})",
        response.results.len(),
        response.metadata.total,
        response.metadata.threshold_usado
    );
    println!();

    for (i, result) in response.results.iter().enumerate() {
        println!(
            "{}. [{:.3}] {} #{} / {}",
            i + 1,
            result.similaridade(),
            result.kind_label(),
            result.id(),
            result.titulo()
        );
        match result {
            ScoredResult::Tarefa(hit) => {
                println!(
                    "    coluna: {}  prioridade: {}",
                    hit.coluna.as_deref().unwrap_or("-"),
                    hit.prioridade.as_deref().unwrap_or("-")
                );
                if let Some(ref projeto) = hit.projeto {
                    println!("    projeto: {}", projeto);
                }
            }
            ScoredResult::Contrato(hit) => {
                println!(
                    "    tipo: {}  status: {}",
                    hit.tipo_contrato.as_deref().unwrap_or("-"),
                    hit.status.as_deref().unwrap_or("-")
                );
                if let Some(ref contratante) = hit.contratante {
                    println!("    contratante: {}", contratante);
                }
            }
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_fall_back_to_config_defaults() {
        let defaults = SearchConfig {
            default_limit: 3,
            default_threshold: 0.4,
            ..Default::default()
        };
        let args = SearchArgs {
            query: "nda".into(),
            ..Default::default()
        };
        let req = args.to_request(&defaults).unwrap();
        assert_eq!(req.kind, SearchKind::All);
        assert_eq!(req.limit, 3);
        assert_eq!(req.threshold, 0.4);
    }

    #[test]
    fn test_unknown_tipo_rejected() {
        let args = SearchArgs {
            query: "nda".into(),
            tipo: Some("sprints".into()),
            ..Default::default()
        };
        let err = args.to_request(&SearchConfig::default()).unwrap_err();
        assert!(matches!(err, SearchError::UnknownKind(ref k) if k == "sprints"));
    }

    #[test]
    fn test_fixed_kind_ignores_tipo() {
        let args = SearchArgs {
            query: "nda".into(),
            tipo: Some("x".into()),
            ..Default::default()
        };
        let req = args.request_for(SearchKind::Contratos, &SearchConfig::default());
        assert_eq!(req.kind, SearchKind::Contratos);
    }

    #[test]
    fn test_missing_query_deserializes_empty() {
        let args: SearchArgs = serde_json::from_str(r#"{"tipo": "tarefas"}"#).unwrap();
        assert!(args.query.is_empty());
        assert!(matches!(
            args.to_request(&SearchConfig::default()).map(|r| r.kind),
            Ok(SearchKind::Tarefas)
        ));
    }
}
