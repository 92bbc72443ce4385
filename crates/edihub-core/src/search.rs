//! Ranking search over tasks and contracts.
//!
//! Candidates are fetched from a [`Store`] without any server-side text
//! filtering, scored with [`similarity::score`] and, for tasks, blended
//! with business boosts.
//!
//! # Task Scoring
//!
//! ```text
//! base      = score(query, titulo + " " + descricao)
//! composite = base × lexical + project_boost × project + priority_boost × priority
//! ```
//!
//! With the default [`RankingWeights`] that is `0.60 / 0.20 / 0.20`, a
//! `0.20` project boost when the candidate belongs to the requested
//! project, and a priority table of `urgente 0.20, alta 0.15, media 0.10,
//! baixa 0.05`.
//!
//! # Ordering
//!
//! Single-kind searches keep the store's order and truncate to `limit`
//! without re-sorting. Only [`search_all`] sorts, by `similaridade`
//! descending with a stable sort, so tasks precede contracts on ties.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Contract, ContractFilter, Priority, Task, TaskFilter, DEFAULT_LIST_LIMIT};
use crate::similarity;
use crate::store::Store;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_THRESHOLD: f64 = 0.7;

pub const DEFAULT_LEXICAL_WEIGHT: f64 = 0.60;
pub const DEFAULT_PROJECT_WEIGHT: f64 = 0.20;
pub const DEFAULT_PRIORITY_WEIGHT: f64 = 0.20;
pub const DEFAULT_PROJECT_BOOST: f64 = 0.20;
pub const DEFAULT_PRIORITY_BOOST_URGENTE: f64 = 0.20;
pub const DEFAULT_PRIORITY_BOOST_ALTA: f64 = 0.15;
pub const DEFAULT_PRIORITY_BOOST_MEDIA: f64 = 0.10;
pub const DEFAULT_PRIORITY_BOOST_BAIXA: f64 = 0.05;

/// Failures of a search invocation.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query must not be empty")]
    InvalidQuery,
    #[error("invalid kind: '{0}'. Use all, tarefas, or contratos")]
    UnknownKind(String),
    #[error("invalid threshold: {0} (must be in [0.0, 1.0])")]
    InvalidThreshold(f64),
    #[error("invalid limit: must be >= 1")]
    InvalidLimit,
    #[error("candidate store unavailable: {0:#}")]
    Unavailable(#[source] anyhow::Error),
}

impl SearchError {
    /// True for errors caused by the request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SearchError::Unavailable(_))
    }
}

/// Which entity kinds a combined search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    All,
    Tarefas,
    Contratos,
}

impl SearchKind {
    fn includes_tasks(self) -> bool {
        matches!(self, SearchKind::All | SearchKind::Tarefas)
    }

    fn includes_contracts(self) -> bool {
        matches!(self, SearchKind::All | SearchKind::Contratos)
    }
}

impl FromStr for SearchKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SearchKind::All),
            "tarefas" => Ok(SearchKind::Tarefas),
            "contratos" => Ok(SearchKind::Contratos),
            other => Err(SearchError::UnknownKind(other.to_string())),
        }
    }
}

/// Blend weights and boost tables for task ranking.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Weight of the lexical similarity in the composite.
    pub lexical: f64,
    /// Weight of the project boost in the composite.
    pub project: f64,
    /// Weight of the priority boost in the composite.
    pub priority: f64,
    /// Boost granted when the task's project equals the project filter.
    pub project_boost: f64,
    pub priority_urgente: f64,
    pub priority_alta: f64,
    pub priority_media: f64,
    pub priority_baixa: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            lexical: DEFAULT_LEXICAL_WEIGHT,
            project: DEFAULT_PROJECT_WEIGHT,
            priority: DEFAULT_PRIORITY_WEIGHT,
            project_boost: DEFAULT_PROJECT_BOOST,
            priority_urgente: DEFAULT_PRIORITY_BOOST_URGENTE,
            priority_alta: DEFAULT_PRIORITY_BOOST_ALTA,
            priority_media: DEFAULT_PRIORITY_BOOST_MEDIA,
            priority_baixa: DEFAULT_PRIORITY_BOOST_BAIXA,
        }
    }
}

impl RankingWeights {
    /// Boost for a priority tag; unknown or missing priorities get `0.0`.
    pub fn priority_boost(&self, prioridade: Option<&str>) -> f64 {
        match prioridade.and_then(|p| p.parse::<Priority>().ok()) {
            Some(Priority::Urgente) => self.priority_urgente,
            Some(Priority::Alta) => self.priority_alta,
            Some(Priority::Media) => self.priority_media,
            Some(Priority::Baixa) => self.priority_baixa,
            None => 0.0,
        }
    }

    /// All weights paired with their config key, for validation.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("lexical", self.lexical),
            ("project", self.project),
            ("priority", self.priority),
            ("project_boost", self.project_boost),
            ("priority_urgente", self.priority_urgente),
            ("priority_alta", self.priority_alta),
            ("priority_media", self.priority_media),
            ("priority_baixa", self.priority_baixa),
        ]
    }
}

/// Tuning knobs that stay fixed across requests.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub weights: RankingWeights,
    /// Page size used when fetching candidates from the store.
    pub candidate_limit: i64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            candidate_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Bundles the per-request inputs of a search.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub kind: SearchKind,
    pub limit: usize,
    pub threshold: f64,
    /// Project that earns the project boost (tasks only).
    pub project: Option<&'a str>,
    /// Column results must sit in (tasks only).
    pub column: Option<&'a str>,
}

impl<'a> SearchRequest<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            kind: SearchKind::All,
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
            project: None,
            column: None,
        }
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidQuery);
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SearchError::InvalidThreshold(self.threshold));
        }
        if self.limit == 0 {
            return Err(SearchError::InvalidLimit);
        }
        Ok(())
    }
}

// ============ Candidates ============

/// The slice of a task the ranking looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCandidate {
    pub id: i64,
    pub titulo: String,
    pub descricao: Option<String>,
    pub coluna: Option<String>,
    pub prioridade: Option<String>,
    pub projeto: Option<String>,
}

impl From<Task> for TaskCandidate {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            titulo: t.titulo,
            descricao: t.descricao,
            coluna: Some(t.coluna.as_str().to_string()),
            prioridade: Some(t.prioridade.as_str().to_string()),
            projeto: t.projeto,
        }
    }
}

/// The slice of a contract the ranking looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCandidate {
    pub id: i64,
    pub titulo: String,
    pub descricao: Option<String>,
    pub tipo: Option<String>,
    pub contratante: Option<String>,
    pub status: Option<String>,
}

impl From<Contract> for ContractCandidate {
    fn from(c: Contract) -> Self {
        Self {
            id: c.id,
            titulo: c.titulo,
            descricao: c.descricao,
            tipo: Some(c.tipo.as_str().to_string()),
            contratante: Some(c.contratante),
            status: Some(c.status.as_str().to_string()),
        }
    }
}

// ============ Results ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskHit {
    pub id: i64,
    pub titulo: String,
    pub descricao: Option<String>,
    pub coluna: Option<String>,
    pub prioridade: Option<String>,
    pub projeto: Option<String>,
    pub similaridade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractHit {
    pub id: i64,
    pub titulo: String,
    pub tipo_contrato: Option<String>,
    pub contratante: Option<String>,
    pub status: Option<String>,
    pub similaridade: f64,
}

/// One accepted candidate, tagged by kind on the wire (`"tipo"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tipo")]
pub enum ScoredResult {
    #[serde(rename = "tarefa")]
    Tarefa(TaskHit),
    #[serde(rename = "contrato")]
    Contrato(ContractHit),
}

impl ScoredResult {
    pub fn id(&self) -> i64 {
        match self {
            ScoredResult::Tarefa(h) => h.id,
            ScoredResult::Contrato(h) => h.id,
        }
    }

    pub fn titulo(&self) -> &str {
        match self {
            ScoredResult::Tarefa(h) => &h.titulo,
            ScoredResult::Contrato(h) => &h.titulo,
        }
    }

    /// Score rounded to three decimals.
    pub fn similaridade(&self) -> f64 {
        match self {
            ScoredResult::Tarefa(h) => h.similaridade,
            ScoredResult::Contrato(h) => h.similaridade,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            ScoredResult::Tarefa(_) => "tarefa",
            ScoredResult::Contrato(_) => "contrato",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMetadata {
    pub query: String,
    /// Number of merged results before truncation to `limit`.
    pub total: usize,
    pub threshold_usado: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<ScoredResult>,
    pub metadata: SearchMetadata,
}

// ============ Ranking ============

fn scoring_text(titulo: &str, descricao: Option<&str>) -> String {
    format!("{} {}", titulo, descricao.unwrap_or(""))
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Composite score of one task candidate.
pub fn task_score(
    query: &str,
    candidate: &TaskCandidate,
    project: Option<&str>,
    weights: &RankingWeights,
) -> f64 {
    let base = similarity::score(
        query,
        &scoring_text(&candidate.titulo, candidate.descricao.as_deref()),
    );
    let boost_project = match project {
        Some(p) if candidate.projeto.as_deref() == Some(p) => weights.project_boost,
        _ => 0.0,
    };
    let boost_priority = weights.priority_boost(candidate.prioridade.as_deref());

    base * weights.lexical + boost_project * weights.project + boost_priority * weights.priority
}

/// Scores, filters and truncates task candidates, keeping input order.
///
/// The column filter runs after scoring, so excluded tasks never take a
/// slot of the `limit` budget.
pub fn rank_tasks(
    candidates: Vec<TaskCandidate>,
    req: &SearchRequest<'_>,
    weights: &RankingWeights,
) -> Vec<ScoredResult> {
    candidates
        .into_iter()
        .filter_map(|c| {
            let composite = task_score(req.query, &c, req.project, weights);
            if composite < req.threshold {
                return None;
            }
            if let Some(col) = req.column {
                if c.coluna.as_deref() != Some(col) {
                    return None;
                }
            }
            Some(ScoredResult::Tarefa(TaskHit {
                id: c.id,
                titulo: c.titulo,
                descricao: c.descricao,
                coluna: c.coluna,
                prioridade: c.prioridade,
                projeto: c.projeto,
                similaridade: round3(composite),
            }))
        })
        .take(req.limit)
        .collect()
}

/// Scores, filters and truncates contract candidates, keeping input order.
pub fn rank_contracts(
    candidates: Vec<ContractCandidate>,
    req: &SearchRequest<'_>,
) -> Vec<ScoredResult> {
    candidates
        .into_iter()
        .filter_map(|c| {
            let s = similarity::score(
                req.query,
                &scoring_text(&c.titulo, c.descricao.as_deref()),
            );
            if s < req.threshold {
                return None;
            }
            Some(ScoredResult::Contrato(ContractHit {
                id: c.id,
                titulo: c.titulo,
                tipo_contrato: c.tipo,
                contratante: c.contratante,
                status: c.status,
                similaridade: round3(s),
            }))
        })
        .take(req.limit)
        .collect()
}

/// Merges per-kind results: stable sort by `similaridade` desc, then truncate.
pub fn merge_results(
    mut results: Vec<ScoredResult>,
    req: &SearchRequest<'_>,
) -> SearchResponse {
    results.sort_by(|a, b| {
        b.similaridade()
            .partial_cmp(&a.similaridade())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let total = results.len();
    results.truncate(req.limit);

    SearchResponse {
        success: true,
        results,
        metadata: SearchMetadata {
            query: req.query.to_string(),
            total,
            threshold_usado: req.threshold,
        },
    }
}

// ============ Store-backed entry points ============

/// Task-only search against a [`Store`].
pub async fn search_tasks<S: Store + ?Sized>(
    store: &S,
    req: &SearchRequest<'_>,
    params: &SearchParams,
) -> Result<Vec<ScoredResult>, SearchError> {
    req.validate()?;

    let filter = TaskFilter {
        limit: params.candidate_limit,
        ..Default::default()
    };
    let tasks = store
        .list_tasks(&filter)
        .await
        .map_err(SearchError::Unavailable)?;
    let considered = tasks.len();

    let candidates = tasks.into_iter().map(TaskCandidate::from).collect();
    let results = rank_tasks(candidates, req, &params.weights);

    tracing::debug!(
        query = req.query,
        considered,
        accepted = results.len(),
        "task search"
    );
    Ok(results)
}

/// Contract-only search against a [`Store`].
pub async fn search_contracts<S: Store + ?Sized>(
    store: &S,
    req: &SearchRequest<'_>,
    params: &SearchParams,
) -> Result<Vec<ScoredResult>, SearchError> {
    req.validate()?;

    let filter = ContractFilter {
        limit: params.candidate_limit,
        ..Default::default()
    };
    let contracts = store
        .list_contracts(&filter)
        .await
        .map_err(SearchError::Unavailable)?;
    let considered = contracts.len();

    let candidates = contracts.into_iter().map(ContractCandidate::from).collect();
    let results = rank_contracts(candidates, req);

    tracing::debug!(
        query = req.query,
        considered,
        accepted = results.len(),
        "contract search"
    );
    Ok(results)
}

/// Combined search across the kinds selected by `req.kind`.
pub async fn search_all<S: Store + ?Sized>(
    store: &S,
    req: &SearchRequest<'_>,
    params: &SearchParams,
) -> Result<SearchResponse, SearchError> {
    req.validate()?;

    let mut results = Vec::new();
    if req.kind.includes_tasks() {
        results.extend(search_tasks(store, req, params).await?);
    }
    if req.kind.includes_contracts() {
        results.extend(search_contracts(store, req, params).await?);
    }

    Ok(merge_results(results, req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Column, ContractStatus, ContractType, ContractUpdate, NewContract, NewTask, Priority,
        TaskUpdate,
    };
    use crate::store::memory::InMemoryStore;

    fn task(id: i64, titulo: &str, prioridade: &str, projeto: &str) -> TaskCandidate {
        TaskCandidate {
            id,
            titulo: titulo.to_string(),
            descricao: None,
            coluna: Some("todo".to_string()),
            prioridade: Some(prioridade.to_string()),
            projeto: Some(projeto.to_string()),
        }
    }

    fn contract(id: i64, titulo: &str, descricao: Option<&str>) -> ContractCandidate {
        ContractCandidate {
            id,
            titulo: titulo.to_string(),
            descricao: descricao.map(String::from),
            tipo: Some("servico".to_string()),
            contratante: Some("Acme".to_string()),
            status: Some("active".to_string()),
        }
    }

    fn req(query: &str, threshold: f64) -> SearchRequest<'_> {
        SearchRequest {
            threshold,
            ..SearchRequest::new(query)
        }
    }

    #[test]
    fn test_composite_project_and_priority_boost() {
        let w = RankingWeights::default();
        let a = task(1, "fix urgent bug", "urgente", "Alpha");
        let b = task(2, "fix urgent bug", "baixa", "Beta");

        let sa = task_score("fix urgent bug", &a, Some("Alpha"), &w);
        let sb = task_score("fix urgent bug", &b, Some("Alpha"), &w);
        assert!((sa - 0.68).abs() < 1e-9, "got {}", sa);
        assert!((sb - 0.61).abs() < 1e-9, "got {}", sb);
        assert!((sa - sb - 0.07).abs() < 1e-9);

        let r = SearchRequest {
            project: Some("Alpha"),
            ..req("fix urgent bug", 0.5)
        };
        let ranked = rank_tasks(vec![b, a], &r, &w);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].similaridade(), 0.61);
        assert_eq!(ranked[1].similaridade(), 0.68);

        let merged = merge_results(ranked, &r);
        let ids: Vec<i64> = merged.results.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_unknown_priority_gets_no_boost() {
        let w = RankingWeights::default();
        assert_eq!(w.priority_boost(Some("critica")), 0.0);
        assert_eq!(w.priority_boost(None), 0.0);
        assert_eq!(w.priority_boost(Some("alta")), 0.15);
    }

    #[test]
    fn test_default_threshold_excludes_tasks_with_default_weights() {
        // max composite = 0.60 + 0.04 + 0.04 = 0.68 < 0.7
        let r = SearchRequest {
            project: Some("Alpha"),
            ..SearchRequest::new("fix urgent bug")
        };
        let ranked = rank_tasks(
            vec![task(1, "fix urgent bug", "urgente", "Alpha")],
            &r,
            &RankingWeights::default(),
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_task_search_keeps_candidate_order() {
        let w = RankingWeights::default();
        let candidates = vec![
            task(1, "deploy api", "baixa", "X"),
            task(2, "deploy api now", "urgente", "X"),
            task(3, "deploy api", "urgente", "X"),
        ];
        let r = SearchRequest {
            limit: 2,
            ..req("deploy api", 0.3)
        };
        let ranked = rank_tasks(candidates, &r, &w);
        let ids: Vec<i64> = ranked.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_column_filter_applied_before_truncation() {
        let w = RankingWeights::default();
        let mut done = task(1, "write docs", "alta", "X");
        done.coluna = Some("done".to_string());
        let todo = task(2, "write docs", "alta", "X");

        let r = SearchRequest {
            limit: 1,
            column: Some("todo"),
            ..req("write docs", 0.5)
        };
        let ranked = rank_tasks(vec![done, todo], &r, &w);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id(), 2);
    }

    #[test]
    fn test_missing_description_treated_as_empty() {
        let c = contract(1, "projeto alpha revisão", None);
        let ranked = rank_contracts(vec![c], &req("projeto alpha revisão", 0.7));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].similaridade(), 1.0);
    }

    #[test]
    fn test_contract_worked_example_accepted() {
        let c = contract(7, "revisão do", Some("projeto alpha hoje"));
        let ranked = rank_contracts(vec![c], &req("projeto alpha revisão", 0.7));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].similaridade(), 0.9);
        match &ranked[0] {
            ScoredResult::Contrato(h) => {
                assert_eq!(h.tipo_contrato.as_deref(), Some("servico"));
                assert_eq!(h.contratante.as_deref(), Some("Acme"));
            }
            other => panic!("expected contract hit, got {:?}", other),
        }
    }

    #[test]
    fn test_threshold_monotonic() {
        let w = RankingWeights::default();
        let tasks = vec![
            task(1, "a b c", "urgente", "P"),
            task(2, "a b", "alta", "P"),
            task(3, "a", "media", "Q"),
            task(4, "z", "baixa", "Q"),
        ];
        let contracts = vec![
            contract(1, "a b c", None),
            contract(2, "a x y", None),
            contract(3, "q", None),
        ];
        let mut prev_tasks = usize::MAX;
        let mut prev_contracts = usize::MAX;
        for step in 0..=10 {
            let r = SearchRequest {
                project: Some("P"),
                ..req("a b c", step as f64 / 10.0)
            };
            let nt = rank_tasks(tasks.clone(), &r, &w).len();
            let nc = rank_contracts(contracts.clone(), &r).len();
            assert!(nt <= prev_tasks);
            assert!(nc <= prev_contracts);
            prev_tasks = nt;
            prev_contracts = nc;
        }
    }

    #[test]
    fn test_merge_limit_keeps_highest() {
        let t = ScoredResult::Tarefa(TaskHit {
            id: 1,
            titulo: "t".into(),
            descricao: None,
            coluna: None,
            prioridade: None,
            projeto: None,
            similaridade: 0.9,
        });
        let c = ScoredResult::Contrato(ContractHit {
            id: 2,
            titulo: "c".into(),
            tipo_contrato: None,
            contratante: None,
            status: None,
            similaridade: 0.85,
        });
        let r = SearchRequest {
            limit: 1,
            ..req("q", 0.7)
        };
        let resp = merge_results(vec![c, t], &r);
        assert_eq!(resp.metadata.total, 2);
        assert_eq!(resp.results.len(), 1);
        assert_eq!(resp.results[0].kind_label(), "tarefa");
    }

    #[test]
    fn test_merge_ties_keep_tasks_first() {
        let t = ScoredResult::Tarefa(TaskHit {
            id: 1,
            titulo: "t".into(),
            descricao: None,
            coluna: None,
            prioridade: None,
            projeto: None,
            similaridade: 0.8,
        });
        let c = ScoredResult::Contrato(ContractHit {
            id: 1,
            titulo: "c".into(),
            tipo_contrato: None,
            contratante: None,
            status: None,
            similaridade: 0.8,
        });
        let resp = merge_results(vec![t, c], &req("q", 0.0));
        assert_eq!(resp.results[0].kind_label(), "tarefa");
        assert_eq!(resp.results[1].kind_label(), "contrato");
    }

    #[test]
    fn test_scored_result_wire_shape() {
        let hit = ScoredResult::Contrato(ContractHit {
            id: 3,
            titulo: "NDA".into(),
            tipo_contrato: Some("nda".into()),
            contratante: Some("Acme".into()),
            status: Some("draft".into()),
            similaridade: 0.75,
        });
        let v = serde_json::to_value(&hit).unwrap();
        assert_eq!(v["tipo"], "contrato");
        assert_eq!(v["tipo_contrato"], "nda");
        assert_eq!(v["similaridade"], 0.75);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("all".parse::<SearchKind>().unwrap(), SearchKind::All);
        assert_eq!("contratos".parse::<SearchKind>().unwrap(), SearchKind::Contratos);
        assert!(matches!(
            "usuarios".parse::<SearchKind>(),
            Err(SearchError::UnknownKind(k)) if k == "usuarios"
        ));
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.68000000001), 0.68);
        assert_eq!(round3(0.12345), 0.123);
    }

    // ============ Store-backed ============

    async fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .create_task(&NewTask {
                titulo: "revisão do projeto alpha hoje".into(),
                prioridade: Priority::Urgente,
                projeto: Some("Alpha".into()),
                coluna: Column::Review,
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .create_contract(&NewContract {
                titulo: "revisão do".into(),
                tipo: ContractType::Parceria,
                contratante: "Beta SA".into(),
                contratado: None,
                valor: None,
                periodicidade: None,
                status: ContractStatus::Active,
                data_inicio: None,
                data_fim: None,
                descricao: Some("projeto alpha hoje".into()),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_search_all_empty_store_is_success() {
        let store = InMemoryStore::new();
        let resp = search_all(&store, &SearchRequest::new("anything"), &SearchParams::default())
            .await
            .unwrap();
        assert!(resp.success);
        assert!(resp.results.is_empty());
        assert_eq!(resp.metadata.total, 0);
        assert_eq!(resp.metadata.threshold_usado, 0.7);
    }

    #[tokio::test]
    async fn test_search_all_merges_kinds() {
        let store = seeded_store().await;
        let r = SearchRequest {
            project: Some("Alpha"),
            ..req("projeto alpha revisão", 0.5)
        };
        let resp = search_all(&store, &r, &SearchParams::default()).await.unwrap();
        // contract 0.9, task 0.9 * 0.6 + 0.04 + 0.04 = 0.62
        assert_eq!(resp.metadata.total, 2);
        assert_eq!(resp.results[0].kind_label(), "contrato");
        assert_eq!(resp.results[0].similaridade(), 0.9);
        assert_eq!(resp.results[1].similaridade(), 0.62);
    }

    #[tokio::test]
    async fn test_search_all_respects_kind() {
        let store = seeded_store().await;
        let r = SearchRequest {
            kind: SearchKind::Tarefas,
            ..req("projeto alpha revisão", 0.5)
        };
        let resp = search_all(&store, &r, &SearchParams::default()).await.unwrap();
        assert!(resp.results.iter().all(|r| r.kind_label() == "tarefa"));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let store = seeded_store().await;
        let err = search_all(&store, &SearchRequest::new("  "), &SearchParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_invalid_threshold_and_limit_rejected() {
        let store = InMemoryStore::new();
        let r = req("q", 1.5);
        assert!(matches!(
            search_contracts(&store, &r, &SearchParams::default()).await,
            Err(SearchError::InvalidThreshold(_))
        ));
        let r = SearchRequest {
            limit: 0,
            ..req("q", 0.5)
        };
        assert!(matches!(
            search_tasks(&store, &r, &SearchParams::default()).await,
            Err(SearchError::InvalidLimit)
        ));
    }

    #[tokio::test]
    async fn test_candidate_limit_bounds_fetch() {
        let store = InMemoryStore::new();
        for _ in 0..3 {
            store
                .create_contract(&NewContract {
                    titulo: "nda acme".into(),
                    tipo: ContractType::Nda,
                    contratante: "Acme".into(),
                    contratado: None,
                    valor: None,
                    periodicidade: None,
                    status: ContractStatus::Draft,
                    data_inicio: None,
                    data_fim: None,
                    descricao: None,
                })
                .await
                .unwrap();
        }
        let params = SearchParams {
            candidate_limit: 2,
            ..Default::default()
        };
        let hits = search_contracts(&store, &req("nda acme", 0.7), &params)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    /// Store whose backend is gone: every call fails.
    struct UnreachableStore;

    #[async_trait::async_trait]
    impl Store for UnreachableStore {
        async fn create_task(&self, _: &NewTask) -> anyhow::Result<Task> {
            anyhow::bail!("connection refused")
        }
        async fn get_task(&self, _: i64) -> anyhow::Result<Option<Task>> {
            anyhow::bail!("connection refused")
        }
        async fn list_tasks(&self, _: &TaskFilter) -> anyhow::Result<Vec<Task>> {
            anyhow::bail!("connection refused")
        }
        async fn update_task(
            &self,
            _: i64,
            _: &TaskUpdate,
        ) -> anyhow::Result<Option<Task>> {
            anyhow::bail!("connection refused")
        }
        async fn delete_task(&self, _: i64) -> anyhow::Result<bool> {
            anyhow::bail!("connection refused")
        }
        async fn move_task(&self, _: i64, _: Column) -> anyhow::Result<Option<Task>> {
            anyhow::bail!("connection refused")
        }
        async fn create_contract(&self, _: &NewContract) -> anyhow::Result<Contract> {
            anyhow::bail!("connection refused")
        }
        async fn get_contract(&self, _: i64) -> anyhow::Result<Option<Contract>> {
            anyhow::bail!("connection refused")
        }
        async fn list_contracts(
            &self,
            _: &ContractFilter,
        ) -> anyhow::Result<Vec<Contract>> {
            anyhow::bail!("connection refused")
        }
        async fn update_contract(
            &self,
            _: i64,
            _: &ContractUpdate,
        ) -> anyhow::Result<Option<Contract>> {
            anyhow::bail!("connection refused")
        }
        async fn delete_contract(&self, _: i64) -> anyhow::Result<bool> {
            anyhow::bail!("connection refused")
        }
        async fn contracts_expiring_within(
            &self,
            _: i64,
            _: chrono::DateTime<chrono::Utc>,
        ) -> anyhow::Result<Vec<Contract>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let r = req("nda acme", 0.5);
        let err = search_all(&UnreachableStore, &r, &SearchParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
        assert!(!err.is_client_error());

        let contracts_only = SearchRequest {
            kind: SearchKind::Contratos,
            ..req("nda acme", 0.5)
        };
        assert!(matches!(
            search_all(&UnreachableStore, &contracts_only, &SearchParams::default()).await,
            Err(SearchError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_runs_before_store_access() {
        let err = search_all(&UnreachableStore, &req("   ", 0.5), &SearchParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery));
    }
}
