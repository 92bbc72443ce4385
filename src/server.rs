//! HTTP API server.
//!
//! Exposes similarity search plus management of tasks, contracts,
//! projects, tags, sprints and transactions as a JSON HTTP API. Search
//! endpoints read their parameters from the query string; create and
//! update endpoints take JSON bodies.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/search` | Combined task + contract search |
//! | `POST` | `/search/tarefas` | Task-only search |
//! | `POST` | `/search/contratos` | Contract-only search |
//! | `GET` / `POST` | `/tarefas` | List / create tasks |
//! | `GET` / `PATCH` / `DELETE` | `/tarefas/{id}` | Fetch / update / delete a task |
//! | `POST` | `/tarefas/{id}/mover?coluna=` | Move a task to another column |
//! | `GET` / `POST` | `/contratos` | List / create contracts |
//! | `GET` / `PATCH` / `DELETE` | `/contratos/{id}` | Fetch / update / delete a contract |
//! | `GET`  | `/contratos/vencer/{dias}` | Active contracts ending within `dias` days |
//! | `GET` / `POST` | `/projetos` | List (newest first) / create projects |
//! | `GET` / `PATCH` / `DELETE` | `/projetos/{id}` | Fetch / update / delete a project |
//! | `GET` / `POST` | `/tags` | List (by name) / create tags |
//! | `GET` / `PATCH` / `DELETE` | `/tags/{id}` | Fetch / update / delete a tag |
//! | `GET` / `POST` | `/sprints` | List (by `ordem`) / create sprints |
//! | `GET`  | `/sprints/ativa` | The active sprint |
//! | `GET` / `PATCH` / `DELETE` | `/sprints/{id}` | Fetch / update / delete a sprint |
//! | `POST` | `/sprints/{id}/iniciar` | Start a sprint |
//! | `POST` | `/sprints/{id}/concluir?mover_tarefas=` | Complete a sprint |
//! | `GET` / `POST` | `/transacoes` | List / create transactions |
//! | `GET` / `PATCH` / `DELETE` | `/transacoes/{id}` | Fetch / update / delete a transaction |
//! | `GET`  | `/transacoes/resumo/mensal?ano=&mes=` | Paid totals for one month |
//! | `GET`  | `/transacoes/resumo/projetos` | Totals per project |
//! | `GET`  | `/transacoes/resumo/categorias?ano=&mes=` | Paid totals per category for one month |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `unavailable` (503),
//! `internal` (500). A search with no matches is a `200` with an empty list.
//! Malformed query strings, paths and JSON bodies are `bad_request` too.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use edihub_core::finance::{
    self, CategorySummary, MonthlySummary, NewTransaction, ProjectSummary, Transaction,
    TransactionFilter, TransactionStatus, TransactionUpdate,
};
use edihub_core::models::{
    Column, Contract, ContractFilter, ContractUpdate, NewContract, NewProject, NewSprint, NewTag,
    NewTask, Project, ProjectFilter, ProjectUpdate, Sprint, SprintFilter, SprintUpdate, Tag,
    TagFilter, TagUpdate, Task, TaskFilter, TaskUpdate, ValidationError,
};
use edihub_core::planning::{self, SprintCompletion};
use edihub_core::store::{
    Backend, ProjectStore, SprintStore, Store, TagStore, TransactionStore,
};

use crate::config::{Config, SearchConfig};
use crate::db;
use crate::migrate;
use crate::search::{
    search_all, search_contracts, search_tasks, ScoredResult, SearchArgs, SearchError,
    SearchKind, SearchResponse,
};
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Backend>,
    search: Arc<SearchConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Backend>, search: SearchConfig) -> Self {
        Self {
            store,
            search: Arc::new(search),
        }
    }
}

/// Starts the HTTP server against the configured SQLite database.
///
/// Applies the schema on startup, then serves until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let store: Arc<dyn Backend> = Arc::new(SqliteStore::new(pool));
    run_server_with_store(config, store).await
}

/// Starts the HTTP server on `[server].bind` with a caller-supplied store.
pub async fn run_server_with_store(
    config: &Config,
    store: Arc<dyn Backend>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(AppState::new(store, config.search.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, "server listening");
    println!("EdiHub API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the full route table over `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/search", post(handle_search))
        .route("/search/tarefas", post(handle_search_tasks))
        .route("/search/contratos", post(handle_search_contracts))
        .route("/tarefas", get(handle_list_tasks).post(handle_create_task))
        .route(
            "/tarefas/{id}",
            get(handle_get_task)
                .patch(handle_update_task)
                .delete(handle_delete_task),
        )
        .route("/tarefas/{id}/mover", post(handle_move_task))
        .route(
            "/contratos",
            get(handle_list_contracts).post(handle_create_contract),
        )
        .route(
            "/contratos/{id}",
            get(handle_get_contract)
                .patch(handle_update_contract)
                .delete(handle_delete_contract),
        )
        .route("/contratos/vencer/{dias}", get(handle_expiring_contracts))
        .route(
            "/projetos",
            get(handle_list_projects).post(handle_create_project),
        )
        .route(
            "/projetos/{id}",
            get(handle_get_project)
                .patch(handle_update_project)
                .delete(handle_delete_project),
        )
        .route("/tags", get(handle_list_tags).post(handle_create_tag))
        .route(
            "/tags/{id}",
            get(handle_get_tag)
                .patch(handle_update_tag)
                .delete(handle_delete_tag),
        )
        .route("/sprints", get(handle_list_sprints).post(handle_create_sprint))
        .route("/sprints/ativa", get(handle_active_sprint))
        .route(
            "/sprints/{id}",
            get(handle_get_sprint)
                .patch(handle_update_sprint)
                .delete(handle_delete_sprint),
        )
        .route("/sprints/{id}/iniciar", post(handle_start_sprint))
        .route("/sprints/{id}/concluir", post(handle_complete_sprint))
        .route(
            "/transacoes",
            get(handle_list_transactions).post(handle_create_transaction),
        )
        .route(
            "/transacoes/{id}",
            get(handle_get_transaction)
                .patch(handle_update_transaction)
                .delete(handle_delete_transaction),
        )
        .route("/transacoes/resumo/mensal", get(handle_monthly_summary))
        .route("/transacoes/resumo/projetos", get(handle_project_summary))
        .route("/transacoes/resumo/categorias", get(handle_category_summary))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, code = self.code, "{}", self.message);
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        if err.is_client_error() {
            bad_request(err.to_string())
        } else {
            AppError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "unavailable",
                message: err.to_string(),
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        bad_request(err.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: format!("{:#}", err),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// Extractors are taken as `Result`s so rejections reach the client in the
// JSON error shape instead of axum's plain-text body.
type QueryArgs<T> = Result<Query<T>, QueryRejection>;
type PathId = Result<Path<i64>, PathRejection>;
type JsonBody<T> = Result<Json<T>, JsonRejection>;

// ============ POST /search* ============

async fn handle_search(
    State(state): State<AppState>,
    query: QueryArgs<SearchArgs>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(args) = query?;
    let req = args.to_request(&state.search)?;
    let response = search_all(state.store.as_ref(), &req, &state.search.params()).await?;
    Ok(Json(response))
}

/// Single-kind endpoints ignore `tipo`; the path already names the kind.
async fn handle_search_tasks(
    State(state): State<AppState>,
    query: QueryArgs<SearchArgs>,
) -> Result<Json<Vec<ScoredResult>>, AppError> {
    let Query(args) = query?;
    let req = args.request_for(SearchKind::Tarefas, &state.search);
    let results = search_tasks(state.store.as_ref(), &req, &state.search.params()).await?;
    Ok(Json(results))
}

async fn handle_search_contracts(
    State(state): State<AppState>,
    query: QueryArgs<SearchArgs>,
) -> Result<Json<Vec<ScoredResult>>, AppError> {
    let Query(args) = query?;
    let req = args.request_for(SearchKind::Contratos, &state.search);
    let results = search_contracts(state.store.as_ref(), &req, &state.search.params()).await?;
    Ok(Json(results))
}

// ============ /tarefas ============

async fn handle_list_tasks(
    State(state): State<AppState>,
    query: QueryArgs<TaskFilter>,
) -> Result<Json<Vec<Task>>, AppError> {
    let Query(filter) = query?;
    Ok(Json(state.store.list_tasks(&filter).await?))
}

async fn handle_create_task(
    State(state): State<AppState>,
    body: JsonBody<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let Json(task) = body?;
    task.validate()?;
    let created = state.store.create_task(&task).await?;
    tracing::info!(id = created.id, "task created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_get_task(
    State(state): State<AppState>,
    path: PathId,
) -> Result<Json<Task>, AppError> {
    let Path(id) = path?;
    state
        .store
        .get_task(id)
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

async fn handle_update_task(
    State(state): State<AppState>,
    path: PathId,
    body: JsonBody<TaskUpdate>,
) -> Result<Json<Task>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;
    update.validate()?;
    state
        .store
        .update_task(id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

async fn handle_delete_task(
    State(state): State<AppState>,
    path: PathId,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    if state.store.delete_task(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(task_not_found(id))
    }
}

#[derive(Deserialize)]
struct MoveParams {
    coluna: String,
}

async fn handle_move_task(
    State(state): State<AppState>,
    path: PathId,
    query: QueryArgs<MoveParams>,
) -> Result<Json<Task>, AppError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let coluna: Column = params.coluna.parse()?;
    state
        .store
        .move_task(id, coluna)
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

fn task_not_found(id: i64) -> AppError {
    not_found(format!("tarefa {} not found", id))
}

// ============ /contratos ============

async fn handle_list_contracts(
    State(state): State<AppState>,
    query: QueryArgs<ContractFilter>,
) -> Result<Json<Vec<Contract>>, AppError> {
    let Query(filter) = query?;
    Ok(Json(state.store.list_contracts(&filter).await?))
}

async fn handle_create_contract(
    State(state): State<AppState>,
    body: JsonBody<NewContract>,
) -> Result<(StatusCode, Json<Contract>), AppError> {
    let Json(contract) = body?;
    contract.validate()?;
    let created = state.store.create_contract(&contract).await?;
    tracing::info!(id = created.id, "contract created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_get_contract(
    State(state): State<AppState>,
    path: PathId,
) -> Result<Json<Contract>, AppError> {
    let Path(id) = path?;
    state
        .store
        .get_contract(id)
        .await?
        .map(Json)
        .ok_or_else(|| contract_not_found(id))
}

async fn handle_update_contract(
    State(state): State<AppState>,
    path: PathId,
    body: JsonBody<ContractUpdate>,
) -> Result<Json<Contract>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;
    update.validate()?;
    state
        .store
        .update_contract(id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| contract_not_found(id))
}

async fn handle_delete_contract(
    State(state): State<AppState>,
    path: PathId,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    if state.store.delete_contract(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(contract_not_found(id))
    }
}

async fn handle_expiring_contracts(
    State(state): State<AppState>,
    path: PathId,
) -> Result<Json<Vec<Contract>>, AppError> {
    let Path(dias) = path?;
    if dias < 0 {
        return Err(bad_request("dias must be >= 0"));
    }
    let now = Utc::now();
    if Duration::try_days(dias)
        .and_then(|window| now.checked_add_signed(window))
        .is_none()
    {
        return Err(bad_request(format!("dias {} is out of range", dias)));
    }
    let contracts = state.store.contracts_expiring_within(dias, now).await?;
    Ok(Json(contracts))
}

fn contract_not_found(id: i64) -> AppError {
    not_found(format!("contrato {} not found", id))
}

// ============ /projetos ============

async fn handle_list_projects(
    State(state): State<AppState>,
    query: QueryArgs<ProjectFilter>,
) -> Result<Json<Vec<Project>>, AppError> {
    let Query(filter) = query?;
    Ok(Json(state.store.list_projects(&filter).await?))
}

async fn handle_create_project(
    State(state): State<AppState>,
    body: JsonBody<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let Json(project) = body?;
    project.validate()?;
    let created = state.store.create_project(&project).await?;
    tracing::info!(id = created.id, "project created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_get_project(
    State(state): State<AppState>,
    path: PathId,
) -> Result<Json<Project>, AppError> {
    let Path(id) = path?;
    state
        .store
        .get_project(id)
        .await?
        .map(Json)
        .ok_or_else(|| project_not_found(id))
}

async fn handle_update_project(
    State(state): State<AppState>,
    path: PathId,
    body: JsonBody<ProjectUpdate>,
) -> Result<Json<Project>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;
    update.validate()?;
    state
        .store
        .update_project(id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| project_not_found(id))
}

async fn handle_delete_project(
    State(state): State<AppState>,
    path: PathId,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    if state.store.delete_project(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(project_not_found(id))
    }
}

fn project_not_found(id: i64) -> AppError {
    not_found(format!("projeto {} not found", id))
}

// ============ /tags ============

async fn handle_list_tags(
    State(state): State<AppState>,
    query: QueryArgs<TagFilter>,
) -> Result<Json<Vec<Tag>>, AppError> {
    let Query(filter) = query?;
    Ok(Json(state.store.list_tags(&filter).await?))
}

async fn handle_create_tag(
    State(state): State<AppState>,
    body: JsonBody<NewTag>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let Json(tag) = body?;
    tag.validate()?;
    let created = state.store.create_tag(&tag).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_get_tag(
    State(state): State<AppState>,
    path: PathId,
) -> Result<Json<Tag>, AppError> {
    let Path(id) = path?;
    state
        .store
        .get_tag(id)
        .await?
        .map(Json)
        .ok_or_else(|| tag_not_found(id))
}

async fn handle_update_tag(
    State(state): State<AppState>,
    path: PathId,
    body: JsonBody<TagUpdate>,
) -> Result<Json<Tag>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;
    update.validate()?;
    state
        .store
        .update_tag(id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| tag_not_found(id))
}

async fn handle_delete_tag(
    State(state): State<AppState>,
    path: PathId,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    if state.store.delete_tag(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(tag_not_found(id))
    }
}

fn tag_not_found(id: i64) -> AppError {
    not_found(format!("tag {} not found", id))
}

// ============ /sprints ============

async fn handle_list_sprints(
    State(state): State<AppState>,
    query: QueryArgs<SprintFilter>,
) -> Result<Json<Vec<Sprint>>, AppError> {
    let Query(filter) = query?;
    Ok(Json(state.store.list_sprints(&filter).await?))
}

async fn handle_create_sprint(
    State(state): State<AppState>,
    body: JsonBody<NewSprint>,
) -> Result<(StatusCode, Json<Sprint>), AppError> {
    let Json(sprint) = body?;
    sprint.validate()?;
    let created = state.store.create_sprint(&sprint).await?;
    tracing::info!(id = created.id, "sprint created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_active_sprint(State(state): State<AppState>) -> Result<Json<Sprint>, AppError> {
    planning::active_sprint(state.store.as_ref())
        .await?
        .map(Json)
        .ok_or_else(|| not_found("no active sprint"))
}

async fn handle_get_sprint(
    State(state): State<AppState>,
    path: PathId,
) -> Result<Json<Sprint>, AppError> {
    let Path(id) = path?;
    state
        .store
        .get_sprint(id)
        .await?
        .map(Json)
        .ok_or_else(|| sprint_not_found(id))
}

async fn handle_update_sprint(
    State(state): State<AppState>,
    path: PathId,
    body: JsonBody<SprintUpdate>,
) -> Result<Json<Sprint>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;
    update.validate()?;
    state
        .store
        .update_sprint(id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| sprint_not_found(id))
}

async fn handle_delete_sprint(
    State(state): State<AppState>,
    path: PathId,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    if state.store.delete_sprint(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(sprint_not_found(id))
    }
}

async fn handle_start_sprint(
    State(state): State<AppState>,
    path: PathId,
) -> Result<Json<Sprint>, AppError> {
    let Path(id) = path?;
    planning::start_sprint(state.store.as_ref(), id)
        .await?
        .map(Json)
        .ok_or_else(|| sprint_not_found(id))
}

#[derive(Deserialize)]
struct CompleteParams {
    #[serde(default = "default_move_tasks")]
    mover_tarefas: bool,
}

fn default_move_tasks() -> bool {
    true
}

async fn handle_complete_sprint(
    State(state): State<AppState>,
    path: PathId,
    query: QueryArgs<CompleteParams>,
) -> Result<Json<SprintCompletion>, AppError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let today = Utc::now().date_naive();
    planning::complete_sprint(state.store.as_ref(), id, params.mover_tarefas, today)
        .await?
        .map(Json)
        .ok_or_else(|| sprint_not_found(id))
}

fn sprint_not_found(id: i64) -> AppError {
    not_found(format!("sprint {} not found", id))
}

// ============ /transacoes ============

async fn handle_list_transactions(
    State(state): State<AppState>,
    query: QueryArgs<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let Query(filter) = query?;
    Ok(Json(state.store.list_transactions(&filter).await?))
}

async fn handle_create_transaction(
    State(state): State<AppState>,
    body: JsonBody<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let Json(tx) = body?;
    tx.validate()?;
    let created = state.store.create_transaction(&tx).await?;
    tracing::info!(id = created.id, tipo = %created.tipo, "transaction created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_get_transaction(
    State(state): State<AppState>,
    path: PathId,
) -> Result<Json<Transaction>, AppError> {
    let Path(id) = path?;
    state
        .store
        .get_transaction(id)
        .await?
        .map(Json)
        .ok_or_else(|| transaction_not_found(id))
}

async fn handle_update_transaction(
    State(state): State<AppState>,
    path: PathId,
    body: JsonBody<TransactionUpdate>,
) -> Result<Json<Transaction>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;
    update.validate()?;
    state
        .store
        .update_transaction(id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| transaction_not_found(id))
}

async fn handle_delete_transaction(
    State(state): State<AppState>,
    path: PathId,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    if state.store.delete_transaction(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(transaction_not_found(id))
    }
}

#[derive(Deserialize)]
struct MonthParams {
    ano: i32,
    mes: u32,
}

/// Paid transactions, the only ones the monthly reports count.
async fn paid_transactions(state: &AppState) -> Result<Vec<Transaction>, AppError> {
    let filter = TransactionFilter {
        status: Some(TransactionStatus::Pago),
        ..TransactionFilter::unbounded()
    };
    Ok(state.store.list_transactions(&filter).await?)
}

async fn handle_monthly_summary(
    State(state): State<AppState>,
    query: QueryArgs<MonthParams>,
) -> Result<Json<MonthlySummary>, AppError> {
    let Query(MonthParams { ano, mes }) = query?;
    finance::validate_month(mes)?;
    let txs = paid_transactions(&state).await?;
    Ok(Json(finance::monthly_summary(&txs, ano, mes)))
}

async fn handle_project_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, AppError> {
    let txs = state
        .store
        .list_transactions(&TransactionFilter::unbounded())
        .await?;
    Ok(Json(finance::project_summary(&txs)))
}

async fn handle_category_summary(
    State(state): State<AppState>,
    query: QueryArgs<MonthParams>,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    let Query(MonthParams { ano, mes }) = query?;
    finance::validate_month(mes)?;
    let txs = paid_transactions(&state).await?;
    Ok(Json(finance::category_summary(&txs, ano, mes)))
}

fn transaction_not_found(id: i64) -> AppError {
    not_found(format!("transacao {} not found", id))
}
