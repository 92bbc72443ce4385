//! Domain models: tasks (`tarefas`), contracts (`contratos`), projects
//! (`projetos`), tags and sprints.
//!
//! Wire names follow the public JSON API, which is in Portuguese
//! (`titulo`, `descricao`, `coluna`, ...). Enumerations serialize to the
//! lowercase tags stored in the database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length of a task title, in characters.
pub const MAX_TITLE_LEN: usize = 500;

/// Default page size for list operations.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Rejected input on a create or update payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be >= 0")]
    Negative { field: &'static str },
    #[error("{field} must be > 0")]
    NotPositive { field: &'static str },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("{field} must not be before {other}")]
    Before {
        field: &'static str,
        other: &'static str,
    },
    #[error("invalid {field}: '{value}'")]
    UnknownVariant { field: &'static str, value: String },
}

/// Declares a string-backed enum with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    other => Err(ValidationError::UnknownVariant {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use string_enum;

string_enum! {
    /// Task urgency.
    Priority, "prioridade" {
        Urgente => "urgente",
        Alta => "alta",
        Media => "media",
        Baixa => "baixa",
    }
}

string_enum! {
    /// Kanban column a task sits in.
    Column, "coluna" {
        Todo => "todo",
        InProgress => "in_progress",
        Review => "review",
        Done => "done",
    }
}

string_enum! {
    ContractType, "tipo" {
        Nda => "nda",
        Servico => "servico",
        Parceria => "parceria",
        Outro => "outro",
    }
}

string_enum! {
    ContractStatus, "status" {
        Draft => "draft",
        Active => "active",
        Expired => "expired",
        Terminated => "terminated",
    }
}

string_enum! {
    /// Billing period of a recurring contract.
    Periodicity, "periodicidade" {
        Mensal => "mensal",
        Anual => "anual",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Media
    }
}

impl Default for Column {
    fn default() -> Self {
        Column::Todo
    }
}

impl Default for ContractStatus {
    fn default() -> Self {
        ContractStatus::Draft
    }
}

// ============ Tasks ============

/// A stored task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub titulo: String,
    pub descricao: Option<String>,
    pub coluna: Column,
    pub prioridade: Priority,
    pub responsaveis: Vec<String>,
    pub projeto: Option<String>,
    pub cliente: Option<String>,
    pub prazo: Option<DateTime<Utc>>,
    pub estimativa: Option<i64>,
    pub tags: Vec<String>,
    pub sprint_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub titulo: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub coluna: Column,
    #[serde(default)]
    pub prioridade: Priority,
    #[serde(default)]
    pub responsaveis: Vec<String>,
    #[serde(default)]
    pub projeto: Option<String>,
    #[serde(default)]
    pub cliente: Option<String>,
    #[serde(default)]
    pub prazo: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimativa: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sprint_id: Option<i64>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.titulo)?;
        validate_estimate(self.estimativa)
    }

    /// Materializes the payload into a stored task.
    pub fn into_task(self, id: i64, now: DateTime<Utc>) -> Task {
        Task {
            id,
            titulo: self.titulo,
            descricao: self.descricao,
            coluna: self.coluna,
            prioridade: self.prioridade,
            responsaveis: self.responsaveis,
            projeto: self.projeto,
            cliente: self.cliente,
            prazo: self.prazo,
            estimativa: self.estimativa,
            tags: self.tags,
            sprint_id: self.sprint_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskUpdate {
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub coluna: Option<Column>,
    pub prioridade: Option<Priority>,
    pub responsaveis: Option<Vec<String>>,
    pub projeto: Option<String>,
    pub cliente: Option<String>,
    pub prazo: Option<DateTime<Utc>>,
    pub estimativa: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub sprint_id: Option<i64>,
}

impl TaskUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref titulo) = self.titulo {
            validate_title(titulo)?;
        }
        validate_estimate(self.estimativa)
    }

    /// Applies every provided field to `task` and bumps `updated_at`.
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(ref v) = self.titulo {
            task.titulo = v.clone();
        }
        if let Some(ref v) = self.descricao {
            task.descricao = Some(v.clone());
        }
        if let Some(v) = self.coluna {
            task.coluna = v;
        }
        if let Some(v) = self.prioridade {
            task.prioridade = v;
        }
        if let Some(ref v) = self.responsaveis {
            task.responsaveis = v.clone();
        }
        if let Some(ref v) = self.projeto {
            task.projeto = Some(v.clone());
        }
        if let Some(ref v) = self.cliente {
            task.cliente = Some(v.clone());
        }
        if let Some(v) = self.prazo {
            task.prazo = Some(v);
        }
        if let Some(v) = self.estimativa {
            task.estimativa = Some(v);
        }
        if let Some(ref v) = self.tags {
            task.tags = v.clone();
        }
        if let Some(v) = self.sprint_id {
            task.sprint_id = Some(v);
        }
        task.updated_at = now;
    }
}

/// Listing filter for tasks. All set fields must match.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    pub coluna: Option<Column>,
    pub prioridade: Option<Priority>,
    /// Matches tasks whose `responsaveis` contains this name.
    pub responsavel: Option<String>,
    pub projeto: Option<String>,
    pub sprint_id: Option<i64>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            coluna: None,
            prioridade: None,
            responsavel: None,
            projeto: None,
            sprint_id: None,
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.coluna.is_some_and(|c| c != task.coluna) {
            return false;
        }
        if self.prioridade.is_some_and(|p| p != task.prioridade) {
            return false;
        }
        if let Some(ref who) = self.responsavel {
            if !task.responsaveis.iter().any(|r| r == who) {
                return false;
            }
        }
        if let Some(ref projeto) = self.projeto {
            if task.projeto.as_deref() != Some(projeto.as_str()) {
                return false;
            }
        }
        if self.sprint_id.is_some_and(|s| task.sprint_id != Some(s)) {
            return false;
        }
        true
    }
}

// ============ Contracts ============

/// A stored contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub titulo: String,
    pub tipo: ContractType,
    pub contratante: String,
    pub contratado: Option<String>,
    pub valor: Option<f64>,
    pub periodicidade: Option<Periodicity>,
    pub status: ContractStatus,
    pub data_inicio: Option<DateTime<Utc>>,
    pub data_fim: Option<DateTime<Utc>>,
    pub descricao: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContract {
    pub titulo: String,
    pub tipo: ContractType,
    pub contratante: String,
    #[serde(default)]
    pub contratado: Option<String>,
    #[serde(default)]
    pub valor: Option<f64>,
    #[serde(default)]
    pub periodicidade: Option<Periodicity>,
    #[serde(default)]
    pub status: ContractStatus,
    #[serde(default)]
    pub data_inicio: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data_fim: Option<DateTime<Utc>>,
    #[serde(default)]
    pub descricao: Option<String>,
}

impl NewContract {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.titulo.is_empty() {
            return Err(ValidationError::Empty { field: "titulo" });
        }
        validate_value(self.valor)
    }

    pub fn into_contract(self, id: i64, now: DateTime<Utc>) -> Contract {
        Contract {
            id,
            titulo: self.titulo,
            tipo: self.tipo,
            contratante: self.contratante,
            contratado: self.contratado,
            valor: self.valor,
            periodicidade: self.periodicidade,
            status: self.status,
            data_inicio: self.data_inicio,
            data_fim: self.data_fim,
            descricao: self.descricao,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a contract. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractUpdate {
    pub titulo: Option<String>,
    pub tipo: Option<ContractType>,
    pub contratante: Option<String>,
    pub contratado: Option<String>,
    pub valor: Option<f64>,
    pub periodicidade: Option<Periodicity>,
    pub status: Option<ContractStatus>,
    pub data_inicio: Option<DateTime<Utc>>,
    pub data_fim: Option<DateTime<Utc>>,
    pub descricao: Option<String>,
}

impl ContractUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_value(self.valor)
    }

    pub fn apply(&self, contract: &mut Contract, now: DateTime<Utc>) {
        if let Some(ref v) = self.titulo {
            contract.titulo = v.clone();
        }
        if let Some(v) = self.tipo {
            contract.tipo = v;
        }
        if let Some(ref v) = self.contratante {
            contract.contratante = v.clone();
        }
        if let Some(ref v) = self.contratado {
            contract.contratado = Some(v.clone());
        }
        if let Some(v) = self.valor {
            contract.valor = Some(v);
        }
        if let Some(v) = self.periodicidade {
            contract.periodicidade = Some(v);
        }
        if let Some(v) = self.status {
            contract.status = v;
        }
        if let Some(v) = self.data_inicio {
            contract.data_inicio = Some(v);
        }
        if let Some(v) = self.data_fim {
            contract.data_fim = Some(v);
        }
        if let Some(ref v) = self.descricao {
            contract.descricao = Some(v.clone());
        }
        contract.updated_at = now;
    }
}

/// Listing filter for contracts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContractFilter {
    pub status: Option<ContractStatus>,
    pub tipo: Option<ContractType>,
    /// Case-insensitive substring match on `contratante`.
    pub contratante: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for ContractFilter {
    fn default() -> Self {
        Self {
            status: None,
            tipo: None,
            contratante: None,
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ContractFilter {
    pub fn matches(&self, contract: &Contract) -> bool {
        if self.status.is_some_and(|s| s != contract.status) {
            return false;
        }
        if self.tipo.is_some_and(|t| t != contract.tipo) {
            return false;
        }
        if let Some(ref needle) = self.contratante {
            if !contract
                .contratante
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

// ============ Projects ============

string_enum! {
    ProjectStatus, "status" {
        Ativo => "ativo",
        Pausado => "pausado",
        Arquivado => "arquivado",
        Concluido => "concluido",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Ativo
    }
}

/// Color given to projects created without one.
pub const DEFAULT_PROJECT_COLOR: &str = "#3b82f6";

fn default_project_color() -> String {
    DEFAULT_PROJECT_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub nome: String,
    pub descricao: Option<String>,
    pub cor: String,
    pub icone: Option<String>,
    pub cliente_nome: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub status: ProjectStatus,
    /// Completion percentage, 0 to 100.
    pub progresso: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default = "default_project_color")]
    pub cor: String,
    #[serde(default)]
    pub icone: Option<String>,
    #[serde(default)]
    pub cliente_nome: Option<String>,
    #[serde(default)]
    pub data_inicio: Option<NaiveDate>,
    #[serde(default)]
    pub data_fim: Option<NaiveDate>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub progresso: i64,
}

impl NewProject {
    pub fn named(nome: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            descricao: None,
            cor: default_project_color(),
            icone: None,
            cliente_nome: None,
            data_inicio: None,
            data_fim: None,
            status: ProjectStatus::default(),
            progresso: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.nome, MAX_TITLE_LEN)?;
        validate_progress(Some(self.progresso))?;
        validate_date_order(self.data_inicio, self.data_fim)
    }

    pub fn into_project(self, id: i64, now: DateTime<Utc>) -> Project {
        Project {
            id,
            nome: self.nome,
            descricao: self.descricao,
            cor: self.cor,
            icone: self.icone,
            cliente_nome: self.cliente_nome,
            data_inicio: self.data_inicio,
            data_fim: self.data_fim,
            status: self.status,
            progresso: self.progresso,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectUpdate {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub cor: Option<String>,
    pub icone: Option<String>,
    pub cliente_nome: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub progresso: Option<i64>,
}

impl ProjectUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref nome) = self.nome {
            validate_name(nome, MAX_TITLE_LEN)?;
        }
        validate_progress(self.progresso)
    }

    pub fn apply(&self, project: &mut Project, now: DateTime<Utc>) {
        if let Some(ref v) = self.nome {
            project.nome = v.clone();
        }
        if let Some(ref v) = self.descricao {
            project.descricao = Some(v.clone());
        }
        if let Some(ref v) = self.cor {
            project.cor = v.clone();
        }
        if let Some(ref v) = self.icone {
            project.icone = Some(v.clone());
        }
        if let Some(ref v) = self.cliente_nome {
            project.cliente_nome = Some(v.clone());
        }
        if let Some(v) = self.data_inicio {
            project.data_inicio = Some(v);
        }
        if let Some(v) = self.data_fim {
            project.data_fim = Some(v);
        }
        if let Some(v) = self.status {
            project.status = v;
        }
        if let Some(v) = self.progresso {
            project.progresso = v;
        }
        project.updated_at = now;
    }
}

/// Listing filter for projects. Results come newest first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            status: None,
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        self.status.map_or(true, |s| s == project.status)
    }
}

// ============ Tags ============

pub const MAX_TAG_NAME_LEN: usize = 100;
pub const MAX_COLOR_LEN: usize = 7;
pub const MAX_ICON_LEN: usize = 50;
pub const MAX_SCOPE_LEN: usize = 50;

/// Scope assigned to tags created without one.
pub const DEFAULT_TAG_SCOPE: &str = "tarefa";

fn default_tag_scope() -> String {
    DEFAULT_TAG_SCOPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub nome: String,
    pub cor: Option<String>,
    pub icone: Option<String>,
    /// What the tag applies to, e.g. `tarefa` or `contrato`.
    pub escopo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTag {
    pub nome: String,
    #[serde(default)]
    pub cor: Option<String>,
    #[serde(default)]
    pub icone: Option<String>,
    #[serde(default = "default_tag_scope")]
    pub escopo: String,
}

impl NewTag {
    pub fn named(nome: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            cor: None,
            icone: None,
            escopo: default_tag_scope(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.nome, MAX_TAG_NAME_LEN)?;
        validate_max_len("cor", self.cor.as_deref(), MAX_COLOR_LEN)?;
        validate_max_len("icone", self.icone.as_deref(), MAX_ICON_LEN)?;
        validate_max_len("escopo", Some(&self.escopo), MAX_SCOPE_LEN)
    }

    pub fn into_tag(self, id: i64, now: DateTime<Utc>) -> Tag {
        Tag {
            id,
            nome: self.nome,
            cor: self.cor,
            icone: self.icone,
            escopo: self.escopo,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagUpdate {
    pub nome: Option<String>,
    pub cor: Option<String>,
    pub icone: Option<String>,
    pub escopo: Option<String>,
}

impl TagUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref nome) = self.nome {
            validate_name(nome, MAX_TAG_NAME_LEN)?;
        }
        validate_max_len("cor", self.cor.as_deref(), MAX_COLOR_LEN)?;
        validate_max_len("icone", self.icone.as_deref(), MAX_ICON_LEN)?;
        validate_max_len("escopo", self.escopo.as_deref(), MAX_SCOPE_LEN)
    }

    pub fn apply(&self, tag: &mut Tag, now: DateTime<Utc>) {
        if let Some(ref v) = self.nome {
            tag.nome = v.clone();
        }
        if let Some(ref v) = self.cor {
            tag.cor = Some(v.clone());
        }
        if let Some(ref v) = self.icone {
            tag.icone = Some(v.clone());
        }
        if let Some(ref v) = self.escopo {
            tag.escopo = v.clone();
        }
        tag.updated_at = now;
    }
}

/// Listing filter for tags. Results are ordered by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TagFilter {
    pub escopo: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for TagFilter {
    fn default() -> Self {
        Self {
            escopo: None,
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl TagFilter {
    pub fn matches(&self, tag: &Tag) -> bool {
        self.escopo.as_deref().map_or(true, |e| e == tag.escopo)
    }
}

// ============ Sprints ============

string_enum! {
    SprintStatus, "status" {
        Planejada => "planejada",
        Ativa => "ativa",
        Concluida => "concluida",
        Cancelada => "cancelada",
    }
}

impl Default for SprintStatus {
    fn default() -> Self {
        SprintStatus::Planejada
    }
}

pub const MAX_SPRINT_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: i64,
    pub projeto_id: Option<i64>,
    pub nome: String,
    pub objetivo: Option<String>,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    pub data_conclusao: Option<NaiveDate>,
    pub status: SprintStatus,
    pub meta_pontos: Option<i64>,
    /// Sum of `estimativa` over the sprint's done tasks, set on completion.
    pub pontos_concluidos: i64,
    /// Position in the backlog; the next sprint is the lowest `ordem` above this one.
    pub ordem: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSprint {
    #[serde(default)]
    pub projeto_id: Option<i64>,
    pub nome: String,
    #[serde(default)]
    pub objetivo: Option<String>,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    #[serde(default)]
    pub status: SprintStatus,
    #[serde(default)]
    pub meta_pontos: Option<i64>,
    #[serde(default)]
    pub ordem: i64,
}

impl NewSprint {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.nome, MAX_SPRINT_NAME_LEN)?;
        validate_non_negative("meta_pontos", self.meta_pontos)?;
        validate_date_order(Some(self.data_inicio), Some(self.data_fim))
    }

    pub fn into_sprint(self, id: i64, now: DateTime<Utc>) -> Sprint {
        Sprint {
            id,
            projeto_id: self.projeto_id,
            nome: self.nome,
            objetivo: self.objetivo,
            data_inicio: self.data_inicio,
            data_fim: self.data_fim,
            data_conclusao: None,
            status: self.status,
            meta_pontos: self.meta_pontos,
            pontos_concluidos: 0,
            ordem: self.ordem,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintUpdate {
    pub projeto_id: Option<i64>,
    pub nome: Option<String>,
    pub objetivo: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub data_conclusao: Option<NaiveDate>,
    pub status: Option<SprintStatus>,
    pub meta_pontos: Option<i64>,
    pub pontos_concluidos: Option<i64>,
    pub ordem: Option<i64>,
}

impl SprintUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref nome) = self.nome {
            validate_name(nome, MAX_SPRINT_NAME_LEN)?;
        }
        validate_non_negative("meta_pontos", self.meta_pontos)?;
        validate_non_negative("pontos_concluidos", self.pontos_concluidos)
    }

    pub fn apply(&self, sprint: &mut Sprint, now: DateTime<Utc>) {
        if let Some(v) = self.projeto_id {
            sprint.projeto_id = Some(v);
        }
        if let Some(ref v) = self.nome {
            sprint.nome = v.clone();
        }
        if let Some(ref v) = self.objetivo {
            sprint.objetivo = Some(v.clone());
        }
        if let Some(v) = self.data_inicio {
            sprint.data_inicio = v;
        }
        if let Some(v) = self.data_fim {
            sprint.data_fim = v;
        }
        if let Some(v) = self.data_conclusao {
            sprint.data_conclusao = Some(v);
        }
        if let Some(v) = self.status {
            sprint.status = v;
        }
        if let Some(v) = self.meta_pontos {
            sprint.meta_pontos = Some(v);
        }
        if let Some(v) = self.pontos_concluidos {
            sprint.pontos_concluidos = v;
        }
        if let Some(v) = self.ordem {
            sprint.ordem = v;
        }
        sprint.updated_at = now;
    }
}

/// Listing filter for sprints. Results are ordered by `ordem`, then id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SprintFilter {
    pub projeto_id: Option<i64>,
    pub status: Option<SprintStatus>,
}

impl SprintFilter {
    pub fn matches(&self, sprint: &Sprint) -> bool {
        if self.projeto_id.is_some_and(|p| sprint.projeto_id != Some(p)) {
            return false;
        }
        self.status.map_or(true, |s| s == sprint.status)
    }
}

fn validate_title(titulo: &str) -> Result<(), ValidationError> {
    validate_len("titulo", titulo, MAX_TITLE_LEN)
}

fn validate_name(nome: &str, max: usize) -> Result<(), ValidationError> {
    validate_len("nome", nome, max)
}

fn validate_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    validate_max_len(field, Some(value), max)
}

pub(crate) fn validate_max_len(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}

fn validate_non_negative(field: &'static str, value: Option<i64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::Negative { field }),
        _ => Ok(()),
    }
}

fn validate_progress(progresso: Option<i64>) -> Result<(), ValidationError> {
    match progresso {
        Some(p) if !(0..=100).contains(&p) => Err(ValidationError::OutOfRange {
            field: "progresso",
            min: 0,
            max: 100,
        }),
        _ => Ok(()),
    }
}

fn validate_date_order(
    inicio: Option<NaiveDate>,
    fim: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (inicio, fim) {
        (Some(i), Some(f)) if f < i => Err(ValidationError::Before {
            field: "data_fim",
            other: "data_inicio",
        }),
        _ => Ok(()),
    }
}

fn validate_estimate(estimativa: Option<i64>) -> Result<(), ValidationError> {
    validate_non_negative("estimativa", estimativa)
}

fn validate_value(valor: Option<f64>) -> Result<(), ValidationError> {
    match valor {
        Some(v) if v < 0.0 || v.is_nan() => Err(ValidationError::Negative { field: "valor" }),
        _ => Ok(()),
    }
}
