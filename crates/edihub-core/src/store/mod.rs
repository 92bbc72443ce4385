//! Storage abstraction for EdiHub.
//!
//! The [`Store`] trait covers tasks and contracts, which is all the
//! ranking search needs, so search fixtures only implement that. Projects,
//! tags, sprints and transactions each get their own trait. [`Backend`]
//! bundles every trait for the HTTP layer.
//!
//! "Not found" is reported as `Ok(None)` / `Ok(false)`. An `Err` always
//! means the backend itself failed.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::finance::{NewTransaction, Transaction, TransactionFilter, TransactionUpdate};
use crate::models::{
    Column, Contract, ContractFilter, ContractUpdate, NewContract, NewProject, NewSprint, NewTag,
    NewTask, Project, ProjectFilter, ProjectUpdate, Sprint, SprintFilter, SprintUpdate, Tag,
    TagFilter, TagUpdate, Task, TaskFilter, TaskUpdate,
};

/// Abstract storage backend for tasks and contracts.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create_task`](Store::create_task) | Insert a task, assigning its id |
/// | [`list_tasks`](Store::list_tasks) | Filtered listing in insertion order |
/// | [`update_task`](Store::update_task) | Partial update |
/// | [`move_task`](Store::move_task) | Change a task's column |
/// | [`create_contract`](Store::create_contract) | Insert a contract |
/// | [`list_contracts`](Store::list_contracts) | Filtered listing in insertion order |
/// | [`contracts_expiring_within`](Store::contracts_expiring_within) | Active contracts ending soon |
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_task(&self, task: &NewTask) -> Result<Task>;

    async fn get_task(&self, id: i64) -> Result<Option<Task>>;

    /// List tasks matching `filter`, ordered by id, after `skip`, at most `limit`.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>>;

    async fn delete_task(&self, id: i64) -> Result<bool>;

    async fn move_task(&self, id: i64, coluna: Column) -> Result<Option<Task>>;

    async fn create_contract(&self, contract: &NewContract) -> Result<Contract>;

    async fn get_contract(&self, id: i64) -> Result<Option<Contract>>;

    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>>;

    async fn update_contract(&self, id: i64, update: &ContractUpdate)
        -> Result<Option<Contract>>;

    async fn delete_contract(&self, id: i64) -> Result<bool>;

    /// Active contracts whose `data_fim` falls on or before `now + days`.
    async fn contracts_expiring_within(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Contract>>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, project: &NewProject) -> Result<Project>;

    async fn get_project(&self, id: i64) -> Result<Option<Project>>;

    /// Newest first.
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>>;

    async fn update_project(&self, id: i64, update: &ProjectUpdate) -> Result<Option<Project>>;

    async fn delete_project(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn create_tag(&self, tag: &NewTag) -> Result<Tag>;

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>>;

    /// Ordered by name, then id.
    async fn list_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>>;

    async fn update_tag(&self, id: i64, update: &TagUpdate) -> Result<Option<Tag>>;

    async fn delete_tag(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait SprintStore: Send + Sync {
    async fn create_sprint(&self, sprint: &NewSprint) -> Result<Sprint>;

    async fn get_sprint(&self, id: i64) -> Result<Option<Sprint>>;

    /// Ordered by `ordem`, then id.
    async fn list_sprints(&self, filter: &SprintFilter) -> Result<Vec<Sprint>>;

    async fn update_sprint(&self, id: i64, update: &SprintUpdate) -> Result<Option<Sprint>>;

    async fn delete_sprint(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction>;

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>>;

    /// Insertion order.
    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;

    async fn update_transaction(
        &self,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Option<Transaction>>;

    async fn delete_transaction(&self, id: i64) -> Result<bool>;
}

/// Every storage trait at once. Implemented for any type that has them all.
pub trait Backend: Store + ProjectStore + TagStore + SprintStore + TransactionStore {}

impl<T> Backend for T where T: Store + ProjectStore + TagStore + SprintStore + TransactionStore {}

/// Slices `items` with the `skip`/`limit` paging used by list filters.
pub(crate) fn page<T>(items: Vec<T>, skip: i64, limit: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(skip.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}
