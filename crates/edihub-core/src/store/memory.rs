//! In-memory implementation of every storage trait, for tests and fixtures.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Ids are assigned from a
//! per-kind counter so they are never reused after a delete.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::finance::{NewTransaction, Transaction, TransactionFilter, TransactionUpdate};
use crate::models::{
    Column, Contract, ContractFilter, ContractStatus, ContractUpdate, NewContract, NewProject,
    NewSprint, NewTag, NewTask, Project, ProjectFilter, ProjectUpdate, Sprint, SprintFilter,
    SprintUpdate, Tag, TagFilter, TagUpdate, Task, TaskFilter, TaskUpdate,
};

use super::{page, ProjectStore, SprintStore, Store, TagStore, TransactionStore};

struct Table<T> {
    next_id: i64,
    rows: Vec<T>,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

trait Row {
    fn id(&self) -> i64;
}

macro_rules! row {
    ($($t:ty),+) => {
        $(impl Row for $t {
            fn id(&self) -> i64 {
                self.id
            }
        })+
    };
}

row!(Project, Tag, Sprint, Transaction);

impl<T: Row + Clone> Table<T> {
    fn find(&self, id: i64) -> Option<T> {
        self.rows.iter().find(|r| r.id() == id).cloned()
    }

    fn modify(&mut self, id: i64, f: impl FnOnce(&mut T)) -> Option<T> {
        self.rows.iter_mut().find(|r| r.id() == id).map(|r| {
            f(r);
            r.clone()
        })
    }

    fn remove(&mut self, id: i64) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.id() != id);
        self.rows.len() != before
    }
}

/// In-memory store for tests.
pub struct InMemoryStore {
    tasks: RwLock<Table<Task>>,
    contracts: RwLock<Table<Contract>>,
    projects: RwLock<Table<Project>>,
    tags: RwLock<Table<Tag>>,
    sprints: RwLock<Table<Sprint>>,
    transactions: RwLock<Table<Transaction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Table::new()),
            contracts: RwLock::new(Table::new()),
            projects: RwLock::new(Table::new()),
            tags: RwLock::new(Table::new()),
            sprints: RwLock::new(Table::new()),
            transactions: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E>(_: E) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        let mut table = self.tasks.write().map_err(poisoned)?;
        let id = table.allocate_id();
        let stored = task.clone().into_task(id, Utc::now());
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let table = self.tasks.read().map_err(poisoned)?;
        Ok(table.rows.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let table = self.tasks.read().map_err(poisoned)?;
        let matched: Vec<Task> = table
            .rows
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        Ok(page(matched, filter.skip, filter.limit))
    }

    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>> {
        let mut table = self.tasks.write().map_err(poisoned)?;
        Ok(table.rows.iter_mut().find(|t| t.id == id).map(|t| {
            update.apply(t, Utc::now());
            t.clone()
        }))
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let mut table = self.tasks.write().map_err(poisoned)?;
        let before = table.rows.len();
        table.rows.retain(|t| t.id != id);
        Ok(table.rows.len() != before)
    }

    async fn move_task(&self, id: i64, coluna: Column) -> Result<Option<Task>> {
        let mut table = self.tasks.write().map_err(poisoned)?;
        Ok(table.rows.iter_mut().find(|t| t.id == id).map(|t| {
            t.coluna = coluna;
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn create_contract(&self, contract: &NewContract) -> Result<Contract> {
        let mut table = self.contracts.write().map_err(poisoned)?;
        let id = table.allocate_id();
        let stored = contract.clone().into_contract(id, Utc::now());
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn get_contract(&self, id: i64) -> Result<Option<Contract>> {
        let table = self.contracts.read().map_err(poisoned)?;
        Ok(table.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>> {
        let table = self.contracts.read().map_err(poisoned)?;
        let matched: Vec<Contract> = table
            .rows
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        Ok(page(matched, filter.skip, filter.limit))
    }

    async fn update_contract(
        &self,
        id: i64,
        update: &ContractUpdate,
    ) -> Result<Option<Contract>> {
        let mut table = self.contracts.write().map_err(poisoned)?;
        Ok(table.rows.iter_mut().find(|c| c.id == id).map(|c| {
            update.apply(c, Utc::now());
            c.clone()
        }))
    }

    async fn delete_contract(&self, id: i64) -> Result<bool> {
        let mut table = self.contracts.write().map_err(poisoned)?;
        let before = table.rows.len();
        table.rows.retain(|c| c.id != id);
        Ok(table.rows.len() != before)
    }

    async fn contracts_expiring_within(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Contract>> {
        let cutoff = Duration::try_days(days)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| anyhow::anyhow!("expiry window of {} days is out of range", days))?;
        let table = self.contracts.read().map_err(poisoned)?;
        Ok(table
            .rows
            .iter()
            .filter(|c| c.status == ContractStatus::Active)
            .filter(|c| c.data_fim.is_some_and(|fim| fim <= cutoff))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        let mut table = self.projects.write().map_err(poisoned)?;
        let id = table.allocate_id();
        let stored = project.clone().into_project(id, Utc::now());
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn get_project(&self, id: i64) -> Result<Option<Project>> {
        Ok(self.projects.read().map_err(poisoned)?.find(id))
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let table = self.projects.read().map_err(poisoned)?;
        let matched: Vec<Project> = table
            .rows
            .iter()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(page(matched, filter.skip, filter.limit))
    }

    async fn update_project(&self, id: i64, update: &ProjectUpdate) -> Result<Option<Project>> {
        let mut table = self.projects.write().map_err(poisoned)?;
        Ok(table.modify(id, |p| update.apply(p, Utc::now())))
    }

    async fn delete_project(&self, id: i64) -> Result<bool> {
        Ok(self.projects.write().map_err(poisoned)?.remove(id))
    }
}

#[async_trait]
impl TagStore for InMemoryStore {
    async fn create_tag(&self, tag: &NewTag) -> Result<Tag> {
        let mut table = self.tags.write().map_err(poisoned)?;
        let id = table.allocate_id();
        let stored = tag.clone().into_tag(id, Utc::now());
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        Ok(self.tags.read().map_err(poisoned)?.find(id))
    }

    async fn list_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>> {
        let table = self.tags.read().map_err(poisoned)?;
        let mut matched: Vec<Tag> = table
            .rows
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.nome.cmp(&b.nome).then(a.id.cmp(&b.id)));
        Ok(page(matched, filter.skip, filter.limit))
    }

    async fn update_tag(&self, id: i64, update: &TagUpdate) -> Result<Option<Tag>> {
        let mut table = self.tags.write().map_err(poisoned)?;
        Ok(table.modify(id, |t| update.apply(t, Utc::now())))
    }

    async fn delete_tag(&self, id: i64) -> Result<bool> {
        Ok(self.tags.write().map_err(poisoned)?.remove(id))
    }
}

#[async_trait]
impl SprintStore for InMemoryStore {
    async fn create_sprint(&self, sprint: &NewSprint) -> Result<Sprint> {
        let mut table = self.sprints.write().map_err(poisoned)?;
        let id = table.allocate_id();
        let stored = sprint.clone().into_sprint(id, Utc::now());
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn get_sprint(&self, id: i64) -> Result<Option<Sprint>> {
        Ok(self.sprints.read().map_err(poisoned)?.find(id))
    }

    async fn list_sprints(&self, filter: &SprintFilter) -> Result<Vec<Sprint>> {
        let table = self.sprints.read().map_err(poisoned)?;
        let mut matched: Vec<Sprint> = table
            .rows
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matched.sort_by_key(|s| (s.ordem, s.id));
        Ok(matched)
    }

    async fn update_sprint(&self, id: i64, update: &SprintUpdate) -> Result<Option<Sprint>> {
        let mut table = self.sprints.write().map_err(poisoned)?;
        Ok(table.modify(id, |s| update.apply(s, Utc::now())))
    }

    async fn delete_sprint(&self, id: i64) -> Result<bool> {
        Ok(self.sprints.write().map_err(poisoned)?.remove(id))
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let mut table = self.transactions.write().map_err(poisoned)?;
        let id = table.allocate_id();
        let stored = tx.clone().into_transaction(id, Utc::now());
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.transactions.read().map_err(poisoned)?.find(id))
    }

    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let table = self.transactions.read().map_err(poisoned)?;
        let matched: Vec<Transaction> = table
            .rows
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        Ok(page(matched, filter.skip, filter.limit))
    }

    async fn update_transaction(
        &self,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Option<Transaction>> {
        let mut table = self.transactions.write().map_err(poisoned)?;
        Ok(table.modify(id, |t| update.apply(t, Utc::now())))
    }

    async fn delete_transaction(&self, id: i64) -> Result<bool> {
        Ok(self.transactions.write().map_err(poisoned)?.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::{TransactionKind, TransactionStatus};
    use crate::models::{ContractType, Priority, ProjectStatus, SprintStatus};
    use chrono::NaiveDate;

    fn new_task(titulo: &str) -> NewTask {
        NewTask {
            titulo: titulo.into(),
            ..Default::default()
        }
    }

    fn new_contract(titulo: &str, status: ContractStatus, fim: Option<DateTime<Utc>>) -> NewContract {
        NewContract {
            titulo: titulo.into(),
            tipo: ContractType::Servico,
            contratante: "Acme".into(),
            contratado: None,
            valor: Some(1000.0),
            periodicidade: None,
            status,
            data_inicio: None,
            data_fim: fim,
            descricao: None,
        }
    }

    #[tokio::test]
    async fn test_task_crud() {
        let store = InMemoryStore::new();
        let a = store.create_task(&new_task("a")).await.unwrap();
        let b = store.create_task(&new_task("b")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let updated = store
            .update_task(
                a.id,
                &TaskUpdate {
                    prioridade: Some(Priority::Alta),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.prioridade, Priority::Alta);

        let moved = store.move_task(b.id, Column::Done).await.unwrap().unwrap();
        assert_eq!(moved.coluna, Column::Done);

        assert!(store.delete_task(a.id).await.unwrap());
        assert!(!store.delete_task(a.id).await.unwrap());
        assert!(store.get_task(a.id).await.unwrap().is_none());
        assert!(store.update_task(99, &TaskUpdate::default()).await.unwrap().is_none());

        // ids are not reused
        let c = store.create_task(&new_task("c")).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn test_list_tasks_paging_and_order() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.create_task(&new_task(&format!("t{}", i))).await.unwrap();
        }
        let filter = TaskFilter {
            skip: 1,
            limit: 2,
            ..Default::default()
        };
        let titles: Vec<String> = store
            .list_tasks(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.titulo)
            .collect();
        assert_eq!(titles, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_contracts_expiring_within() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .create_contract(&new_contract("soon", ContractStatus::Active, Some(now + Duration::days(5))))
            .await
            .unwrap();
        store
            .create_contract(&new_contract("late", ContractStatus::Active, Some(now + Duration::days(60))))
            .await
            .unwrap();
        store
            .create_contract(&new_contract("draft", ContractStatus::Draft, Some(now + Duration::days(1))))
            .await
            .unwrap();
        store
            .create_contract(&new_contract("open", ContractStatus::Active, None))
            .await
            .unwrap();

        let expiring = store.contracts_expiring_within(30, now).await.unwrap();
        let titles: Vec<&str> = expiring.iter().map(|c| c.titulo.as_str()).collect();
        assert_eq!(titles, vec!["soon"]);
    }

    #[tokio::test]
    async fn test_projects_newest_first_with_status_filter() {
        let store = InMemoryStore::new();
        store.create_project(&NewProject::named("a")).await.unwrap();
        store
            .create_project(&NewProject {
                status: ProjectStatus::Pausado,
                ..NewProject::named("b")
            })
            .await
            .unwrap();
        let c = store.create_project(&NewProject::named("c")).await.unwrap();

        let names: Vec<String> = store
            .list_projects(&ProjectFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.nome)
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);

        let paused = store
            .list_projects(&ProjectFilter {
                status: Some(ProjectStatus::Pausado),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paused.len(), 1);

        let updated = store
            .update_project(
                c.id,
                &ProjectUpdate {
                    progresso: Some(40),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.progresso, 40);
        assert!(store.delete_project(c.id).await.unwrap());
        assert!(store.get_project(c.id).await.unwrap().is_none());
        assert!(store.update_project(c.id, &ProjectUpdate::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tags_sorted_by_name() {
        let store = InMemoryStore::new();
        for nome in ["zeta", "alfa", "mu"] {
            store.create_tag(&NewTag::named(nome)).await.unwrap();
        }
        store
            .create_tag(&NewTag {
                escopo: "contrato".into(),
                ..NewTag::named("beta")
            })
            .await
            .unwrap();

        let names: Vec<String> = store
            .list_tags(&TagFilter {
                escopo: Some("tarefa".into()),
                ..Default::default()
            })
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.nome)
            .collect();
        assert_eq!(names, vec!["alfa", "mu", "zeta"]);
    }

    #[tokio::test]
    async fn test_sprints_ordered_by_ordem() {
        let store = InMemoryStore::new();
        let day = |d| NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
        for (nome, ordem) in [("s3", 3), ("s1", 1), ("s2", 2)] {
            store
                .create_sprint(&NewSprint {
                    projeto_id: None,
                    nome: nome.into(),
                    objetivo: None,
                    data_inicio: day(1),
                    data_fim: day(14),
                    status: SprintStatus::Planejada,
                    meta_pontos: None,
                    ordem,
                })
                .await
                .unwrap();
        }
        let names: Vec<String> = store
            .list_sprints(&SprintFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.nome)
            .collect();
        assert_eq!(names, vec!["s1", "s2", "s3"]);
    }

    #[tokio::test]
    async fn test_transactions_crud_and_filter() {
        let store = InMemoryStore::new();
        let a = store
            .create_transaction(&NewTransaction::new(TransactionKind::Receita, "servicos", 100.0))
            .await
            .unwrap();
        store
            .create_transaction(&NewTransaction::new(TransactionKind::Despesa, "software", 30.0))
            .await
            .unwrap();

        let paid = store
            .update_transaction(
                a.id,
                &TransactionUpdate {
                    status: Some(TransactionStatus::Pago),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, TransactionStatus::Pago);

        let despesas = store
            .list_transactions(&TransactionFilter {
                tipo: Some(TransactionKind::Despesa),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(despesas.len(), 1);
        assert_eq!(despesas[0].categoria, "software");

        assert!(store.delete_transaction(a.id).await.unwrap());
        assert!(!store.delete_transaction(a.id).await.unwrap());
    }
}
