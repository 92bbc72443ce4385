//! Financial transactions (`transacoes`) and the summaries computed over
//! them.
//!
//! Summaries are pure functions over a slice of transactions so they can
//! run on whatever a [`TransactionStore`](crate::store::TransactionStore)
//! returns.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{string_enum, validate_max_len, ValidationError, DEFAULT_LIST_LIMIT};

/// Label used for transactions with no project.
pub const NO_PROJECT_LABEL: &str = "Sem projeto";

pub const MAX_CATEGORY_LEN: usize = 100;

string_enum! {
    TransactionKind, "tipo" {
        Receita => "receita",
        Despesa => "despesa",
    }
}

string_enum! {
    TransactionStatus, "status" {
        Pendente => "pendente",
        Pago => "pago",
        Cancelado => "cancelado",
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Pendente
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub tipo: TransactionKind,
    pub categoria: String,
    pub descricao: Option<String>,
    pub valor: f64,
    pub data_transacao: Option<DateTime<Utc>>,
    pub data_vencimento: Option<DateTime<Utc>>,
    pub data_pagamento: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub projeto: Option<String>,
    pub contrato_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub tipo: TransactionKind,
    pub categoria: String,
    #[serde(default)]
    pub descricao: Option<String>,
    pub valor: f64,
    #[serde(default)]
    pub data_transacao: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data_vencimento: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data_pagamento: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub projeto: Option<String>,
    #[serde(default)]
    pub contrato_id: Option<i64>,
}

impl NewTransaction {
    pub fn new(tipo: TransactionKind, categoria: impl Into<String>, valor: f64) -> Self {
        Self {
            tipo,
            categoria: categoria.into(),
            descricao: None,
            valor,
            data_transacao: None,
            data_vencimento: None,
            data_pagamento: None,
            status: TransactionStatus::default(),
            projeto: None,
            contrato_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_category(&self.categoria)?;
        validate_amount(Some(self.valor))
    }

    pub fn into_transaction(self, id: i64, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            tipo: self.tipo,
            categoria: self.categoria,
            descricao: self.descricao,
            valor: self.valor,
            data_transacao: self.data_transacao,
            data_vencimento: self.data_vencimento,
            data_pagamento: self.data_pagamento,
            status: self.status,
            projeto: self.projeto,
            contrato_id: self.contrato_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionUpdate {
    pub tipo: Option<TransactionKind>,
    pub categoria: Option<String>,
    pub descricao: Option<String>,
    pub valor: Option<f64>,
    pub data_transacao: Option<DateTime<Utc>>,
    pub data_vencimento: Option<DateTime<Utc>>,
    pub data_pagamento: Option<DateTime<Utc>>,
    pub status: Option<TransactionStatus>,
    pub projeto: Option<String>,
    pub contrato_id: Option<i64>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref categoria) = self.categoria {
            validate_category(categoria)?;
        }
        validate_amount(self.valor)
    }

    pub fn apply(&self, tx: &mut Transaction, now: DateTime<Utc>) {
        if let Some(v) = self.tipo {
            tx.tipo = v;
        }
        if let Some(ref v) = self.categoria {
            tx.categoria = v.clone();
        }
        if let Some(ref v) = self.descricao {
            tx.descricao = Some(v.clone());
        }
        if let Some(v) = self.valor {
            tx.valor = v;
        }
        if let Some(v) = self.data_transacao {
            tx.data_transacao = Some(v);
        }
        if let Some(v) = self.data_vencimento {
            tx.data_vencimento = Some(v);
        }
        if let Some(v) = self.data_pagamento {
            tx.data_pagamento = Some(v);
        }
        if let Some(v) = self.status {
            tx.status = v;
        }
        if let Some(ref v) = self.projeto {
            tx.projeto = Some(v.clone());
        }
        if let Some(v) = self.contrato_id {
            tx.contrato_id = Some(v);
        }
        tx.updated_at = now;
    }
}

/// Listing filter for transactions, in insertion order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransactionFilter {
    pub tipo: Option<TransactionKind>,
    pub categoria: Option<String>,
    pub status: Option<TransactionStatus>,
    pub projeto: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            tipo: None,
            categoria: None,
            status: None,
            projeto: None,
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl TransactionFilter {
    /// A filter with no page bound, used when computing summaries.
    pub fn unbounded() -> Self {
        Self {
            limit: i64::MAX,
            ..Default::default()
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.tipo.is_some_and(|t| t != tx.tipo) {
            return false;
        }
        if self.status.is_some_and(|s| s != tx.status) {
            return false;
        }
        if let Some(ref categoria) = self.categoria {
            if &tx.categoria != categoria {
                return false;
            }
        }
        if let Some(ref projeto) = self.projeto {
            if tx.projeto.as_deref() != Some(projeto.as_str()) {
                return false;
            }
        }
        true
    }
}

fn validate_category(categoria: &str) -> Result<(), ValidationError> {
    if categoria.is_empty() {
        return Err(ValidationError::Empty { field: "categoria" });
    }
    validate_max_len("categoria", Some(categoria), MAX_CATEGORY_LEN)
}

fn validate_amount(valor: Option<f64>) -> Result<(), ValidationError> {
    match valor {
        Some(v) if !(v.is_finite() && v > 0.0) => {
            Err(ValidationError::NotPositive { field: "valor" })
        }
        _ => Ok(()),
    }
}

// ============ Summaries ============

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub receitas: f64,
    pub despesas: f64,
    pub saldo: f64,
}

impl Totals {
    fn add(&mut self, tx: &Transaction) {
        match tx.tipo {
            TransactionKind::Receita => self.receitas += tx.valor,
            TransactionKind::Despesa => self.despesas += tx.valor,
        }
        self.saldo = self.receitas - self.despesas;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub ano: i32,
    pub mes: u32,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub projeto: String,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub categoria: String,
    #[serde(flatten)]
    pub totals: Totals,
}

/// Rejects a month outside 1..=12.
pub fn validate_month(mes: u32) -> Result<(), ValidationError> {
    if (1..=12).contains(&mes) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "mes",
            min: 1,
            max: 12,
        })
    }
}

fn paid_in_month(tx: &Transaction, ano: i32, mes: u32) -> bool {
    tx.status == TransactionStatus::Pago
        && tx
            .data_transacao
            .is_some_and(|d| d.year() == ano && d.month() == mes)
}

/// Paid income and expenses whose `data_transacao` falls in the month.
/// Transactions without a date are not counted.
pub fn monthly_summary(txs: &[Transaction], ano: i32, mes: u32) -> MonthlySummary {
    let mut totals = Totals::default();
    for tx in txs.iter().filter(|t| paid_in_month(t, ano, mes)) {
        totals.add(tx);
    }
    MonthlySummary { ano, mes, totals }
}

/// Totals per project over every transaction, sorted by project name.
pub fn project_summary(txs: &[Transaction]) -> Vec<ProjectSummary> {
    let mut groups: BTreeMap<&str, Totals> = BTreeMap::new();
    for tx in txs {
        let key = tx.projeto.as_deref().unwrap_or(NO_PROJECT_LABEL);
        groups.entry(key).or_default().add(tx);
    }
    groups
        .into_iter()
        .map(|(projeto, totals)| ProjectSummary {
            projeto: projeto.to_string(),
            totals,
        })
        .collect()
}

/// Paid totals per category for one month, sorted by category.
pub fn category_summary(txs: &[Transaction], ano: i32, mes: u32) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&str, Totals> = BTreeMap::new();
    for tx in txs.iter().filter(|t| paid_in_month(t, ano, mes)) {
        groups.entry(tx.categoria.as_str()).or_default().add(tx);
    }
    groups
        .into_iter()
        .map(|(categoria, totals)| CategorySummary {
            categoria: categoria.to_string(),
            totals,
        })
        .collect()
}
