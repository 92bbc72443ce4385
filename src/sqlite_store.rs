//! SQLite-backed implementation of every storage trait.
//!
//! Maps each operation onto the tables created by [`crate::migrate`].
//! Enumerations are stored as their wire tags, list fields as JSON arrays
//! and timestamps as RFC 3339 strings with a fixed precision so they
//! compare correctly as text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use edihub_core::finance::{NewTransaction, Transaction, TransactionFilter, TransactionUpdate};
use edihub_core::models::{
    Column, Contract, ContractFilter, ContractUpdate, NewContract, NewProject, NewSprint, NewTag,
    NewTask, Project, ProjectFilter, ProjectUpdate, Sprint, SprintFilter, SprintUpdate, Tag,
    TagFilter, TagUpdate, Task, TaskFilter, TaskUpdate,
};
use edihub_core::store::{ProjectStore, SprintStore, Store, TagStore, TransactionStore};

/// SQLite store over a connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Current time at the precision timestamps are stored with.
fn current_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("invalid timestamp in database: '{}'", s))?
        .with_timezone(&Utc))
}

fn parse_opt_ts(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_ts).transpose()
}

fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date in database: '{}'", s))
}

fn parse_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
    s.as_deref().map(parse_date).transpose()
}

fn to_json_list(items: &[String]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

fn from_json_list(s: &str) -> Result<Vec<String>> {
    serde_json::from_str(s).with_context(|| format!("invalid JSON list in database: '{}'", s))
}

fn task_from_row(row: &SqliteRow) -> Result<Task> {
    let coluna: String = row.try_get("coluna")?;
    let prioridade: String = row.try_get("prioridade")?;
    let responsaveis: String = row.try_get("responsaveis")?;
    let tags: String = row.try_get("tags")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Task {
        id: row.try_get("id")?,
        titulo: row.try_get("titulo")?,
        descricao: row.try_get("descricao")?,
        coluna: coluna.parse()?,
        prioridade: prioridade.parse()?,
        responsaveis: from_json_list(&responsaveis)?,
        projeto: row.try_get("projeto")?,
        cliente: row.try_get("cliente")?,
        prazo: parse_opt_ts(row.try_get("prazo")?)?,
        estimativa: row.try_get("estimativa")?,
        tags: from_json_list(&tags)?,
        sprint_id: row.try_get("sprint_id")?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn contract_from_row(row: &SqliteRow) -> Result<Contract> {
    let tipo: String = row.try_get("tipo")?;
    let status: String = row.try_get("status")?;
    let periodicidade: Option<String> = row.try_get("periodicidade")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Contract {
        id: row.try_get("id")?,
        titulo: row.try_get("titulo")?,
        tipo: tipo.parse()?,
        contratante: row.try_get("contratante")?,
        contratado: row.try_get("contratado")?,
        valor: row.try_get("valor")?,
        periodicidade: periodicidade.map(|p| p.parse()).transpose()?,
        status: status.parse()?,
        data_inicio: parse_opt_ts(row.try_get("data_inicio")?)?,
        data_fim: parse_opt_ts(row.try_get("data_fim")?)?,
        descricao: row.try_get("descricao")?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn project_from_row(row: &SqliteRow) -> Result<Project> {
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Project {
        id: row.try_get("id")?,
        nome: row.try_get("nome")?,
        descricao: row.try_get("descricao")?,
        cor: row.try_get("cor")?,
        icone: row.try_get("icone")?,
        cliente_nome: row.try_get("cliente_nome")?,
        data_inicio: parse_opt_date(row.try_get("data_inicio")?)?,
        data_fim: parse_opt_date(row.try_get("data_fim")?)?,
        status: status.parse()?,
        progresso: row.try_get("progresso")?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn tag_from_row(row: &SqliteRow) -> Result<Tag> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Tag {
        id: row.try_get("id")?,
        nome: row.try_get("nome")?,
        cor: row.try_get("cor")?,
        icone: row.try_get("icone")?,
        escopo: row.try_get("escopo")?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn sprint_from_row(row: &SqliteRow) -> Result<Sprint> {
    let status: String = row.try_get("status")?;
    let data_inicio: String = row.try_get("data_inicio")?;
    let data_fim: String = row.try_get("data_fim")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Sprint {
        id: row.try_get("id")?,
        projeto_id: row.try_get("projeto_id")?,
        nome: row.try_get("nome")?,
        objetivo: row.try_get("objetivo")?,
        data_inicio: parse_date(&data_inicio)?,
        data_fim: parse_date(&data_fim)?,
        data_conclusao: parse_opt_date(row.try_get("data_conclusao")?)?,
        status: status.parse()?,
        meta_pontos: row.try_get("meta_pontos")?,
        pontos_concluidos: row.try_get("pontos_concluidos")?,
        ordem: row.try_get("ordem")?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction> {
    let tipo: String = row.try_get("tipo")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Transaction {
        id: row.try_get("id")?,
        tipo: tipo.parse()?,
        categoria: row.try_get("categoria")?,
        descricao: row.try_get("descricao")?,
        valor: row.try_get("valor")?,
        data_transacao: parse_opt_ts(row.try_get("data_transacao")?)?,
        data_vencimento: parse_opt_ts(row.try_get("data_vencimento")?)?,
        data_pagamento: parse_opt_ts(row.try_get("data_pagamento")?)?,
        status: status.parse()?,
        projeto: row.try_get("projeto")?,
        contrato_id: row.try_get("contrato_id")?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

impl SqliteStore {
    async fn delete_row(&self, table: &str, id: i64) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch_row(&self, table: &str, id: i64) -> Result<Option<SqliteRow>> {
        Ok(sqlx::query(&format!("SELECT * FROM {} WHERE id = ?", table))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn write_project(&self, p: &Project) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE projetos SET
                nome = ?, descricao = ?, cor = ?, icone = ?, cliente_nome = ?,
                data_inicio = ?, data_fim = ?, status = ?, progresso = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&p.nome)
        .bind(&p.descricao)
        .bind(&p.cor)
        .bind(&p.icone)
        .bind(&p.cliente_nome)
        .bind(p.data_inicio.map(format_date))
        .bind(p.data_fim.map(format_date))
        .bind(p.status.as_str())
        .bind(p.progresso)
        .bind(format_ts(p.updated_at))
        .bind(p.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn write_tag(&self, t: &Tag) -> Result<()> {
        sqlx::query(
            "UPDATE tags SET nome = ?, cor = ?, icone = ?, escopo = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&t.nome)
        .bind(&t.cor)
        .bind(&t.icone)
        .bind(&t.escopo)
        .bind(format_ts(t.updated_at))
        .bind(t.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn write_sprint(&self, s: &Sprint) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sprints SET
                projeto_id = ?, nome = ?, objetivo = ?, data_inicio = ?, data_fim = ?,
                data_conclusao = ?, status = ?, meta_pontos = ?, pontos_concluidos = ?,
                ordem = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(s.projeto_id)
        .bind(&s.nome)
        .bind(&s.objetivo)
        .bind(format_date(s.data_inicio))
        .bind(format_date(s.data_fim))
        .bind(s.data_conclusao.map(format_date))
        .bind(s.status.as_str())
        .bind(s.meta_pontos)
        .bind(s.pontos_concluidos)
        .bind(s.ordem)
        .bind(format_ts(s.updated_at))
        .bind(s.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn write_transaction(&self, t: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE transacoes SET
                tipo = ?, categoria = ?, descricao = ?, valor = ?, data_transacao = ?,
                data_vencimento = ?, data_pagamento = ?, status = ?, projeto = ?,
                contrato_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(t.tipo.as_str())
        .bind(&t.categoria)
        .bind(&t.descricao)
        .bind(t.valor)
        .bind(t.data_transacao.map(format_ts))
        .bind(t.data_vencimento.map(format_ts))
        .bind(t.data_pagamento.map(format_ts))
        .bind(t.status.as_str())
        .bind(&t.projeto)
        .bind(t.contrato_id)
        .bind(format_ts(t.updated_at))
        .bind(t.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn write_task(&self, task: &Task) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tarefas SET
                titulo = ?, descricao = ?, coluna = ?, prioridade = ?,
                responsaveis = ?, projeto = ?, cliente = ?, prazo = ?,
                estimativa = ?, tags = ?, sprint_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.titulo)
        .bind(&task.descricao)
        .bind(task.coluna.as_str())
        .bind(task.prioridade.as_str())
        .bind(to_json_list(&task.responsaveis)?)
        .bind(&task.projeto)
        .bind(&task.cliente)
        .bind(task.prazo.map(format_ts))
        .bind(task.estimativa)
        .bind(to_json_list(&task.tags)?)
        .bind(task.sprint_id)
        .bind(format_ts(task.updated_at))
        .bind(task.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn write_contract(&self, c: &Contract) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE contratos SET
                titulo = ?, tipo = ?, contratante = ?, contratado = ?, valor = ?,
                periodicidade = ?, status = ?, data_inicio = ?, data_fim = ?,
                descricao = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&c.titulo)
        .bind(c.tipo.as_str())
        .bind(&c.contratante)
        .bind(&c.contratado)
        .bind(c.valor)
        .bind(c.periodicidade.map(|p| p.as_str()))
        .bind(c.status.as_str())
        .bind(c.data_inicio.map(format_ts))
        .bind(c.data_fim.map(format_ts))
        .bind(&c.descricao)
        .bind(format_ts(c.updated_at))
        .bind(c.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_task(&self, task: &NewTask) -> Result<Task> {
        let now = current_time();
        let result = sqlx::query(
            r#"
            INSERT INTO tarefas (titulo, descricao, coluna, prioridade, responsaveis,
                                 projeto, cliente, prazo, estimativa, tags,
                                 sprint_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.titulo)
        .bind(&task.descricao)
        .bind(task.coluna.as_str())
        .bind(task.prioridade.as_str())
        .bind(to_json_list(&task.responsaveis)?)
        .bind(&task.projeto)
        .bind(&task.cliente)
        .bind(task.prazo.map(format_ts))
        .bind(task.estimativa)
        .bind(to_json_list(&task.tags)?)
        .bind(task.sprint_id)
        .bind(format_ts(now))
        .bind(format_ts(now))
        .execute(&self.pool)
        .await?;

        Ok(task.clone().into_task(result.last_insert_rowid(), now))
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let row = sqlx::query("SELECT * FROM tarefas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(task_from_row).transpose()
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM tarefas WHERE 1 = 1");
        if let Some(coluna) = filter.coluna {
            qb.push(" AND coluna = ").push_bind(coluna.as_str());
        }
        if let Some(prioridade) = filter.prioridade {
            qb.push(" AND prioridade = ").push_bind(prioridade.as_str());
        }
        if let Some(ref who) = filter.responsavel {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(tarefas.responsaveis) WHERE value = ")
                .push_bind(who.clone())
                .push(")");
        }
        if let Some(ref projeto) = filter.projeto {
            qb.push(" AND projeto = ").push_bind(projeto.clone());
        }
        if let Some(sprint_id) = filter.sprint_id {
            qb.push(" AND sprint_id = ").push_bind(sprint_id);
        }
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit.max(0))
            .push(" OFFSET ")
            .push_bind(filter.skip.max(0));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(task_from_row).collect()
    }

    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>> {
        let Some(mut task) = self.get_task(id).await? else {
            return Ok(None);
        };
        update.apply(&mut task, current_time());
        self.write_task(&task).await?;
        Ok(Some(task))
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tarefas WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn move_task(&self, id: i64, coluna: Column) -> Result<Option<Task>> {
        let Some(mut task) = self.get_task(id).await? else {
            return Ok(None);
        };
        task.coluna = coluna;
        task.updated_at = current_time();
        self.write_task(&task).await?;
        Ok(Some(task))
    }

    async fn create_contract(&self, contract: &NewContract) -> Result<Contract> {
        let now = current_time();
        let result = sqlx::query(
            r#"
            INSERT INTO contratos (titulo, tipo, contratante, contratado, valor,
                                   periodicidade, status, data_inicio, data_fim,
                                   descricao, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contract.titulo)
        .bind(contract.tipo.as_str())
        .bind(&contract.contratante)
        .bind(&contract.contratado)
        .bind(contract.valor)
        .bind(contract.periodicidade.map(|p| p.as_str()))
        .bind(contract.status.as_str())
        .bind(contract.data_inicio.map(format_ts))
        .bind(contract.data_fim.map(format_ts))
        .bind(&contract.descricao)
        .bind(format_ts(now))
        .bind(format_ts(now))
        .execute(&self.pool)
        .await?;

        Ok(contract
            .clone()
            .into_contract(result.last_insert_rowid(), now))
    }

    async fn get_contract(&self, id: i64) -> Result<Option<Contract>> {
        let row = sqlx::query("SELECT * FROM contratos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(contract_from_row).transpose()
    }

    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM contratos WHERE 1 = 1");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(tipo) = filter.tipo {
            qb.push(" AND tipo = ").push_bind(tipo.as_str());
        }
        if let Some(ref needle) = filter.contratante {
            qb.push(" AND instr(lower(contratante), ")
                .push_bind(needle.to_lowercase())
                .push(") > 0");
        }
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit.max(0))
            .push(" OFFSET ")
            .push_bind(filter.skip.max(0));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(contract_from_row).collect()
    }

    async fn update_contract(
        &self,
        id: i64,
        update: &ContractUpdate,
    ) -> Result<Option<Contract>> {
        let Some(mut contract) = self.get_contract(id).await? else {
            return Ok(None);
        };
        update.apply(&mut contract, current_time());
        self.write_contract(&contract).await?;
        Ok(Some(contract))
    }

    async fn delete_contract(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contratos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn contracts_expiring_within(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Contract>> {
        let cutoff = Duration::try_days(days)
            .and_then(|d| now.checked_add_signed(d))
            .with_context(|| format!("expiry window of {} days is out of range", days))?;
        let cutoff = format_ts(cutoff);
        let rows = sqlx::query(
            r#"
            SELECT * FROM contratos
            WHERE status = 'active' AND data_fim IS NOT NULL AND data_fim <= ?
            ORDER BY id
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(contract_from_row).collect()
    }
}

#[async_trait]
impl ProjectStore for SqliteStore {
    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        let now = current_time();
        let result = sqlx::query(
            r#"
            INSERT INTO projetos (nome, descricao, cor, icone, cliente_nome, data_inicio,
                                  data_fim, status, progresso, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.nome)
        .bind(&project.descricao)
        .bind(&project.cor)
        .bind(&project.icone)
        .bind(&project.cliente_nome)
        .bind(project.data_inicio.map(format_date))
        .bind(project.data_fim.map(format_date))
        .bind(project.status.as_str())
        .bind(project.progresso)
        .bind(format_ts(now))
        .bind(format_ts(now))
        .execute(&self.pool)
        .await?;

        Ok(project.clone().into_project(result.last_insert_rowid(), now))
    }

    async fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let row = self.fetch_row("projetos", id).await?;
        row.as_ref().map(project_from_row).transpose()
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM projetos WHERE 1 = 1");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filter.limit.max(0))
            .push(" OFFSET ")
            .push_bind(filter.skip.max(0));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(project_from_row).collect()
    }

    async fn update_project(&self, id: i64, update: &ProjectUpdate) -> Result<Option<Project>> {
        let Some(mut project) = self.get_project(id).await? else {
            return Ok(None);
        };
        update.apply(&mut project, current_time());
        self.write_project(&project).await?;
        Ok(Some(project))
    }

    async fn delete_project(&self, id: i64) -> Result<bool> {
        self.delete_row("projetos", id).await
    }
}

#[async_trait]
impl TagStore for SqliteStore {
    async fn create_tag(&self, tag: &NewTag) -> Result<Tag> {
        let now = current_time();
        let result = sqlx::query(
            r#"
            INSERT INTO tags (nome, cor, icone, escopo, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tag.nome)
        .bind(&tag.cor)
        .bind(&tag.icone)
        .bind(&tag.escopo)
        .bind(format_ts(now))
        .bind(format_ts(now))
        .execute(&self.pool)
        .await?;

        Ok(tag.clone().into_tag(result.last_insert_rowid(), now))
    }

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        let row = self.fetch_row("tags", id).await?;
        row.as_ref().map(tag_from_row).transpose()
    }

    async fn list_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM tags WHERE 1 = 1");
        if let Some(ref escopo) = filter.escopo {
            qb.push(" AND escopo = ").push_bind(escopo.clone());
        }
        qb.push(" ORDER BY nome, id LIMIT ")
            .push_bind(filter.limit.max(0))
            .push(" OFFSET ")
            .push_bind(filter.skip.max(0));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(tag_from_row).collect()
    }

    async fn update_tag(&self, id: i64, update: &TagUpdate) -> Result<Option<Tag>> {
        let Some(mut tag) = self.get_tag(id).await? else {
            return Ok(None);
        };
        update.apply(&mut tag, current_time());
        self.write_tag(&tag).await?;
        Ok(Some(tag))
    }

    async fn delete_tag(&self, id: i64) -> Result<bool> {
        self.delete_row("tags", id).await
    }
}

#[async_trait]
impl SprintStore for SqliteStore {
    async fn create_sprint(&self, sprint: &NewSprint) -> Result<Sprint> {
        let now = current_time();
        let result = sqlx::query(
            r#"
            INSERT INTO sprints (projeto_id, nome, objetivo, data_inicio, data_fim, status,
                                 meta_pontos, ordem, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sprint.projeto_id)
        .bind(&sprint.nome)
        .bind(&sprint.objetivo)
        .bind(format_date(sprint.data_inicio))
        .bind(format_date(sprint.data_fim))
        .bind(sprint.status.as_str())
        .bind(sprint.meta_pontos)
        .bind(sprint.ordem)
        .bind(format_ts(now))
        .bind(format_ts(now))
        .execute(&self.pool)
        .await?;

        Ok(sprint.clone().into_sprint(result.last_insert_rowid(), now))
    }

    async fn get_sprint(&self, id: i64) -> Result<Option<Sprint>> {
        let row = self.fetch_row("sprints", id).await?;
        row.as_ref().map(sprint_from_row).transpose()
    }

    async fn list_sprints(&self, filter: &SprintFilter) -> Result<Vec<Sprint>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM sprints WHERE 1 = 1");
        if let Some(projeto_id) = filter.projeto_id {
            qb.push(" AND projeto_id = ").push_bind(projeto_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY ordem, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(sprint_from_row).collect()
    }

    async fn update_sprint(&self, id: i64, update: &SprintUpdate) -> Result<Option<Sprint>> {
        let Some(mut sprint) = self.get_sprint(id).await? else {
            return Ok(None);
        };
        update.apply(&mut sprint, current_time());
        self.write_sprint(&sprint).await?;
        Ok(Some(sprint))
    }

    async fn delete_sprint(&self, id: i64) -> Result<bool> {
        self.delete_row("sprints", id).await
    }
}

#[async_trait]
impl TransactionStore for SqliteStore {
    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let now = current_time();
        let result = sqlx::query(
            r#"
            INSERT INTO transacoes (tipo, categoria, descricao, valor, data_transacao,
                                    data_vencimento, data_pagamento, status, projeto,
                                    contrato_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.tipo.as_str())
        .bind(&tx.categoria)
        .bind(&tx.descricao)
        .bind(tx.valor)
        .bind(tx.data_transacao.map(format_ts))
        .bind(tx.data_vencimento.map(format_ts))
        .bind(tx.data_pagamento.map(format_ts))
        .bind(tx.status.as_str())
        .bind(&tx.projeto)
        .bind(tx.contrato_id)
        .bind(format_ts(now))
        .bind(format_ts(now))
        .execute(&self.pool)
        .await?;

        Ok(tx.clone().into_transaction(result.last_insert_rowid(), now))
    }

    async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let row = self.fetch_row("transacoes", id).await?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM transacoes WHERE 1 = 1");
        if let Some(tipo) = filter.tipo {
            qb.push(" AND tipo = ").push_bind(tipo.as_str());
        }
        if let Some(ref categoria) = filter.categoria {
            qb.push(" AND categoria = ").push_bind(categoria.clone());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(ref projeto) = filter.projeto {
            qb.push(" AND projeto = ").push_bind(projeto.clone());
        }
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit.max(0))
            .push(" OFFSET ")
            .push_bind(filter.skip.max(0));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn update_transaction(
        &self,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Option<Transaction>> {
        let Some(mut tx) = self.get_transaction(id).await? else {
            return Ok(None);
        };
        update.apply(&mut tx, current_time());
        self.write_transaction(&tx).await?;
        Ok(Some(tx))
    }

    async fn delete_transaction(&self, id: i64) -> Result<bool> {
        self.delete_row("transacoes", id).await
    }
}
