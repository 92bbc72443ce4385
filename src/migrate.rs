//! Schema migrations.
//!
//! Every statement is idempotent, so `edihub init` can run repeatedly.
//! List-valued task fields (`responsaveis`, `tags`) are stored as JSON
//! arrays; timestamps are RFC 3339 strings in UTC and calendar dates are
//! `YYYY-MM-DD`.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Applies the schema to an already-open pool.
pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tarefas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            titulo TEXT NOT NULL,
            descricao TEXT,
            coluna TEXT NOT NULL DEFAULT 'todo',
            prioridade TEXT NOT NULL DEFAULT 'media',
            responsaveis TEXT NOT NULL DEFAULT '[]',
            projeto TEXT,
            cliente TEXT,
            prazo TEXT,
            estimativa INTEGER,
            tags TEXT NOT NULL DEFAULT '[]',
            sprint_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Databases created before sprints existed lack the column.
    let sprint_cols: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('tarefas') WHERE name = 'sprint_id'",
    )
    .fetch_one(pool)
    .await?;
    if sprint_cols == 0 {
        sqlx::query("ALTER TABLE tarefas ADD COLUMN sprint_id INTEGER")
            .execute(pool)
            .await?;
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contratos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            titulo TEXT NOT NULL,
            tipo TEXT NOT NULL,
            contratante TEXT NOT NULL,
            contratado TEXT,
            valor REAL,
            periodicidade TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            data_inicio TEXT,
            data_fim TEXT,
            descricao TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projetos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            descricao TEXT,
            cor TEXT NOT NULL DEFAULT '#3b82f6',
            icone TEXT,
            cliente_nome TEXT,
            data_inicio TEXT,
            data_fim TEXT,
            status TEXT NOT NULL DEFAULT 'ativo',
            progresso INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            cor TEXT,
            icone TEXT,
            escopo TEXT NOT NULL DEFAULT 'tarefa',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sprints (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            projeto_id INTEGER,
            nome TEXT NOT NULL,
            objetivo TEXT,
            data_inicio TEXT NOT NULL,
            data_fim TEXT NOT NULL,
            data_conclusao TEXT,
            status TEXT NOT NULL DEFAULT 'planejada',
            meta_pontos INTEGER,
            pontos_concluidos INTEGER NOT NULL DEFAULT 0,
            ordem INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transacoes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tipo TEXT NOT NULL,
            categoria TEXT NOT NULL,
            descricao TEXT,
            valor REAL NOT NULL,
            data_transacao TEXT,
            data_vencimento TEXT,
            data_pagamento TEXT,
            status TEXT NOT NULL DEFAULT 'pendente',
            projeto TEXT,
            contrato_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tarefas_projeto ON tarefas(projeto)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tarefas_coluna ON tarefas(coluna)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contratos_status ON contratos(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tarefas_sprint ON tarefas(sprint_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sprints_ordem ON sprints(ordem)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_transacoes_tipo ON transacoes(tipo)")
        .execute(pool)
        .await?;

    tracing::info!("schema migrations applied");
    Ok(())
}
