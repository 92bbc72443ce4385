//! # EdiHub
//!
//! Task and contract management backend with lexical similarity search.
//!
//! Tasks (`tarefas`) and contracts (`contratos`) live in SQLite next to
//! projects, tags, sprints and financial transactions. A query is
//! scored against each record's title and description with an amplified
//! Jaccard overlap; tasks additionally receive project and priority boosts
//! before the per-kind results are merged and paginated.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌─────────────┐
//! │   CLI    │──▶│ edihub-core  │──▶│ SqliteStore │
//! │  (clap)  │   │ search/score │   │   (sqlx)    │
//! └──────────┘   └──────▲───────┘   └─────────────┘
//!                       │
//!                ┌──────┴─────┐
//!                │    HTTP    │
//!                │   (axum)   │
//!                └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! edihub init                              # create database
//! edihub import seed.json                  # bulk-load tasks and contracts
//! edihub search "contrato de nda" --tipo contratos
//! edihub serve                             # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite implementation of the storage traits |
//! | [`search`] | Search entry points for CLI and server |
//! | [`import`] | Bulk JSON import |
//! | [`server`] | HTTP API server |

pub mod config;
pub mod db;
pub mod import;
pub mod migrate;
pub mod search;
pub mod server;
pub mod sqlite_store;
