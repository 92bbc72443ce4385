//! # EdiHub Core
//!
//! Runtime-agnostic logic for EdiHub: the domain models, the storage
//! traits in [`store`], the lexical similarity scorer with the ranking
//! search built on top of it, sprint workflow and financial summaries.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. The application crate supplies the SQLite
//! store, configuration and HTTP surface.

pub mod finance;
pub mod models;
pub mod planning;
pub mod search;
pub mod similarity;
pub mod store;
