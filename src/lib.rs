/// Server settings shared by the CLI and the web layer.
pub mod config;
/// Database layer: open, migrate, flow CRUD.
pub mod db;
/// Crate-wide error type.
pub mod error;
/// Data types: Flow, FlowCreate, FlowUpdate, FlowListCreate.
pub mod models;
/// Upload parsing and download formatting.
pub mod transfer;
/// Axum-based web server and router.
pub mod web;

pub use error::{FlowError, Result};
