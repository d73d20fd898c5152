//! # compliance-entity
//!
//! Domain entity models. Every struct in this crate represents a database
//! table row or a domain value object. Row structs additionally derive
//! `sqlx::FromRow`.

pub mod conversation;
pub mod message;
pub mod processing_log;
