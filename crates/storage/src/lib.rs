#![forbid(unsafe_code)]

//! The Progress Store collaborator: the repository contract the core
//! consumes, an in-memory implementation, and a `SQLite` backend.

pub mod repository;
pub mod sqlite;
