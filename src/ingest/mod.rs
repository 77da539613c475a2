// src/ingest/mod.rs
pub mod feed;
pub mod providers;
pub mod types;
