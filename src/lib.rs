//! # telex-tracker
//!
//! Tracks telex work items through two independent sign-off tracks
//! (widebody and narrowbody), with free-text remarks and CSV export.
//!
//! The store is a single SQL table reached through sqlx's `Any` driver,
//! so the same binary runs against Postgres or a local SQLite file.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod model;
pub mod telemetry;
pub mod tracker;
pub mod web;
