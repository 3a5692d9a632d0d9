//! Style and voice memory for the Olivetti writing assistant.
//!
//! Olivetti keeps writing samples in small, capacity-bounded banks and hands the
//! closest ones back as exemplars when a draft needs continuing. Banks are
//! partitioned by writing *lane* and by *identity* (a named style or a trained
//! voice):
//!
//! | Kind | Identity | Capacity | Eviction |
//! |------|----------|----------|----------|
//! | **Style** | Named prose style ("Noir", "Lyrical") | 250 per lane | Oldest first |
//! | **Voice** | Trained author voice | 60 per lane | Oldest first |
//!
//! # Architecture
//!
//! - **Vectors**: feature hashing over lowercased word tokens (SHA-256 bucket
//!   index, L2-normalized). No model download, no network.
//! - **Retrieval**: cosine similarity, top-K, ties in insertion order
//! - **Storage**: one JSON snapshot, written via temp file + rename, with a
//!   rotating chain of backups and fallback on load
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP/SSE, plus a CLI
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`embedding`] — Text-to-vector encoding via feature hashing
//! - [`error`] — The [`error::MemoryError`] type shared by the library
//! - [`memory`] — Banks, retrieval, lane detection, and the [`memory::MemoryEngine`] façade
//! - [`provider`] — Completion backends used to draft text from assembled prompts
//! - [`storage`] — Snapshot format, atomic saves, backup rotation, and health checks

pub mod config;
pub mod embedding;
pub mod error;
pub mod memory;
pub mod provider;
pub mod storage;
