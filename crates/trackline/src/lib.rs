//! Trackline - bulk import for agile boards.
//!
//! Turns loosely-structured JSON exports of boards, sprints and tickets into
//! a self-consistent set of entities with fresh ids, and keeps them in a
//! local store. Usable both as a library and through the `trackline` CLI.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod import;
pub mod storage;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations and their context
pub mod app;
pub mod commands;
pub mod config;
pub mod output;
