//! Real-time group chat relay library.
//!
//! Clients hold a WebSocket open, submit short text messages, and every
//! message is persisted to an append-only log and fanned out to all
//! connected sessions in a single global order. Late joiners replay the
//! log before receiving live traffic.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
