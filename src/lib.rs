//! Paluwagan - Cycle & Payout Engine
//!
//! This crate runs rotating savings groups: it generates each group's cycle
//! schedule on activation, decides who is paid in which cycle, computes the
//! organizer fee and net payout, and reconciles member ledgers into
//! summaries and calendar events.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
