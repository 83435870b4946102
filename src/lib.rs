//! emoji-judge - vision-model judging service for a webcam match-the-emoji game
//!
//! This library provides the HTTP surface, payload normalization, remote judge
//! client and readiness tracking behind the `emoji-judge` binary.

pub mod agent;
pub mod api;
pub mod cli;
pub mod config;
pub mod health;
pub mod judge;
pub mod logging;
pub mod metrics;
