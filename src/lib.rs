//! Agentwatch - Terminal client for launching and watching agent runs

pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod render;
pub mod stream;
