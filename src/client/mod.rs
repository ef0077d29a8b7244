//! HTTP client module

pub mod agent;

pub use agent::AgentClient;
