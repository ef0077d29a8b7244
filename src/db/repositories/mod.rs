//! Repository modules

pub mod agent;
pub mod resume;
