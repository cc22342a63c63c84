pub mod commands;
pub mod provider;
