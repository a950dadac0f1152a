#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod project;
pub mod render;
pub mod schema;
pub mod validation;
