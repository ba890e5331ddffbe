//! CLI subcommands

pub mod render;
pub mod routes;
