//! Integration scenarios.

mod commands;
mod config_updates;
mod ledger_queries;
mod orderer_resolution;
