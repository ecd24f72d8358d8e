pub mod args;
pub mod config;
pub mod docs_cmd;
pub mod output;
pub mod search_cmd;
pub mod status_cmd;
