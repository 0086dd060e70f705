pub mod cli;
pub mod config;
pub mod logging;
pub mod prompt;
pub mod record;
pub mod report;
pub mod store;
pub mod update;
pub mod util;
