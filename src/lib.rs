pub mod config;
pub mod history;
pub mod logging;
pub mod report;
