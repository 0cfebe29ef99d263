pub mod classify;
pub mod collection_log;
pub mod collector;
pub mod config;
pub mod error;
pub mod extract;
pub mod process;
pub mod record;
pub mod report;
pub mod results;
pub mod scoring;
