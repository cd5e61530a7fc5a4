pub mod analyzers;
pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod report;
pub mod stats;
pub mod table;
pub mod validator;
