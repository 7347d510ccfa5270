// Library for tests to access modules

pub mod aggregator;
pub mod collector;
pub mod config;
pub mod gauge;
pub mod history_repo;
pub mod kbucket;
pub mod log_scanner;
pub mod models;
pub mod version;
