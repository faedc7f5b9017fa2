pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod execution;
pub mod expression;
pub mod storage;
pub mod utils;
