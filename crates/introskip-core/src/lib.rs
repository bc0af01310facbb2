pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod monitor;
pub mod normalize;
pub mod resolver;
pub mod segments;
pub mod storage;
