pub mod client;
pub mod error;
pub mod types;

pub use client::IntroDbClient;
pub use error::IntroDbError;
