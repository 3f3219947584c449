pub mod analytics;
pub mod assessor;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod normalizer;
pub mod prompt;
pub mod types;
