pub mod app;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod errors;
pub mod host;
pub mod managers;
pub mod node;
pub mod services;
pub mod utils;
