// Library surface for the binary and the headless integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod info;
pub mod line;
pub mod master;
pub mod parser;
pub mod runtime;
pub mod score;
pub mod session;
pub mod store;
pub mod typing_policy;
