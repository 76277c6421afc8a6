pub mod client;
pub mod config;
pub mod constants;
pub mod driver;
pub mod evaluator;
pub mod keyring;
pub mod message;
pub mod session;
pub mod tools;
pub mod turn;
