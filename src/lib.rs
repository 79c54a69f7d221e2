pub mod account;
pub mod block;
pub mod chain;
pub mod engine;
pub mod error;
