// File: src/core/mod.rs
pub mod config;
pub mod decompounder;
pub mod fifo;
pub mod term_pool;
pub mod types;
pub mod validator;
