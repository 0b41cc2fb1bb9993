pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod pipeline;
pub mod publish;
pub mod records;
