pub mod config;
pub mod engine;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod publish;
pub mod report;
pub mod roster;
pub mod source;
