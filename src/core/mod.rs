pub mod branch;
pub mod command;
pub mod config;
pub mod engine;
pub mod host;
pub mod lexer;
pub mod parser;
