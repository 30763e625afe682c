//! Core functionality: document model, editing operations, key interpretation,
//! persistence and configuration

pub mod config;
pub mod error;
pub mod interpreter;
pub mod model;
pub mod operations;
pub mod persistence;
pub mod raw;
pub mod styles;
