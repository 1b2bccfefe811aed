//! Configuration, wire models and input validation

pub mod config;
pub mod models;
pub mod validation;
