//! Command implementations for the reportcheck CLI

pub mod check;
pub mod config;
