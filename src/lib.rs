//! Science Cookbook Library
//!
//! Recipe quantity normalization, gram estimation, scaling and display.

pub mod build_info;
pub mod config;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod quantity;
pub mod region;
pub mod tools;
