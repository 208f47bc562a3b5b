//! Cookbook Tools module
//!
//! MCP tool implementations for the Science Cookbook.

pub mod quantities;
pub mod recipes;
pub mod status;
