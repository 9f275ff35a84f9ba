pub mod api;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod memory;
pub mod project;
