pub mod factory;
pub mod memory;
pub mod runner;
pub mod services;

pub use services::PluginServicesFactory;
