// Modules
mod cache;
mod candidates;
mod fallback;
mod probe;
mod service;

// Public exports
pub use service::DiscoveryService;
