// Adapters layer: concrete implementations for external systems
// (vision model backends, carrier tracking API, shared http plumbing).

pub mod carrier;
pub mod http;
pub mod vision;
