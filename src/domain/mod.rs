// Domain layer: address models, matching policy, request context and ports.

pub mod compare;
pub mod context;
pub mod model;
pub mod ports;
