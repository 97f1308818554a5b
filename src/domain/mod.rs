// Domain layer: request and model types plus the ports the core depends on.

pub mod model;
pub mod ports;
