// Domain layer: core models and ports (interfaces).

pub mod model;
pub mod payload;
pub mod ports;
