// Domain layer: platform data model and the ports the orchestration talks through.

pub mod model;
pub mod ports;
