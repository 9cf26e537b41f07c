// Domain layer: records and the ports the external collaborators implement.

pub mod model;
pub mod ports;
