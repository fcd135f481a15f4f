// Domain layer: the order draft and the ports the wizard talks through.

pub mod model;
pub mod ports;
