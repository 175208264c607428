// Domain layer: record model and the store port. No transport or filesystem code here.

pub mod model;
pub mod ports;
