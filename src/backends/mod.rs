pub mod flat;
pub mod linked;
pub mod offloaded;
