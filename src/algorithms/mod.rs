pub mod a_star;
pub mod common;
pub mod cost;
pub mod frontier;
pub mod reference;
