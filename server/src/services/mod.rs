pub mod enricher;
pub mod roster;
pub mod search;
pub mod wealth;
