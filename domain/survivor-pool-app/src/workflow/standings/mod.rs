pub mod buyback;
pub mod recompute;
