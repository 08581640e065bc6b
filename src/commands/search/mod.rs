pub mod bsearch;
pub mod globmatch;
pub mod grep;
pub mod sed;
