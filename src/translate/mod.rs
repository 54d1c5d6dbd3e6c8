pub mod interface;
pub mod mymemory;

pub use interface::*;
pub use mymemory::*;
