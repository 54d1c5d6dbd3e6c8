pub mod tutor_agent;

pub use tutor_agent::*;
