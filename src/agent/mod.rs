pub mod input_types;
pub mod output_types;
pub mod prompt;
pub mod reply_parser;
pub mod stateless_llm_factory;

pub mod agents;
pub mod stateless_llm;

pub use agents::*;
pub use input_types::*;
pub use output_types::*;
pub use stateless_llm_factory::*;
