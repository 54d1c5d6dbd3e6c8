pub mod gemini_llm;
pub mod openai_compatible_llm;
pub mod stateless_llm_interface;

pub use gemini_llm::*;
pub use openai_compatible_llm::*;
pub use stateless_llm_interface::*;
