pub mod contracts;
pub mod encode;
pub mod gemini;

pub use contracts::*;
pub use encode::*;
pub use gemini::*;
