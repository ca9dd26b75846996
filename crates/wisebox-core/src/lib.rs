pub mod config;
pub mod events;
pub mod parser;
pub mod reducer;
pub mod state;

pub use config::*;
pub use events::*;
pub use parser::*;
pub use reducer::*;
pub use state::*;
