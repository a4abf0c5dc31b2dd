pub mod error;
pub mod names;
pub mod types;

pub use error::ScriptPropsError;
pub use names::escape_entities;
pub use types::*;
