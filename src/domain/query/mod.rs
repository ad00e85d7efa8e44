//! Query domain - keys, descriptions and states for cached reads

mod definition;
mod key;
mod state;

pub use definition::{is_present, present, Query, StalePolicy};
pub use key::{KeyPart, QueryKey};
pub use state::{QueryData, QueryState};
