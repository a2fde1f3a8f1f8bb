pub mod pipeline;
pub mod sequencer;
mod types;

pub use pipeline::{Listing, Page};
pub use sequencer::{RequestSequencer, RequestToken};
pub use types::*;
