mod api_error;
pub mod helper;
pub mod market;
pub mod routes;
mod state;

pub use api_error::{ApiError, ApiResult};
pub use state::{AppState, LoadProgress, MarketState, Upstreams};
