mod client_error;
mod http;
pub mod kasfyi;
pub mod kaspa_rest;
pub mod kaspacom;
pub mod kasplex;
pub mod krc721;
pub mod new_mints;
mod paging;

pub use client_error::ClientError;
pub use http::UpstreamClient;
pub use kasfyi::KasFyiClient;
pub use kaspa_rest::KaspaRestClient;
pub use kaspacom::KaspaComClient;
pub use kasplex::KasplexClient;
pub use krc721::Krc721Client;
pub use new_mints::NewMintsClient;
pub use paging::collect_all_pages;
