//! Port trait definitions (Hexagonal Architecture)
//!
//! The downloader core depends only on these capability traits:
//! - GameTransport: one GET of one game record
//! - GameFilter: whether a candidate should be attempted at all

pub mod filter;
pub mod transport;

pub use filter::{AcceptAll, GameFilter};
pub use transport::GameTransport;
