//! # Custom middleware

pub mod cors;
pub use cors::{Cors, CorsFuture, CorsLayer};
