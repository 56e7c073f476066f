//! # CORS headers for `tower` services
//!
//! Build a [`Policy`] from a list of [`CorsOption`]s and put it in front of
//! any HTTP service with [`Policy::wrap`] or [`CorsLayer`]. Every response
//! then carries the configured `Access-Control-Allow-*` headers, and
//! preflight (`OPTIONS`) requests are answered with `204 No Content`
//! without reaching the wrapped service.
//!
//! ```
//! use std::time::Duration;
//! use cors_headers::{CorsLayer, CorsOption, Policy};
//!
//! let policy = Policy::new(vec![
//!     CorsOption::origins(["https://a.com", "https://b.com"]),
//!     CorsOption::methods(["GET", "POST"]),
//!     CorsOption::max_age(Duration::from_secs(600)),
//! ]);
//! let layer = CorsLayer::new(policy);
//! # let _ = layer;
//! ```

pub mod config;
pub mod middleware;
pub mod policy;
pub mod services;

pub use middleware::{Cors, CorsLayer};
pub use policy::{CorsOption, Policy, PolicyBuilder};
