//! # CORS policy
//!
//! A [`Policy`] is assembled once from an ordered list of [`CorsOption`]s
//! and then shared (read-only) by every [`Cors`] service built from it.

use std::{sync::Arc, time::Duration};

use http::HeaderValue;
use tracing::warn;

use crate::middleware::{Cors, CorsLayer};

/// A single configuration step for a [`Policy`]
///
/// Each option replaces exactly one field of the policy, so when the same
/// kind of option is given twice, the later one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOption {
    /// Value of `Access-Control-Allow-Origin`
    Origins(Vec<String>),
    /// Value of `Access-Control-Allow-Methods`
    Methods(Vec<String>),
    /// Value of `Access-Control-Allow-Headers`
    Headers(Vec<String>),
    /// Value of `Access-Control-Max-Age`, sent on preflight responses only
    MaxAge(Duration),
}

fn collect<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl CorsOption {
    pub fn origins<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Origins(collect(origins))
    }

    pub fn methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Methods(collect(methods))
    }

    pub fn headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Headers(collect(headers))
    }

    pub fn max_age(age: Duration) -> Self {
        Self::MaxAge(age)
    }
}

/// Join a list into a single header value
///
/// Returns `None` for an empty result, so that the header is left out
/// instead of being sent without a value.
fn join_header_value(field: &'static str, items: &[String]) -> Option<HeaderValue> {
    let value = items.join(", ");
    if value.is_empty() {
        return None;
    }
    match HeaderValue::from_str(&value) {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(field, value = %value.escape_debug(), "not a valid header value, ignoring");
            None
        }
    }
}

/// The fixed set of CORS values a [`Cors`] service writes into responses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    allow_origin: Option<HeaderValue>,
    allow_methods: Option<HeaderValue>,
    allow_headers: Option<HeaderValue>,
    max_age: Option<u64>,
}

impl Policy {
    /// Build a policy by applying `options` in order
    pub fn new<I>(options: I) -> Self
    where
        I: IntoIterator<Item = CorsOption>,
    {
        let mut policy = Self::default();
        for option in options {
            policy.apply(option);
        }
        policy
    }

    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    fn apply(&mut self, option: CorsOption) {
        match option {
            CorsOption::Origins(list) => {
                self.allow_origin = join_header_value("origins", &list);
            }
            CorsOption::Methods(list) => {
                self.allow_methods = join_header_value("methods", &list);
            }
            CorsOption::Headers(list) => {
                self.allow_headers = join_header_value("headers", &list);
            }
            // Truncates to whole seconds; anything below one second is `0`
            CorsOption::MaxAge(age) => self.max_age = Some(age.as_secs()),
        }
    }

    pub fn allow_origin(&self) -> Option<&HeaderValue> {
        self.allow_origin.as_ref()
    }

    pub fn allow_methods(&self) -> Option<&HeaderValue> {
        self.allow_methods.as_ref()
    }

    pub fn allow_headers(&self) -> Option<&HeaderValue> {
        self.allow_headers.as_ref()
    }

    /// Preflight cache duration in whole seconds
    pub fn max_age(&self) -> Option<u64> {
        self.max_age
    }

    /// Decorate `inner` with this policy
    pub fn wrap<S>(self, inner: S) -> Cors<S> {
        Cors::with_shared(inner, Arc::new(self))
    }

    /// Turn this policy into a [`tower::Layer`]
    pub fn into_layer(self) -> CorsLayer {
        CorsLayer::new(self)
    }
}

/// Chained alternative to [`Policy::new`]
///
/// Calls are applied in order, exactly as the equivalent list of
/// [`CorsOption`]s would be.
#[derive(Debug, Default, Clone)]
pub struct PolicyBuilder {
    policy: Policy,
}

impl PolicyBuilder {
    pub fn option(mut self, option: CorsOption) -> Self {
        self.policy.apply(option);
        self
    }

    pub fn origins<I, S>(self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option(CorsOption::origins(origins))
    }

    pub fn methods<I, S>(self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option(CorsOption::methods(methods))
    }

    pub fn headers<I, S>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option(CorsOption::headers(headers))
    }

    pub fn max_age(self, age: Duration) -> Self {
        self.option(CorsOption::max_age(age))
    }

    pub fn build(self) -> Policy {
        self.policy
    }
}
