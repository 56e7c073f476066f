use std::{
    future::{Future, Ready},
    pin::Pin,
    sync::Arc,
    task::{self, Poll},
};

use http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_MAX_AGE,
    },
    HeaderMap, HeaderValue, Method, Request, Response, StatusCode,
};
use pin_project::pin_project;
use tower::Layer;
use tower_service::Service;
use tracing::debug;

use crate::policy::Policy;

/// Headers sent with every response, preflight or not
fn append_allow_headers(policy: &Policy, headers: &mut HeaderMap) {
    if let Some(origin) = policy.allow_origin() {
        headers.append(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    }
    if let Some(methods) = policy.allow_methods() {
        headers.append(ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
    }
    if let Some(allowed) = policy.allow_headers() {
        headers.append(ACCESS_CONTROL_ALLOW_HEADERS, allowed.clone());
    }
}

fn preflight_response<B: Default>(policy: &Policy) -> Response<B> {
    let mut r = Response::new(B::default());
    *r.status_mut() = StatusCode::NO_CONTENT;
    let headers = r.headers_mut();
    append_allow_headers(policy, headers);
    if let Some(max_age) = policy.max_age() {
        headers.append(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
    }
    r
}

#[derive(Debug, Clone)]
pub struct CorsLayer {
    policy: Arc<Policy>,
}

impl CorsLayer {
    pub fn new(policy: Policy) -> Self {
        Self::with_shared(Arc::new(policy))
    }

    pub fn with_shared(policy: Arc<Policy>) -> Self {
        Self { policy }
    }
}

impl<S> Layer<S> for CorsLayer {
    type Service = Cors<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Cors::with_shared(inner, self.policy.clone())
    }
}

/// Adds the CORS headers of a [`Policy`] to every response of `S`
///
/// `OPTIONS` requests never reach `S`, they are answered with
/// `204 No Content` and an empty body right away.
#[derive(Debug, Clone)]
pub struct Cors<S> {
    inner: S,
    policy: Arc<Policy>,
}

impl<S> Cors<S> {
    pub fn new(inner: S, policy: Policy) -> Self {
        Self::with_shared(inner, Arc::new(policy))
    }

    pub fn with_shared(inner: S, policy: Arc<Policy>) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[pin_project(project = CorsFutureProj)]
pub enum CorsFuture<F, B> {
    Inner {
        #[pin]
        future: F,
        policy: Arc<Policy>,
    },
    Preflight(#[pin] Ready<Response<B>>),
}

impl<F, B, E> Future for CorsFuture<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = Result<Response<B>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            CorsFutureProj::Inner { future, policy } => {
                future.poll(cx).map_ok(|mut response| {
                    append_allow_headers(policy, response.headers_mut());
                    response
                })
            }
            CorsFutureProj::Preflight(f) => f.poll(cx).map(Ok),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for Cors<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: Default,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = CorsFuture<S::Future, ResBody>;

    fn poll_ready(&mut self, cx: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Exact token match, `options` is an extension method
        if *req.method() == Method::OPTIONS {
            debug!(uri = %req.uri(), "answering preflight request");
            let r = preflight_response(&self.policy);
            return CorsFuture::Preflight(std::future::ready(r));
        }
        CorsFuture::Inner {
            future: self.inner.call(req),
            policy: self.policy.clone(),
        }
    }
}
