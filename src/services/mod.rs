//! # Services behind the middleware

use std::{io, path::Path};

use http::Response;
use http_body::combinators::UnsyncBoxBody;
use hyper::body::{Bytes, HttpBody};
use tower::util::MapResponse;
use tower_http::services::{fs::ServeFileSystemResponseBody, ServeDir};

pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

fn new_io_error<E: std::error::Error + Send + Sync + 'static>(error: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, error)
}

/// Erase the body type of a response
///
/// The boxed body has a [`Default`], which the preflight responses need.
pub fn response_to_boxed_error_io<B: http_body::Body<Data = Bytes> + Send + 'static>(
    r: Response<B>,
) -> Response<ResponseBody>
where
    B::Error: std::error::Error + Send + Sync + 'static,
{
    r.map(|b| HttpBody::map_err(b, new_io_error).boxed_unsync())
}

pub type BoxResponse = fn(Response<ServeFileSystemResponseBody>) -> Response<ResponseBody>;

pub type PublicDir = MapResponse<ServeDir, BoxResponse>;

/// Serve the files in `path`
pub fn public<P: AsRef<Path>>(path: P) -> PublicDir {
    MapResponse::new(ServeDir::new(path), response_to_boxed_error_io as BoxResponse)
}

#[cfg(test)]
mod tests {
    use http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, Method, Request, StatusCode};
    use hyper::Body;
    use tower::{ServiceBuilder, ServiceExt};

    use crate::{middleware::CorsLayer, policy::CorsOption, Policy};

    fn policy() -> Policy {
        Policy::new(vec![CorsOption::origins(["https://a.com"])])
    }

    fn request(method: Method) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/missing.txt")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_keeps_cors_headers() {
        let service = ServiceBuilder::new()
            .layer(CorsLayer::new(policy()))
            .service(super::public("does-not-exist"));
        let response = service.oneshot(request(Method::GET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://a.com"
        );
    }

    #[tokio::test]
    async fn test_preflight_skips_directory() {
        let service = ServiceBuilder::new()
            .layer(CorsLayer::new(policy()))
            .service(super::public("does-not-exist"));
        let response = service.oneshot(request(Method::OPTIONS)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert!(body.is_empty());
    }
}
