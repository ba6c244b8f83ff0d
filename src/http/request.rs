//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for requests that arrive without one
//! - Propagate the ID onto the response so clients can quote it
//! - Expose the ID to handlers and log lines
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept, never overwritten

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Layer that stamps missing request IDs onto incoming requests.
pub fn set_request_id_layer() -> SetRequestIdLayer<UuidRequestId> {
    SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

fn header_request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(&X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Read access to the request ID.
pub trait RequestIdExt {
    /// The request ID, if the request carries a readable one.
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        header_request_id(self.headers())
    }
}

/// Extractor yielding the request ID stamped by the request-id layer.
#[derive(Debug, Clone, Default)]
pub struct CurrentRequestId(pub Option<String>);

impl CurrentRequestId {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for CurrentRequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(header_request_id(&parts.headers).map(str::to_string)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn generates_uuid_ids() {
        let request = Request::new(Body::empty());
        let id = UuidRequestId.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[test]
    fn ids_are_unique() {
        let request = Request::new(Body::empty());
        let mut maker = UuidRequestId;
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }

    #[test]
    fn request_id_ext_reads_header() {
        let request = Request::builder()
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request.request_id(), Some("abc-123"));

        let bare = Request::new(Body::empty());
        assert_eq!(bare.request_id(), None);
    }

    #[tokio::test]
    async fn extractor_reads_header() {
        let (mut parts, _) = Request::builder()
            .header("x-request-id", "abc-123")
            .body(())
            .unwrap()
            .into_parts();
        let id = CurrentRequestId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id.as_deref(), Some("abc-123"));
    }
}
