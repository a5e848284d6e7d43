use crate::tracing::RequestId;
use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied id that is trusted as-is
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Caller's `x-request-id` when it is usable for log correlation: printable
/// ASCII, no blanks, at most [`MAX_REQUEST_ID_LEN`] bytes.
pub fn caller_request_id(headers: &HeaderMap) -> Option<RequestId> {
    let raw = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let usable = !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw.bytes().all(|b| b.is_ascii_graphic());
    usable.then(|| RequestId::new(raw))
}

/// Tags every request with an id, minting one when the caller's is missing
/// or unusable. The id is visible to handlers (extension and task-local) and
/// returned on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = caller_request_id(request.headers()).unwrap_or_default();
    let header_value = HeaderValue::from_str(request_id.as_str()).ok();

    if let Some(value) = &header_value {
        request
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value.clone());
    }
    request.extensions_mut().insert(request_id.clone());

    let mut response =
        crate::tracing::scope_request_id(request_id, async move { next.run(request).await })
            .await;

    if let Some(value) = header_value {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        extract::Extension,
        http::Request as HttpRequest,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn headers_with(value: HeaderValue) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, value);
        headers
    }

    async fn echo_extension(Extension(request_id): Extension<RequestId>) -> String {
        request_id.as_str().to_string()
    }

    async fn send(request_id: Option<HeaderValue>) -> (Option<HeaderValue>, String) {
        let app = Router::new()
            .route("/orders", get(echo_extension))
            .layer(axum::middleware::from_fn(request_id_middleware));

        let mut builder = HttpRequest::builder().uri("/orders");
        if let Some(value) = request_id {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response.headers().get(REQUEST_ID_HEADER).cloned();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (header, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn dispatcher_trace_id_is_accepted() {
        let headers = headers_with(HeaderValue::from_static(" yard-3:shift-b.0042 "));
        assert_eq!(
            caller_request_id(&headers).map(|id| id.as_str().to_string()),
            Some("yard-3:shift-b.0042".to_string())
        );
    }

    #[test]
    fn non_ascii_id_is_rejected() {
        let value = HeaderValue::from_bytes("отгрузка-7".as_bytes()).unwrap();
        assert!(caller_request_id(&headers_with(value)).is_none());
    }

    #[test]
    fn blank_or_spaced_or_oversized_ids_are_rejected() {
        assert!(caller_request_id(&headers_with(HeaderValue::from_static("   "))).is_none());
        assert!(caller_request_id(&headers_with(HeaderValue::from_static("batch B-001"))).is_none());

        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        let value = HeaderValue::from_str(&long).unwrap();
        assert!(caller_request_id(&headers_with(value)).is_none());
        assert!(caller_request_id(&HeaderMap::new()).is_none());
    }

    #[tokio::test]
    async fn usable_caller_id_reaches_handler_and_response() {
        let (header, body) = send(Some(HeaderValue::from_static("so-1042"))).await;
        assert_eq!(header.unwrap(), "so-1042");
        assert_eq!(body, "so-1042");
    }

    #[tokio::test]
    async fn unusable_caller_id_is_replaced() {
        let value = HeaderValue::from_bytes("отгрузка-7".as_bytes()).unwrap();
        let (header, body) = send(Some(value)).await;

        let header = header.unwrap();
        let minted = header.to_str().unwrap();
        assert!(!minted.is_empty());
        assert_ne!(minted, "отгрузка-7");
        assert_eq!(body, minted);
    }

    #[tokio::test]
    async fn missing_id_is_minted() {
        let (header, body) = send(None).await;
        assert_eq!(header.unwrap().to_str().unwrap(), body);
        assert!(!body.is_empty());
    }
}
