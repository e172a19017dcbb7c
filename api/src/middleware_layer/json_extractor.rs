use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::core::http::{
    request_id::{REQUEST_ID_HEADER, ensure_request_id},
    response_envelope::{ApiErrorDetail, ApiResponse},
};

/// Request bodies of rejected requests are short plain-text messages.
const MAX_REJECTION_BODY: usize = 64 * 1024;

/// Fields of the JSON request bodies, used to point at the offending one.
const KNOWN_FIELDS: &[&str] = &["question", "k", "text", "title", "url"];

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_REJECTION_BODY)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    KNOWN_FIELDS
        .iter()
        .find(|key| msg.contains(&format!("`{key}`")))
        .map(|key| key.to_string())
}

fn hint_for(msg: &str) -> Option<String> {
    if msg.contains("missing field") {
        Some("Add the missing field to the JSON body.".into())
    } else if msg.contains("invalid type") {
        Some("Check the field types (e.g. `k` must be an integer).".into())
    } else if msg.contains("Content-Type") {
        Some("Send the body with `Content-Type: application/json`.".into())
    } else if msg.contains("expected a map") || msg.contains("expected struct") {
        Some("Expected a JSON object here (e.g. { \"question\": \"...\" }).".into())
    } else {
        None
    }
}

fn is_mapped(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::PAYLOAD_TOO_LARGE
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::UNPROCESSABLE_ENTITY
    )
}

fn code_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        _ => "BAD_REQUEST",
    }
}

/// Wraps axum's plain-text extractor rejections into the JSON envelope.
///
/// The request id is settled before the handler runs, so handler logs and the
/// `x-request-id` response header agree. Responses that already carry JSON
/// (handler errors) pass through untouched.
pub async fn json_error_mapper(mut req: Request<Body>, next: Next) -> Response {
    let req_id = ensure_request_id(req.headers_mut());

    let res = next.run(req).await;
    let status = res.status();

    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if !is_mapped(status) || is_json {
        let (mut parts, body) = res.into_parts();
        parts.headers.insert(REQUEST_ID_HEADER, req_id);
        return Response::from_parts(parts, body);
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    debug!(
        request_id = req_id.to_str().unwrap_or("-"),
        %status,
        rejection = %original.trim(),
        "request rejected"
    );

    let detail = ApiErrorDetail {
        path: guess_path_from_serde_msg(&original),
        hint: hint_for(&original),
    };
    let details = if detail.path.is_some() || detail.hint.is_some() {
        vec![detail]
    } else {
        Vec::new()
    };

    let envelope = ApiResponse::<()>::error(code_for(status), original.trim(), details);

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(REQUEST_ID_HEADER, req_id);
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_and_hint_are_guessed() {
        let msg = "Failed to deserialize the JSON body into the target type: missing field `question` at line 1 column 2";
        assert_eq!(guess_path_from_serde_msg(msg).as_deref(), Some("question"));
        assert!(hint_for(msg).unwrap().contains("missing field"));
        assert_eq!(guess_path_from_serde_msg("nothing here"), None);
    }

    #[test]
    fn only_rejection_statuses_are_mapped() {
        assert!(is_mapped(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(!is_mapped(StatusCode::OK));
        assert!(!is_mapped(StatusCode::BAD_GATEWAY));
        assert_eq!(code_for(StatusCode::PAYLOAD_TOO_LARGE), "PAYLOAD_TOO_LARGE");
    }
}
