use axum::http::{HeaderMap, HeaderValue};
use chrono::Utc;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id carried in `headers`, or `-` when absent.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("-")
}

/// Keeps a usable caller id, otherwise mints `req-<nanos>` and stores it in `headers`.
pub fn ensure_request_id(headers: &mut HeaderMap) -> HeaderValue {
    if let Some(v) = headers
        .get(REQUEST_ID_HEADER)
        .filter(|v| v.to_str().is_ok_and(|s| !s.trim().is_empty()))
    {
        return v.clone();
    }

    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    match HeaderValue::from_str(&format!("req-{nanos}")) {
        Ok(v) => {
            headers.insert(REQUEST_ID_HEADER, v.clone());
            v
        }
        Err(_) => HeaderValue::from_static("-"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_id_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-1"));
        assert_eq!(ensure_request_id(&mut headers), "abc-1");
        assert_eq!(request_id(&headers), "abc-1");
    }

    #[test]
    fn missing_id_is_minted_into_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "-");

        let minted = ensure_request_id(&mut headers);
        assert!(minted.to_str().unwrap().starts_with("req-"));
        assert_eq!(request_id(&headers), minted.to_str().unwrap());
    }
}
