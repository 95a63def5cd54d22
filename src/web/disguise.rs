//! Intentionally misleading front door.
//!
//! The root path answers with a generic 404 page regardless of method,
//! query, or headers, so casual probes conclude nothing is deployed here.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

const DISGUISE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>404 Not Found</title>
    <style>
        body { font-family: Arial, sans-serif; text-align: center; padding: 50px; background: #f5f5f5; }
        .error { font-size: 72px; color: #999; margin-bottom: 20px; }
        .message { font-size: 18px; color: #666; }
    </style>
</head>
<body>
    <div class="error">404</div>
    <div class="message">Page Not Found</div>
</body>
</html>
"#;

/// `/` -- the disguise response. Always HTTP 404 with a static HTML body.
pub fn root() -> Response {
    (
        StatusCode::NOT_FOUND,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        DISGUISE_HTML,
    )
        .into_response()
}
