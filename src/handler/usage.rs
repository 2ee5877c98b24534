// Usage page served at GET /

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::http;

const USAGE_HTML: &str = include_str!("usage.html");

pub fn serve_usage() -> Response<Full<Bytes>> {
    http::build_html_response(USAGE_HTML)
}
