use bytes::Bytes;
use http_body_util::Full;
use hyper::http::{HeaderName, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Deserialize;
use std::str::FromStr;

/// Canned response produced by a rule's action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockResponse {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default, with = "body_text")]
    pub body: Bytes,
}

fn default_status() -> u16 {
    200
}

mod body_text {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        Ok(Bytes::from(String::deserialize(deserializer)?))
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::new(default_status())
    }
}

impl MockResponse {
    pub fn new(status: u16) -> Self {
        MockResponse {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// 200 response with a text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok()
            .header("Content-Type", "text/plain")
            .body(body.into())
    }

    /// 200 response with a JSON body.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::ok()
            .header("Content-Type", "application/json")
            .body(value.to_string())
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn has_status(&self, status: u16) -> bool {
        self.status == status
    }

    /// Body equals `content` once decoded as UTF-8.
    pub fn has_content(&self, content: &str) -> bool {
        std::str::from_utf8(&self.body).is_ok_and(|body| body == content)
    }

    /// Convert into a `hyper` response. Invalid status codes become 500 and
    /// headers that are not valid HTTP are skipped.
    pub fn into_hyper(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) =
                (HeaderName::from_str(&name), HeaderValue::from_str(&value))
            {
                response.headers_mut().append(name, value);
            }
        }
        response
    }
}
