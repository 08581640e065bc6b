//! Blocking HTTP client shared by `curl` and `wget`.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;

use crate::error::{Error, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: Option<String>,
    pub url: String,
    pub headers: Vec<String>,
    pub body: Option<String>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Explicit method, else POST when a body is present, else GET.
    pub fn method(&self) -> Result<Method> {
        match &self.method {
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| Error::invalid_value("method", m)),
            None if self.body.is_some() => Ok(Method::POST),
            None => Ok(Method::GET),
        }
    }
}

/// Split `Name: value`.
pub fn parse_header(line: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| Error::invalid_value("header", line))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| Error::invalid_value("header", line))?;
    let value =
        HeaderValue::from_str(value.trim()).map_err(|_| Error::invalid_value("header", line))?;
    Ok((name, value))
}

/// Last non-empty path segment of `url`, or `index.html`.
pub fn file_name(url: &str) -> String {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    path.rsplit('/')
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "index.html".to_string())
}

fn client() -> Result<Client> {
    Client::builder()
        .user_agent(format!("kit/{}", VERSION))
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| Error::network(format!("cannot create HTTP client: {}", e)))
}

/// Send `request` and return the response, whatever its status.
pub fn send(request: &Request) -> Result<Response> {
    let method = request.method()?;
    tracing::debug!(%method, url = %request.url, "http request");
    let mut builder = client()?.request(method, &request.url);
    for line in &request.headers {
        let (name, value) = parse_header(line)?;
        builder = builder.header(name, value);
    }
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }
    builder
        .send()
        .map_err(|e| Error::network(format!("{}: {}", request.url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_implies_post() {
        let mut req = Request::get("http://example.com");
        assert_eq!(req.method().unwrap(), Method::GET);
        req.body = Some("a=1".to_string());
        assert_eq!(req.method().unwrap(), Method::POST);
        req.method = Some("put".to_string());
        assert_eq!(req.method().unwrap(), Method::PUT);
    }

    #[test]
    fn headers_split_on_first_colon() {
        let (name, value) = parse_header("X-Token: a:b").unwrap();
        assert_eq!(name.as_str(), "x-token");
        assert_eq!(value.to_str().unwrap(), "a:b");
        assert!(parse_header("no colon").is_err());
    }

    #[test]
    fn file_name_from_url_path() {
        assert_eq!(file_name("https://example.com/a/b.tar.gz?x=1"), "b.tar.gz");
        assert_eq!(file_name("https://example.com/dir/"), "dir");
        assert_eq!(file_name("https://example.com"), "index.html");
    }
}
