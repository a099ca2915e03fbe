use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::ApiError;
use crate::api::csrf::{CSRF_HEADER, csrf_token};
use crate::config::types::ServerConfig;

/// HTTP client for the notification REST API.
///
/// Cheap to clone: `reqwest::Client` is `Arc`-backed.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

impl HttpBackend {
    pub fn new(server: &ServerConfig) -> Result<Self> {
        reqwest::Url::parse(&server.base_url)
            .with_context(|| format!("invalid server.base_url {:?}", server.base_url))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = server.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("building HTTP client")?;

        Ok(Self {
            http,
            base_url: server.base_url.trim_end_matches('/').to_owned(),
            cookie: server.cookie.clone().filter(|c| !c.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn cookie_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = self
            .cookie
            .as_deref()
            .and_then(|c| HeaderValue::from_str(c).ok())
        {
            headers.insert(COOKIE, value);
        }
        headers
    }

    /// Headers for mutating requests: cookie plus the CSRF echo.
    fn mutation_headers(&self) -> HeaderMap {
        let mut headers = self.cookie_headers();
        let token = csrf_token(self.cookie.as_deref());
        let value = HeaderValue::from_str(&token).unwrap_or_else(|_| HeaderValue::from_static(""));
        headers.insert(HeaderName::from_static(CSRF_HEADER), value);
        headers
    }

    pub(crate) async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!("api: GET {path} {query:?}");
        let mut request = self.http.get(self.url(path)).headers(self.cookie_headers());
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(path, &e))?;
        let response = check_status(path, response)?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(path, &e))?;
        serde_json::from_slice(&body).map_err(|e| ApiError::decode(path, e.to_string()))
    }

    pub(crate) async fn post<B>(&self, path: &str, body: Option<&B>) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!("api: POST {path}");
        let mut request = self
            .http
            .post(self.url(path))
            .headers(self.mutation_headers());
        if let Some(body) = body {
            let json = serde_json::to_vec(body).map_err(|e| ApiError::decode(path, e.to_string()))?;
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(json);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(path, &e))?;
        check_status(path, response).map(drop)
    }
}

fn check_status(path: &str, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            path: path.to_owned(),
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(base_url: &str, cookie: Option<&str>) -> ServerConfig {
        ServerConfig {
            base_url: base_url.to_owned(),
            cookie: cookie.map(str::to_owned),
            timeout_secs: None,
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend = HttpBackend::new(&server("http://localhost:8000/", None)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(
            backend.url("/notifications/"),
            "http://localhost:8000/notifications/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(HttpBackend::new(&server("not a url", None)).is_err());
    }

    #[test]
    fn mutation_headers_carry_csrf_even_without_cookie() {
        let backend = HttpBackend::new(&server("http://localhost", None)).unwrap();
        let headers = backend.mutation_headers();
        assert_eq!(headers.get(CSRF_HEADER).unwrap(), "");
        assert!(headers.get(COOKIE).is_none());

        let backend =
            HttpBackend::new(&server("http://localhost", Some("csrftoken=abc; a=b"))).unwrap();
        let headers = backend.mutation_headers();
        assert_eq!(headers.get(CSRF_HEADER).unwrap(), "abc");
        assert_eq!(headers.get(COOKIE).unwrap(), "csrftoken=abc; a=b");
    }
}
