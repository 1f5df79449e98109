//! Request and response values passed between the controller, the cache
//! storage and the network

use crate::error::{ProcurementError, ProcurementResult};
use url::Url;

/// An intercepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-case HTTP method
    pub method: String,
    pub url: Url,
}

impl Request {
    /// A GET request for an absolute URL
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
        }
    }

    /// A GET request for `reference`, resolved against `scope` when relative
    pub fn resolve(scope: &Url, reference: &str) -> ProcurementResult<Self> {
        let url = scope.join(reference).map_err(|e| ProcurementError::InvalidUrl {
            url: reference.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::get(url))
    }

    /// Override the method
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Key used for cache matching: the URL without its fragment
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }
}

/// A response served either from a cache or from the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// URL the response was produced for
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// 2xx status
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with a case-insensitive name match
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
