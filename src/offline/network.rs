//! Network access for cache misses, installs and the order form logo

use super::http::{Request, Response};
use crate::error::{ProcurementError, ProcurementResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Network port
///
/// HTTP error statuses are returned as responses; `Err` means the request
/// never produced a response (DNS, TLS, connection reset, timeout).
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> ProcurementResult<Response>;
}

#[async_trait]
impl<N: Network + ?Sized> Network for std::sync::Arc<N> {
    async fn fetch(&self, request: &Request) -> ProcurementResult<Response> {
        (**self).fetch(request).await
    }
}

/// Blocking HTTP client run on the tokio blocking pool
#[derive(Clone)]
pub struct HttpNetwork {
    agent: ureq::Agent,
}

impl HttpNetwork {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl std::fmt::Debug for HttpNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNetwork").finish_non_exhaustive()
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> ProcurementResult<Response> {
        let agent = self.agent.clone();
        let request = request.clone();
        let url = request.url.to_string();

        tokio::task::spawn_blocking(move || blocking_fetch(&agent, &request))
            .await
            .map_err(|e| ProcurementError::network(url, format!("request task failed: {}", e)))?
    }
}

fn blocking_fetch(agent: &ureq::Agent, request: &Request) -> ProcurementResult<Response> {
    let url = request.url.as_str();
    debug!("{} {}", request.method, url);

    let result = match request.method.as_str() {
        "GET" => agent.get(url).call(),
        "HEAD" => agent.head(url).call(),
        "DELETE" => agent.delete(url).call(),
        "PUT" => agent.put(url).send_empty(),
        "PATCH" => agent.patch(url).send_empty(),
        "POST" => agent.post(url).send_empty(),
        other => {
            return Err(ProcurementError::network(
                url,
                format!("unsupported method {}", other),
            ))
        }
    };

    let mut response = result.map_err(|e| ProcurementError::network(url, e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let body = if request.method == "HEAD" {
        Vec::new()
    } else {
        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ProcurementError::network(url, format!("reading body: {}", e)))?
    };

    debug!("{} {} -> {} ({} bytes)", request.method, url, status, body.len());

    Ok(Response {
        url: url.to_string(),
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn connection_refused_is_a_network_error() {
        // Port 9 on localhost (discard) is closed in test environments
        let network = HttpNetwork::new(Duration::from_secs(2));
        let request = Request::get(Url::parse("http://127.0.0.1:9/").unwrap());

        let result = network.fetch(&request).await;
        assert!(matches!(result, Err(ProcurementError::Network { .. })));
    }

    #[tokio::test]
    async fn unsupported_method_rejected() {
        let network = HttpNetwork::new(Duration::from_secs(2));
        let request = Request::get(Url::parse("http://127.0.0.1:9/").unwrap()).with_method("BREW");

        let result = network.fetch(&request).await;
        match result {
            Err(ProcurementError::Network { reason, .. }) => {
                assert!(reason.contains("unsupported method BREW"));
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
