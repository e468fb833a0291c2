//! HTTP client for a running server.

use crate::client::NamespaceSet;
use crate::compiler::HttpMethod;
use crate::config::DEFAULT_BASE_URL;
use crate::error::{ClientError, DiscoveryError};
use crate::handlers::{HealthBody, Manifest};
use crate::response::Envelope;
use crate::sql::ParameterSet;
use serde_json::Value;
use std::time::Duration;

pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    api_base: String,
    namespaces: Option<NamespaceSet>,
}

impl RemoteClient {
    /// `base_url` is the server origin, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        RemoteClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_base: DEFAULT_BASE_URL.to_string(),
            namespaces: None,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = crate::config::normalize_base_url(&api_base.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ClientError> {
        self.http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn namespaces(&self) -> Option<&NamespaceSet> {
        self.namespaces.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the manifest and (re)build the namespace set.
    pub async fn discover(&mut self) -> Result<&NamespaceSet, ClientError> {
        let manifest = self.docs().await?;
        let descriptors = manifest.into_descriptors(&self.api_base)?;
        let set = NamespaceSet::build(&descriptors, &self.api_base);
        tracing::debug!(namespaces = set.len(), routes = descriptors.len(), "discovered routes");
        let set = self.namespaces.insert(set);
        Ok(&*set)
    }

    /// Call `namespace.operation` with `args`. Returns the envelope's `data`.
    pub async fn call(&self, namespace: &str, operation: &str, args: &ParameterSet) -> Result<Value, ClientError> {
        let set = self
            .namespaces
            .as_ref()
            .ok_or_else(|| DiscoveryError::NamespaceNotFound(namespace.to_string()))?;
        let op = set.operation(namespace, operation)?;
        let url = self.url(&op.path);
        let request = match op.method {
            HttpMethod::Get => self.http.get(url).query(&query_pairs(args)),
            HttpMethod::Post => self.http.post(url).json(args),
            HttpMethod::Put => self.http.put(url).json(args),
            // the server ignores DELETE bodies, so arguments also travel in the query
            HttpMethod::Delete => self.http.delete(url).query(&query_pairs(args)).json(args),
        };
        let response = request.send().await?;
        let status = response.status();
        let envelope: Envelope<Value> = response.json().await?;
        if !envelope.success || !status.is_success() {
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message: envelope.error.unwrap_or_else(|| status.to_string()),
            });
        }
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    pub async fn health(&self) -> Result<HealthBody, ClientError> {
        let response = self.http.get(self.url("/health")).send().await?;
        Ok(response.json().await?)
    }

    /// The `/` manifest.
    pub async fn docs(&self) -> Result<Manifest, ClientError> {
        let response = self.http.get(self.url("/")).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Query-string form of arguments; strings go as-is, other values as JSON text.
fn query_pairs(args: &ParameterSet) -> Vec<(String, String)> {
    args.iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), v)
        })
        .collect()
}
