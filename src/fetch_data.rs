//! Verb helpers returning a uniform [`FetchDataResult`]

use crate::auth_client::AuthenticatedFetch;
use crate::config::ClientConfig;
use crate::constants::NO_SERVER_RESPONSE;
use crate::error::Result;
use crate::types::{FetchDataResult, RequestDescriptor};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// REST helpers over an [`AuthenticatedFetch`] implementation
///
/// Every helper reads the response body as JSON, whatever the status. A body
/// that is not valid JSON is reported as `Err(ClientError::Serialization)`;
/// every other outcome is folded into the returned envelope.
pub struct ApiClient<C> {
    client: Arc<C>,
    config: ClientConfig,
}

impl<C> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: self.config.clone(),
        }
    }
}

impl<C: AuthenticatedFetch> ApiClient<C> {
    pub fn new(client: Arc<C>, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `path`, merging `headers` over the JSON content type
    pub async fn get_data(&self, path: &str, headers: &[(&str, &str)]) -> Result<FetchDataResult> {
        let request = self
            .request(Method::GET, path)
            .headers(headers.iter().copied());
        self.fetch(request).await
    }

    pub async fn post_data<B>(&self, path: &str, body: &B) -> Result<FetchDataResult>
    where
        B: Serialize + ?Sized,
    {
        let request = self
            .request(Method::POST, path)
            .json(serde_json::to_value(body)?);
        self.fetch(request).await
    }

    pub async fn put_data<B>(&self, path: &str, body: &B) -> Result<FetchDataResult>
    where
        B: Serialize + ?Sized,
    {
        let request = self
            .request(Method::PUT, path)
            .json(serde_json::to_value(body)?);
        self.fetch(request).await
    }

    /// DELETE `path`; a missing or falsy body (`null`, `false`, `0`, `""`)
    /// sends no body at all
    pub async fn delete_data(&self, path: &str, body: Option<&Value>) -> Result<FetchDataResult> {
        let mut request = self.request(Method::DELETE, path);
        if let Some(body) = body.filter(|body| is_truthy(body)) {
            request = request.json(body.clone());
        }
        self.fetch(request).await
    }

    fn request(&self, method: Method, path: &str) -> RequestDescriptor {
        RequestDescriptor::new(method, self.config.url(path))
            .header(CONTENT_TYPE.as_str(), "application/json")
    }

    async fn fetch(&self, request: RequestDescriptor) -> Result<FetchDataResult> {
        let method = request.method.clone();
        let url = request.url.clone();

        // Transport absence and a missing token look the same here
        let Some(response) = self.client.authenticated_fetch(request).await else {
            debug!(method = %method, url = %url, "No server response");
            return Ok(FetchDataResult::err(NO_SERVER_RESPONSE));
        };

        let status = response.status();
        // Parsed whatever the status; a non-JSON body is an error
        let bytes = response.bytes().await?;
        let data: Value = serde_json::from_slice(&bytes)?;

        if status.is_success() {
            Ok(FetchDataResult::ok(data))
        } else {
            debug!(method = %method, url = %url, status = %status, "Request returned an error");
            Ok(FetchDataResult::err(error_message(&data)))
        }
    }
}

/// The `error` field of an error body, or an empty string when it is missing
/// or falsy (`null`, `false`, `0`, `""`)
fn error_message(data: &Value) -> String {
    match data.get("error") {
        Some(error) if !is_truthy(error) => String::new(),
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_client::AuthClientNoop;
    use serde_json::json;

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(&json!({ "error": "Invalid filter" })), "Invalid filter");
        assert_eq!(error_message(&json!({ "detail": "nope" })), "");
        assert_eq!(error_message(&json!({ "error": null })), "");
        assert_eq!(error_message(&json!({ "error": 0 })), "");
        assert_eq!(error_message(&json!({ "error": { "code": 7 } })), r#"{"code":7}"#);
        assert_eq!(error_message(&json!(["not", "an", "object"])), "");
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
    }

    #[tokio::test]
    async fn test_every_helper_reports_missing_response() {
        let config = ClientConfig::new("http://localhost:1/aomail/").unwrap();
        let api = ApiClient::new(AuthClientNoop::new(), config);
        let expected = FetchDataResult::err("No server response");

        assert_eq!(api.get_data("users/", &[]).await.unwrap(), expected);
        assert_eq!(api.post_data("users/", &json!({ "a": 1 })).await.unwrap(), expected);
        assert_eq!(api.put_data("users/1/", &json!({ "a": 2 })).await.unwrap(), expected);
        assert_eq!(api.delete_data("users/1/", None).await.unwrap(), expected);
    }
}
