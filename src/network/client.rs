//! HTTP client wrapper - executes requests and collects responses

use std::time::Instant;

use crate::constants::REQUEST_TIMEOUT;
use crate::models::{is_empty_value, value_as_string, ApiResponse, HttpMethod, HttpRequest};

/// Build a request from the given parameters. Query parameters go out on every verb.
pub fn build_request(client: &reqwest::Client, request: &HttpRequest) -> reqwest::RequestBuilder {
    let url = request.url();
    let mut req_builder = match request.method {
        HttpMethod::GET => client.get(&url),
        HttpMethod::POST => client.post(&url),
        HttpMethod::PUT => client.put(&url),
        HttpMethod::PATCH => client.patch(&url),
        HttpMethod::DELETE => client.delete(&url),
    };

    if !request.params.is_empty() {
        let pairs: Vec<(&str, String)> = request
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), value_as_string(v)))
            .collect();
        req_builder = req_builder.query(&pairs);
    }

    for (key, value) in &request.headers {
        req_builder = req_builder.header(key.as_str(), value_as_string(value));
    }

    if request.method.has_body() && !is_empty_value(&request.body) {
        req_builder = req_builder.json(&request.body);
    }

    req_builder
}

/// Execute an HTTP request. Transport failures end up in `ApiResponse::error`.
pub async fn execute_request(client: &reqwest::Client, request: &HttpRequest) -> ApiResponse {
    let start = Instant::now();
    tracing::info!(method = request.method.as_str(), url = %request.url(), "Sending request");

    let result = build_request(client, request).send().await;

    let response = match result {
        Ok(resp) => {
            let status = resp.status().as_u16();
            match resp.text().await {
                Ok(body) => ApiResponse::from_parts(status, start.elapsed().as_secs_f64(), body),
                Err(e) => {
                    let mut response = ApiResponse::failed(
                        start.elapsed().as_secs_f64(),
                        format!("Error reading body: {}", e),
                    );
                    response.status_code = Some(status);
                    response
                }
            }
        }
        Err(e) => {
            let msg = if e.is_timeout() {
                format!("Request timed out ({}s)", REQUEST_TIMEOUT.as_secs())
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                format!("Request failed: {}", e)
            };
            ApiResponse::failed(start.elapsed().as_secs_f64(), msg)
        }
    };

    match &response.error {
        Some(error) => tracing::warn!(
            status = ?response.status_code,
            error = %error,
            "Request finished with error"
        ),
        None => tracing::info!(
            status = ?response.status_code,
            duration = response.duration_secs,
            "Request finished"
        ),
    }
    response
}

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
