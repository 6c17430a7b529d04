use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        }
    }

    pub fn parse(method: &str) -> Option<HttpMethod> {
        match method {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "PATCH" => Some(HttpMethod::PATCH),
            "DELETE" => Some(HttpMethod::DELETE),
            _ => None,
        }
    }

    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

/// Method string selecting the Socket.IO transport instead of HTTP
pub const SOCKET_IO_METHOD: &str = "Socket.IO";

/// Project variables, substituted into requests as `{{name}}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    pub values: BTreeMap<String, String>,
}

impl Variables {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.values.get(key)
    }

    /// Substitutes {{variable}} patterns in text
    pub fn substitute(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (key, value) in &self.values {
            let pattern = format!("{{{{{}}}}}", key);
            result = result.replace(&pattern, value);
        }
        result
    }

    /// Substitutes every string inside a JSON value, keys excluded
    pub fn substitute_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.substitute(s)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.substitute_value(v)).collect())
            }
            Value::Object(map) => Value::Object(self.substitute_map(map)),
            other => other.clone(),
        }
    }

    pub fn substitute_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .map(|(k, v)| (k.clone(), self.substitute_value(v)))
            .collect()
    }
}

/// One request as written in `project.json`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestDef {
    #[serde(default)]
    pub desc: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub body: Value,
    /// Name of a built-in response hook
    #[serde(default)]
    pub callback: Option<String>,
    /// Socket.IO only: `{ "event": data }` emitted once connected
    #[serde(default)]
    pub emit_on_connect: Map<String, Value>,
}

impl RequestDef {
    /// Substitute variables and resolve the transport. Unknown methods give None.
    pub fn build(&self, api_base: &str, vars: &Variables) -> Option<Request> {
        let method = vars.substitute(&self.method);
        let desc = vars.substitute(&self.desc);
        let endpoint = vars.substitute(&self.endpoint);
        let params = vars.substitute_map(&self.params);

        if method == SOCKET_IO_METHOD {
            let emit = vars.substitute_map(&self.emit_on_connect);
            let (event, data) = emit
                .into_iter()
                .next()
                .unwrap_or_else(|| (String::new(), Value::Null));
            let mut request = SocketIoRequest {
                desc,
                endpoint,
                params,
                event,
                data,
            };
            if request.desc.is_empty() {
                request.desc = request.summary();
            }
            return Some(Request::SocketIo(request));
        }

        let Some(verb) = HttpMethod::parse(&method) else {
            tracing::warn!(method = %method, endpoint = %self.endpoint, "Unknown request method");
            return None;
        };
        let endpoint = if endpoint.is_empty() { "/".to_string() } else { endpoint };
        let mut request = HttpRequest {
            desc,
            method: verb,
            base: vars.substitute(api_base),
            endpoint,
            headers: vars.substitute_map(&self.headers),
            params,
            body: vars.substitute_value(&self.body),
            bucket_label: crate::storage::sanitize_for_filename(&format!(
                "{} {}{}",
                method,
                crate::storage::sanitize_for_filename(api_base),
                self.endpoint
            )),
            callback: self.callback.clone(),
            timestamp: None,
        };
        request.desc = if request.desc.is_empty() {
            request.summary()
        } else {
            format!("{} - {}", request.desc, request.summary())
        };
        Some(Request::Http(request))
    }
}

fn default_method() -> String {
    HttpMethod::GET.as_str().to_string()
}

impl Default for RequestDef {
    fn default() -> Self {
        RequestDef {
            desc: String::new(),
            method: default_method(),
            endpoint: String::new(),
            headers: Map::new(),
            params: Map::new(),
            body: Value::Null,
            callback: None,
            emit_on_connect: Map::new(),
        }
    }
}

/// A project definition
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub api_base: String,
    #[serde(default)]
    pub output_path: String,
    #[serde(default)]
    pub variables: Variables,
    #[serde(default)]
    pub requests: Vec<RequestDef>,
    #[serde(default)]
    pub base_project: Option<String>,
    /// Name of a built-in menu hook
    #[serde(default)]
    pub callback_menu: Option<String>,
}

/// A fully substituted request, ready to fire
#[derive(Clone, Debug)]
pub enum Request {
    Http(HttpRequest),
    SocketIo(SocketIoRequest),
}

impl Request {
    pub fn desc(&self) -> &str {
        match self {
            Request::Http(r) => &r.desc,
            Request::SocketIo(r) => &r.desc,
        }
    }
}

/// HTTP request
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub desc: String,
    pub method: HttpMethod,
    pub base: String,
    pub endpoint: String,
    pub headers: Map<String, Value>,
    pub params: Map<String, Value>,
    pub body: Value,
    /// Directory name grouping saved responses of this request
    pub bucket_label: String,
    pub callback: Option<String>,
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl HttpRequest {
    pub fn url(&self) -> String {
        format!("{}{}", self.base, self.endpoint)
    }

    /// `METHOD endpoint?query`
    pub fn summary(&self) -> String {
        format!("{} {}{}", self.method.as_str(), self.endpoint, query_suffix(&self.params))
    }

    pub fn to_json(&self) -> Value {
        let mut result = Map::new();
        result.insert("base".into(), Value::String(self.base.clone()));
        result.insert("verb".into(), Value::String(self.method.as_str().to_string()));
        result.insert("endpoint".into(), Value::String(self.endpoint.clone()));
        if !self.headers.is_empty() {
            result.insert("headers".into(), Value::Object(self.headers.clone()));
        }
        if !is_empty_value(&self.body) {
            result.insert("body".into(), self.body.clone());
        }
        if !self.params.is_empty() {
            result.insert("params".into(), Value::Object(self.params.clone()));
        }
        if let Some(timestamp) = self.timestamp {
            result.insert("timestamp".into(), Value::String(timestamp.to_rfc3339()));
        }
        Value::Object(result)
    }
}

/// Socket.IO request: connect, emit one event, then stream everything received
#[derive(Clone, Debug)]
pub struct SocketIoRequest {
    pub desc: String,
    pub endpoint: String,
    pub params: Map<String, Value>,
    pub event: String,
    pub data: Value,
}

impl SocketIoRequest {
    pub fn summary(&self) -> String {
        format!("Socket.IO {} {}", self.endpoint, self.event)
    }
}

/// Response to an HTTP request
#[derive(Clone, Debug, Default)]
pub struct ApiResponse {
    /// None when the request never got a response
    pub status_code: Option<u16>,
    pub duration_secs: f64,
    /// Parsed JSON body, when the body was JSON
    pub body: Option<Value>,
    pub text: String,
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn from_parts(status_code: u16, duration_secs: f64, text: String) -> Self {
        let body = serde_json::from_str::<Value>(&text).ok();
        let error = match &body {
            None if !text.is_empty() && text != "null" => {
                Some(format!("invalid JSON response: {}", text))
            }
            _ => None,
        };
        ApiResponse {
            status_code: Some(status_code),
            duration_secs,
            body,
            text,
            error,
        }
    }

    pub fn failed(duration_secs: f64, error: String) -> Self {
        ApiResponse {
            status_code: None,
            duration_secs,
            body: None,
            text: String::new(),
            error: Some(error),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut result = Map::new();
        result.insert("status_code".into(), self.status_code.map_or(Value::Null, Value::from));
        result.insert("duration".into(), Value::from(self.duration_secs));
        result.insert(
            "body".into(),
            self.body.clone().unwrap_or_else(|| Value::String(self.text.clone())),
        );
        if let Some(error) = &self.error {
            result.insert("error".into(), Value::String(error.clone()));
        }
        Value::Object(result)
    }
}

/// True for null, empty strings, arrays and objects
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Plain string form of a scalar used in query strings and headers
pub fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `?a=1&b=2`, or an empty string without params
pub fn query_suffix(params: &Map<String, Value>) -> String {
    if params.is_empty() {
        return String::new();
    }
    let pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.clone(), value_as_string(v)))
        .collect();
    match reqwest::Url::parse_with_params("http://localhost/", &pairs) {
        Ok(url) => format!("?{}", url.query().unwrap_or_default()),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitute_nested_values() {
        let mut vars = Variables::default();
        vars.set("id", "42");
        let value = json!({"path": "/items/{{id}}", "list": ["{{id}}", 1], "{{id}}": true});
        let result = vars.substitute_value(&value);
        assert_eq!(result, json!({"path": "/items/42", "list": ["42", 1], "{{id}}": true}));
    }

    #[test]
    fn test_query_suffix_encodes() {
        let params = json!({"q": "a b", "n": 3});
        let Value::Object(params) = params else { unreachable!() };
        assert_eq!(query_suffix(&params), "?q=a+b&n=3");
        assert_eq!(query_suffix(&Map::new()), "");
    }

    #[test]
    fn test_response_records_invalid_json() {
        let ok = ApiResponse::from_parts(200, 0.1, r#"{"a": 1}"#.to_string());
        assert_eq!(ok.body, Some(json!({"a": 1})));
        assert!(ok.error.is_none());

        let bad = ApiResponse::from_parts(500, 0.1, "oops".to_string());
        assert!(bad.body.is_none());
        assert_eq!(bad.error.as_deref(), Some("invalid JSON response: oops"));
        assert_eq!(bad.to_json()["body"], json!("oops"));
    }

    #[test]
    fn test_build_http_request() {
        let def: RequestDef = serde_json::from_value(json!({
            "desc": "Get item",
            "endpoint": "/items/{{id}}",
            "params": {"q": "{{id}}"},
            "headers": {"Authorization": "Bearer {{token}}"}
        }))
        .unwrap();
        let mut vars = Variables::default();
        vars.set("id", "7");
        vars.set("token", "abc");

        let Some(Request::Http(request)) = def.build("https://www.example.com", &vars) else {
            panic!("expected an HTTP request");
        };
        assert_eq!(request.url(), "https://www.example.com/items/7");
        assert_eq!(request.desc, "Get item - GET /items/7?q=7");
        assert_eq!(request.headers["Authorization"], json!("Bearer abc"));
        assert_eq!(request.bucket_label, "GET example.com-items-{{id}}");
    }

    #[test]
    fn test_build_socket_and_unknown() {
        let def: RequestDef = serde_json::from_value(json!({
            "method": "Socket.IO",
            "endpoint": "http://localhost:3000",
            "emit_on_connect": {"join": {"room": "{{room}}"}}
        }))
        .unwrap();
        let mut vars = Variables::default();
        vars.set("room", "lobby");
        let Some(Request::SocketIo(request)) = def.build("", &vars) else {
            panic!("expected a Socket.IO request");
        };
        assert_eq!(request.event, "join");
        assert_eq!(request.data, json!({"room": "lobby"}));
        assert_eq!(request.desc, "Socket.IO http://localhost:3000 join");

        let unknown = RequestDef {
            method: "OPTIONS".into(),
            ..RequestDef::default()
        };
        assert!(unknown.build("", &vars).is_none());
    }

    #[test]
    fn test_request_def_defaults() {
        let def: RequestDef = serde_json::from_value(json!({"endpoint": "/x"})).unwrap();
        assert_eq!(def.method, "GET");
        assert!(def.body.is_null());
    }
}
