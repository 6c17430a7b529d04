//! Engine.IO v4 / Socket.IO v5 text framing over a WebSocket
//!
//! An Engine.IO packet is a type digit followed by its payload. Socket.IO
//! packets ride inside Engine.IO `message` packets as
//! `<type>[/namespace,][ack id][json]`.

use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};

use crate::models::value_as_string;

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Value),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

/// Socket.IO packet, default namespace only
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Value),
    Disconnect,
    Event { id: Option<u64>, name: String, data: Value },
    Ack { id: u64, data: Value },
    ConnectError(Value),
}

pub fn decode_engine(text: &str) -> Result<EnginePacket> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or_else(|| anyhow!("empty Engine.IO packet"))?;
    let payload = chars.as_str();
    Ok(match kind {
        '0' => EnginePacket::Open(serde_json::from_str(payload).unwrap_or(Value::Null)),
        '1' => EnginePacket::Close,
        '2' => EnginePacket::Ping(payload.to_string()),
        '3' => EnginePacket::Pong(payload.to_string()),
        '4' => EnginePacket::Message(payload.to_string()),
        '5' => EnginePacket::Upgrade,
        '6' => EnginePacket::Noop,
        other => bail!("unknown Engine.IO packet type {:?}", other),
    })
}

/// Split event or ack arguments: none is null, one is itself, more stay an array
fn args_value(mut args: Vec<Value>) -> Value {
    match args.len() {
        0 => Value::Null,
        1 => args.remove(0),
        _ => Value::Array(args),
    }
}

pub fn decode_socket(payload: &str) -> Result<SocketPacket> {
    let mut chars = payload.chars();
    let kind = chars.next().ok_or_else(|| anyhow!("empty Socket.IO packet"))?;
    let mut rest = chars.as_str();

    if rest.starts_with('/') {
        rest = match rest.find(',') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        };
    }

    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    let id = if digits > 0 { rest[..digits].parse::<u64>().ok() } else { None };
    let rest = &rest[digits..];
    let data: Value = if rest.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(rest)?
    };

    Ok(match kind {
        '0' => SocketPacket::Connect(data),
        '1' => SocketPacket::Disconnect,
        '2' => {
            let Value::Array(mut args) = data else {
                bail!("event payload is not an array: {}", rest);
            };
            if args.is_empty() {
                bail!("event without a name");
            }
            let name = value_as_string(&args.remove(0));
            SocketPacket::Event {
                id,
                name,
                data: args_value(args),
            }
        }
        '3' => {
            let id = id.ok_or_else(|| anyhow!("ack without an id"))?;
            let args = match data {
                Value::Array(args) => args,
                other => vec![other],
            };
            SocketPacket::Ack {
                id,
                data: args_value(args),
            }
        }
        '4' => SocketPacket::ConnectError(data),
        other => bail!("unsupported Socket.IO packet type {:?}", other),
    })
}

/// Namespace connect for `/`
pub fn encode_connect() -> String {
    "40".to_string()
}

/// Namespace disconnect for `/`
pub fn encode_disconnect() -> String {
    "41".to_string()
}

pub fn encode_event(id: Option<u64>, name: &str, data: &Value) -> String {
    let args = Value::Array(vec![Value::String(name.to_string()), data.clone()]);
    format!(
        "42{}{}",
        id.map(|id| id.to_string()).unwrap_or_default(),
        args
    )
}

pub fn encode_pong(payload: &str) -> String {
    format!("3{}", payload)
}

/// WebSocket URL for an HTTP(S) or WS(S) endpoint
pub fn socket_url(endpoint: &str, params: &Map<String, Value>) -> Result<String> {
    let mut url = reqwest::Url::parse(endpoint)
        .map_err(|e| anyhow!("invalid endpoint {}: {}", endpoint, e))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => bail!("unsupported scheme {}", other),
    };
    if url.set_scheme(scheme).is_err() {
        bail!("cannot use {} with {}", scheme, endpoint);
    }

    let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
    url.set_path(&path);

    let existing: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair("EIO", "4").append_pair("transport", "websocket");
        for (k, v) in &existing {
            query.append_pair(k, v);
        }
        for (k, v) in params {
            query.append_pair(k, &value_as_string(v));
        }
    }
    Ok(url.to_string())
}
