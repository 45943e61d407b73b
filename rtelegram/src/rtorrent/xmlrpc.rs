// XML-RPC codec for rTorrent - encodes method calls and decodes responses
// Responses are parsed into a small element tree first, then into values.

use crate::relay::error::DaemonError;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// An XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Nil,
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

/// Serialize a `methodCall` document
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(n) if i32::try_from(*n).is_ok() => out.push_str(&format!("<i4>{}</i4>", n)),
        Value::Int(n) => out.push_str(&format!("<i8>{}</i8>", n)),
        Value::Bool(b) => out.push_str(&format!("<boolean>{}</boolean>", u8::from(*b))),
        Value::Double(d) => out.push_str(&format!("<double>{}</double>", d)),
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Element tree node used while decoding
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn protocol(message: impl Into<String>) -> DaemonError {
    DaemonError::Protocol(message.into())
}

fn parse_tree(xml: &str) -> Result<Node, DaemonError> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Node::default()];

    loop {
        match reader
            .read_event()
            .map_err(|e| protocol(format!("invalid xml: {}", e)))?
        {
            Event::Start(e) => stack.push(Node::named(e.name().as_ref())),
            Event::Empty(e) => {
                let node = Node::named(e.name().as_ref());
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| protocol("unbalanced xml"))?;
                let parent = stack.last_mut().ok_or_else(|| protocol("unbalanced xml"))?;
                parent.children.push(node);
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| protocol(format!("invalid xml text: {}", e)))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&raw));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(protocol("unterminated xml document")),
    }
}

fn decode_value(node: &Node) -> Result<Value, DaemonError> {
    let Some(typed) = node.children.first() else {
        // Untyped values are strings
        return Ok(Value::String(node.text.clone()));
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "i4" | "i8" | "int" => text
            .parse()
            .map(Value::Int)
            .map_err(|_| protocol(format!("bad integer: {}", text))),
        "boolean" => Ok(Value::Bool(text == "1")),
        "double" => text
            .parse()
            .map(Value::Double)
            .map_err(|_| protocol(format!("bad double: {}", text))),
        "string" | "base64" | "dateTime.iso8601" => Ok(Value::String(typed.text.clone())),
        "nil" => Ok(Value::Nil),
        "array" => {
            let data = typed
                .child("data")
                .ok_or_else(|| protocol("array without data"))?;
            data.children
                .iter()
                .filter(|c| c.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = Vec::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| protocol("member without name"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| protocol("member without value"))?;
                members.push((name.text.trim().to_string(), decode_value(value)?));
            }
            Ok(Value::Struct(members))
        }
        other => Err(protocol(format!("unsupported value type: {}", other))),
    }
}

/// Decode a `methodResponse` document, turning faults into errors
pub fn decode_response(xml: &str) -> Result<Value, DaemonError> {
    let root = parse_tree(xml)?;
    let response = root
        .child("methodResponse")
        .ok_or_else(|| protocol("missing methodResponse"))?;

    if let Some(fault) = response.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| protocol("fault without value"))?;
        let value = decode_value(value)?;
        return Err(DaemonError::Fault {
            code: value
                .member("faultCode")
                .and_then(Value::as_i64)
                .unwrap_or(0),

            message: value
                .member("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    let value = response
        .child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| protocol("response without a value"))?;
    decode_value(value)
}
