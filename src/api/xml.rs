//! XML-RPC documents: `<methodCall>` out, `<methodResponse>` in.

use base64::Engine;
use chrono::NaiveDateTime;
use lazy_regex::regex_captures;
use quick_xml::escape::escape;
use roxmltree::{Document, Node};
use thiserror::Error;

use super::Value;

/// Format of `<dateTime.iso8601>`, e.g. `19980717T14:08:55`.
pub const DATETIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";

#[derive(Debug, Error)]
pub enum Error {
    #[error("field `{0}` not found")]
    FieldNotFound(&'static str),
    #[error("field `{0}` is not a text node")]
    NoText(&'static str),
}
pub type Result<T> = std::result::Result<T, Error>;

pub fn find_node_by_tag<'a, 'b>(node: Node<'a, 'b>, tag: &'static str) -> Result<Node<'a, 'b>> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .ok_or(Error::FieldNotFound(tag))
}

pub fn find_text_by_tag<'a>(node: Node<'a, '_>, tag: &'static str) -> Result<&'a str> {
    match find_node_by_tag(node, tag) {
        Ok(node) => node.text().ok_or(Error::NoText(tag)),
        Err(err) => Err(err),
    }
}

/// Decoded `<methodResponse>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success(Value),
    Fault { code: i64, message: String },
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("text is not valid xml: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("couldn't find node: {0}")]
    MissingNode(#[from] Error),
    #[error("expected `methodResponse`, got `{0}`")]
    Root(String),
    #[error("unknown value type `{0}`")]
    UnknownType(String),
    #[error("invalid `{tag}` value `{text}`")]
    Scalar { tag: String, text: String },
    #[error("fault has no valid `{0}`")]
    FaultField(&'static str),
}
type ResponseResult<T> = std::result::Result<T, ResponseError>;

/// Serialize a call to `method` with `params`.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        encode_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

fn encode_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => out.push_str(&format!("<int>{}</int>", i)),
        Value::Bool(b) => out.push_str(&format!("<boolean>{}</boolean>", u8::from(*b))),
        Value::String(s) => out.push_str(&format!("<string>{}</string>", escape(s.as_str()))),
        Value::Double(d) => out.push_str(&format!("<double>{}</double>", d)),
        Value::DateTime(dt) => out.push_str(&format!(
            "<dateTime.iso8601>{}</dateTime.iso8601>",
            dt.format(DATETIME_FORMAT)
        )),
        Value::Base64(bytes) => out.push_str(&format!(
            "<base64>{}</base64>",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )),
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                encode_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Parse a `<methodResponse>` document.
pub fn decode_response(text: &str) -> ResponseResult<Response> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();
    if !root.has_tag_name("methodResponse") {
        return Err(ResponseError::Root(root.tag_name().name().to_string()));
    }

    if let Ok(fault) = find_node_by_tag(root, "fault") {
        let value = decode_value(find_node_by_tag(fault, "value")?)?;
        let code = value
            .get("faultCode")
            .and_then(Value::as_i64)
            .ok_or(ResponseError::FaultField("faultCode"))?;
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .ok_or(ResponseError::FaultField("faultString"))?
            .to_string();
        return Ok(Response::Fault { code, message });
    }

    let params = find_node_by_tag(root, "params")?;
    // `<params/>` is how some servers answer procedures without a result
    let value = match params.children().find(|n| n.has_tag_name("param")) {
        Some(param) => decode_value(find_node_by_tag(param, "value")?)?,
        None => Value::Nil,
    };
    Ok(Response::Success(value))
}

/// `node`: `<value>...</value>`
fn decode_value(node: Node) -> ResponseResult<Value> {
    let Some(typed) = node.children().find(|n| n.is_element()) else {
        return Ok(Value::String(node.text().unwrap_or_default().to_string()));
    };

    let tag = typed.tag_name().name();
    let text = typed.text().unwrap_or_default();
    let invalid = || ResponseError::Scalar {
        tag: tag.to_string(),
        text: text.to_string(),
    };

    match tag {
        "int" | "i4" | "i8" => text.trim().parse().map(Value::Int).map_err(|_| invalid()),
        "boolean" => match text.trim() {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        "string" => Ok(Value::String(text.to_string())),
        "double" => text.trim().parse().map(Value::Double).map_err(|_| invalid()),
        "dateTime.iso8601" => parse_datetime(text).map(Value::DateTime).ok_or_else(invalid),
        "base64" => {
            let compact = text.split_whitespace().collect::<String>();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map(Value::Base64)
                .map_err(|_| invalid())
        }
        "nil" => Ok(Value::Nil),
        "array" => find_node_by_tag(typed, "data")?
            .children()
            .filter(|n| n.has_tag_name("value"))
            .map(decode_value)
            .collect::<ResponseResult<Vec<_>>>()
            .map(Value::Array),
        "struct" => typed
            .children()
            .filter(|n| n.has_tag_name("member"))
            .map(|member| -> ResponseResult<(String, Value)> {
                let name = find_text_by_tag(member, "name")?;
                let value = decode_value(find_node_by_tag(member, "value")?)?;
                Ok((name.to_string(), value))
            })
            .collect::<ResponseResult<Vec<_>>>()
            .map(|members| members.into_iter().collect()),
        other => Err(ResponseError::UnknownType(other.to_string())),
    }
}

/// Local time of a `dateTime.iso8601`, a trailing zone (`Z`, `+01:00`) is ignored.
fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    let local = regex_captures!(r"^(.*?)(?:[Zz]|[+-]\d{2}:?\d{2})?$", text)
        .map_or(text, |(_, local)| local);
    NaiveDateTime::parse_from_str(local, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
