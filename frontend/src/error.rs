use thiserror::Error;
use wasm_bindgen::JsValue;

/// Reasons a page behavior could not be attached. None of these are fatal;
/// the page logs them and carries on without that behavior.
#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("no browser window available")]
    NoWindow,
    #[error("element `{0}` not found")]
    MissingElement(&'static str),
    #[error("{0} is not supported by this browser")]
    Unsupported(&'static str),
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for BehaviorError {
    fn from(value: JsValue) -> Self {
        BehaviorError::Js(describe_js(&value))
    }
}

pub fn describe_js(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
