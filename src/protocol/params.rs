//! Opaque parameter blob forwarded as the `params` form field.

use crate::Result;
use serde::Serialize;

/// Pre-serialized JSON text sent verbatim; the client never inspects its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params(String);

impl Params {
    pub fn raw(json: impl Into<String>) -> Self {
        Params(json.into())
    }

    /// Serialize a caller-side typed parameter object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Params(serde_json::to_string(value)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for Params {
    fn default() -> Self {
        Params("{}".to_string())
    }
}

impl From<String> for Params {
    fn from(json: String) -> Self {
        Params(json)
    }
}

impl From<&str> for Params {
    fn from(json: &str) -> Self {
        Params(json.to_string())
    }
}

impl From<serde_json::Value> for Params {
    fn from(value: serde_json::Value) -> Self {
        Params(value.to_string())
    }
}

/// Typed extraction tunables. Unset fields are omitted so the server default applies.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractParams {
    /// Number of requirements to extract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
    /// Spending hint for the server's model calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_limit: Option<f64>,
}

impl ExtractParams {
    pub fn num(num: u32) -> Self {
        Self {
            num: Some(num),
            ..Default::default()
        }
    }
}

/// Typed evaluation tunables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvalParams {
    /// 1-based index of the first requirement line to evaluate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_idx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_limit: Option<f64>,
}

impl EvalParams {
    pub fn start_idx(start_idx: u32) -> Self {
        Self {
            start_idx: Some(start_idx),
            ..Default::default()
        }
    }
}

impl TryFrom<&ExtractParams> for Params {
    type Error = crate::Error;

    fn try_from(value: &ExtractParams) -> Result<Self> {
        Params::from_serialize(value)
    }
}

impl TryFrom<&EvalParams> for Params {
    type Error = crate::Error;

    fn try_from(value: &EvalParams) -> Result<Self> {
        Params::from_serialize(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_blob_is_empty_object() {
        assert_eq!(Params::default().as_str(), "{}");
    }

    #[test]
    fn raw_blob_is_forwarded_verbatim() {
        let p = Params::raw("{ \"num\" :2 , \"extra\": [1] }");
        assert_eq!(p.into_string(), "{ \"num\" :2 , \"extra\": [1] }");
    }

    #[test]
    fn typed_params_omit_unset_fields() {
        let p = Params::try_from(&ExtractParams::num(3)).unwrap();
        assert_eq!(p.as_str(), r#"{"num":3}"#);

        let p = Params::try_from(&EvalParams {
            start_idx: Some(2),
            cost_limit: Some(0.5),
        })
        .unwrap();
        assert_eq!(p.as_str(), r#"{"start_idx":2,"cost_limit":0.5}"#);
    }
}
