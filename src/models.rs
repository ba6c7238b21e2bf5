// Request and response shapes for the backend endpoints.
//
// Response types type only the fields the client requires and keep every
// other field as raw JSON in `extra` (nulls and integer/float distinction
// included), so a body deserialized here and serialized again matches what
// the backend sent. Optional fields are read through accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context flags the mobile client always sends with a generation request.
pub const MOBILE_CONTEXT_FLAGS: [&str; 2] = ["mobile_optimized", "low_poly"];

/// Body of `POST /api/v1/generate`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub context: Map<String, Value>,
}

impl GenerateRequest {
    /// Build the request, applying the mobile flags after the caller's
    /// context so a caller-supplied value for either flag is overridden.
    pub fn new(prompt: impl Into<String>, context: Option<Map<String, Value>>) -> Self {
        let mut context = context.unwrap_or_default();
        for flag in MOBILE_CONTEXT_FLAGS {
            context.insert(flag.to_string(), Value::Bool(true));
        }
        GenerateRequest {
            prompt: prompt.into(),
            context,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SwitchTarget {
    pub object_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SwitchUpdate {
    pub material: String,
    pub properties: Map<String, Value>,
}

/// Body of `POST /api/v1/switch`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SwitchRequest {
    pub spec_id: String,
    pub target: SwitchTarget,
    pub update: SwitchUpdate,
    pub note: String,
}

impl SwitchRequest {
    pub fn new(
        spec_id: impl Into<String>,
        object_id: impl Into<String>,
        material: impl Into<String>,
        properties: Option<Map<String, Value>>,
    ) -> Self {
        let material = material.into();
        SwitchRequest {
            spec_id: spec_id.into(),
            target: SwitchTarget {
                object_id: object_id.into(),
            },
            note: switch_note(&material),
            update: SwitchUpdate {
                material,
                properties: properties.unwrap_or_default(),
            },
        }
    }
}

/// Free-text note attached to every material switch.
pub fn switch_note(material: &str) -> String {
    format!("Mobile switch: {}", material)
}

/// Body of `POST /api/v1/auth/refresh`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn str_field<'a>(extra: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    extra.get(key).and_then(Value::as_str)
}

/// Login / refresh response. Only `access_token` is required.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthResponse {
    pub fn refresh_token(&self) -> Option<&str> {
        str_field(&self.extra, "refresh_token")
    }

    pub fn token_type(&self) -> Option<&str> {
        str_field(&self.extra, "token_type")
    }

    /// Lifetime of the access token in seconds.
    pub fn expires_in(&self) -> Option<u64> {
        self.extra.get("expires_in").and_then(Value::as_u64)
    }
}

/// Result of a generation: a new spec and where to look at it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub spec_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationResult {
    pub fn preview_url(&self) -> Option<&str> {
        str_field(&self.extra, "preview_url")
    }

    pub fn spec_json(&self) -> Option<&Value> {
        self.extra.get("spec_json")
    }

    pub fn processing_time(&self) -> Option<f64> {
        self.extra.get("processing_time").and_then(Value::as_f64)
    }
}

/// Before/after snapshot of the object a switch touched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChangeInfo {
    pub object_id: String,
    #[serde(default)]
    pub before: Value,
    #[serde(default)]
    pub after: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SwitchResult {
    pub spec_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SwitchResult {
    pub fn preview_url(&self) -> Option<&str> {
        str_field(&self.extra, "preview_url")
    }

    pub fn iteration_id(&self) -> Option<&str> {
        str_field(&self.extra, "iteration_id")
    }

    /// The `changed` block, if present and well formed.
    pub fn changed(&self) -> Option<ChangeInfo> {
        self.extra
            .get("changed")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PreviewResult {
    pub preview_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PreviewResult {
    pub fn spec_id(&self) -> Option<&str> {
        str_field(&self.extra, "spec_id")
    }
}
