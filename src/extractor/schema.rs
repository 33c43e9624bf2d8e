//! # Extraction Schema
//!
//! The structural contract generated output must satisfy before it is
//! accepted: field names, types, and cardinality bounds. Validation is a pure
//! function over JSON so it can be exercised with hand-built payloads.
//!
//! The same type drives the schema sent to the generation service, reduced
//! to the subset of JSON Schema that service understands.

use std::ops::RangeInclusive;
use std::sync::OnceLock;

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Allowed number of bullets
pub const BULLETS: RangeInclusive<usize> = 3..=6;
/// Allowed number of keywords
pub const KEYWORDS: RangeInclusive<usize> = 5..=10;
/// Allowed number of signals
pub const SIGNALS: RangeInclusive<usize> = 2..=4;

/// Structured intelligence extracted from a company's website
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompanyProfile {
    /// A concise 1-2 sentence summary of what the company does and its market position
    pub summary: String,

    /// 3-6 bullet points on what the company does, its products, and value proposition
    #[schemars(length(min = 3, max = 6))]
    pub bullets: Vec<String>,

    /// 5-10 keywords or tags covering technology, market, and business model
    #[schemars(length(min = 5, max = 10))]
    pub keywords: Vec<String>,

    /// 2-4 signals of investor interest derived from evidence on the website
    #[schemars(length(min = 2, max = 4))]
    pub signals: Vec<Signal>,
}

/// A short labeled observation about a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Signal {
    /// Short signal label, e.g. 'Careers page exists' or 'Recent blog post'
    pub label: String,

    /// Whether this is a positive signal for investor interest
    pub positive: bool,
}

impl Signal {
    pub fn new(label: impl Into<String>, positive: bool) -> Self {
        Self {
            label: label.into(),
            positive,
        }
    }
}

/// Reasons generated output is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("model returned no output")]
    Empty,

    #[error("output does not match the schema: {0}")]
    Malformed(String),

    #[error("{field} has {len} entries, expected {min}-{max}")]
    OutOfBounds {
        field: &'static str,
        len: usize,
        min: usize,
        max: usize,
    },

    #[error("{field} must not be blank")]
    Blank { field: &'static str },
}

impl CompanyProfile {
    /// Check cardinality bounds and required text
    pub fn check(&self) -> Result<(), SchemaViolation> {
        if self.summary.trim().is_empty() {
            return Err(SchemaViolation::Blank { field: "summary" });
        }
        check_len("bullets", self.bullets.len(), &BULLETS)?;
        check_len("keywords", self.keywords.len(), &KEYWORDS)?;
        check_len("signals", self.signals.len(), &SIGNALS)?;
        if self.signals.iter().any(|signal| signal.label.trim().is_empty()) {
            return Err(SchemaViolation::Blank {
                field: "signals.label",
            });
        }
        Ok(())
    }
}

fn check_len(
    field: &'static str,
    len: usize,
    bounds: &RangeInclusive<usize>,
) -> Result<(), SchemaViolation> {
    if bounds.contains(&len) {
        Ok(())
    } else {
        Err(SchemaViolation::OutOfBounds {
            field,
            len,
            min: *bounds.start(),
            max: *bounds.end(),
        })
    }
}

/// Validate a JSON payload against the extraction schema.
///
/// Rejects the whole payload on any violation; nothing is partially accepted.
pub fn validate_profile(value: Value) -> Result<CompanyProfile, SchemaViolation> {
    let profile: CompanyProfile =
        serde_json::from_value(value).map_err(|e| SchemaViolation::Malformed(e.to_string()))?;
    profile.check()?;
    Ok(profile)
}

/// Parse raw generated text and validate it
pub fn parse_profile(text: &str) -> Result<CompanyProfile, SchemaViolation> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SchemaViolation::Empty);
    }
    let value: Value =
        serde_json::from_str(text).map_err(|e| SchemaViolation::Malformed(e.to_string()))?;
    validate_profile(value)
}

/// Keys the generation service accepts in a response schema
const SUPPORTED_KEYS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minItems",
    "maxItems",
];

/// Response schema for [`CompanyProfile`] in the generation service's dialect
pub fn response_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let root = serde_json::to_value(schema_for!(CompanyProfile)).unwrap_or_default();
        let definitions = root.get("definitions").cloned().unwrap_or(Value::Null);
        reduce(&root, &definitions)
    })
}

/// Inline `$ref`s and keep only supported keys, upper-casing type names
fn reduce(value: &Value, definitions: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };

    if let Some(Value::String(reference)) = map.get("$ref") {
        let name = reference.trim_start_matches("#/definitions/");
        if let Some(definition) = definitions.get(name) {
            return reduce(definition, definitions);
        }
    }

    let mut reduced = Map::new();
    for (key, value) in map {
        if !SUPPORTED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match key.as_str() {
            "type" => type_name(value, &mut reduced),
            "properties" => Value::Object(
                value
                    .as_object()
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, schema)| (name.clone(), reduce(schema, definitions)))
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            "items" => reduce(value, definitions),
            _ => value.clone(),
        };
        reduced.insert(key.clone(), value);
    }
    Value::Object(reduced)
}

/// `["string", "null"]` becomes `"STRING"` plus `nullable: true`
fn type_name(value: &Value, reduced: &mut Map<String, Value>) -> Value {
    match value {
        Value::String(name) => Value::String(name.to_uppercase()),
        Value::Array(names) => {
            let mut concrete = names.iter().filter_map(Value::as_str).filter(|n| *n != "null");
            if names.iter().any(|n| n == "null") {
                reduced.insert("nullable".to_string(), Value::Bool(true));
            }
            concrete
                .next()
                .map(|name| Value::String(name.to_uppercase()))
                .unwrap_or(Value::Null)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "summary": "Example builds developer tooling for payments teams.",
            "bullets": ["Payments SDK", "Fraud scoring API", "Hosted checkout", "Usage-based pricing"],
            "keywords": ["fintech", "payments", "API", "developer tools", "SaaS", "B2B"],
            "signals": [
                {"label": "Careers page exists", "positive": true},
                {"label": "Pricing page present", "positive": true},
                {"label": "No recent blog posts", "positive": false}
            ]
        })
    }

    #[test]
    fn test_valid_payload() {
        let profile = validate_profile(payload()).unwrap();
        assert_eq!(profile.bullets.len(), 4);
        assert_eq!(profile.keywords.len(), 6);
        assert_eq!(profile.signals[2], Signal::new("No recent blog posts", false));
    }

    #[test]
    fn test_too_few_bullets() {
        let mut value = payload();
        value["bullets"] = json!(["One", "Two"]);
        assert_eq!(
            validate_profile(value),
            Err(SchemaViolation::OutOfBounds {
                field: "bullets",
                len: 2,
                min: 3,
                max: 6
            })
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut value = payload();
        value["bullets"] = json!(["1", "2", "3", "4", "5", "6"]);
        value["keywords"] = json!(["a", "b", "c", "d", "e"]);
        value["signals"] = json!([
            {"label": "Open source", "positive": true},
            {"label": "Enterprise focus", "positive": true}
        ]);
        assert!(validate_profile(value).is_ok());

        let mut value = payload();
        value["keywords"] = json!(["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]);
        assert!(matches!(
            validate_profile(value),
            Err(SchemaViolation::OutOfBounds { field: "keywords", len: 11, .. })
        ));

        let mut value = payload();
        value["signals"] = json!([
            {"label": "a", "positive": true},
            {"label": "b", "positive": true},
            {"label": "c", "positive": true},
            {"label": "d", "positive": true},
            {"label": "e", "positive": true}
        ]);
        assert!(matches!(
            validate_profile(value),
            Err(SchemaViolation::OutOfBounds { field: "signals", len: 5, .. })
        ));
    }

    #[test]
    fn test_type_mismatches() {
        let mut value = payload();
        value["signals"][0]["positive"] = json!("yes");
        assert!(matches!(validate_profile(value), Err(SchemaViolation::Malformed(_))));

        let mut value = payload();
        value.as_object_mut().unwrap().remove("summary");
        assert!(matches!(validate_profile(value), Err(SchemaViolation::Malformed(_))));

        assert!(matches!(
            validate_profile(json!(["not", "an", "object"])),
            Err(SchemaViolation::Malformed(_))
        ));
    }

    #[test]
    fn test_blank_fields() {
        let mut value = payload();
        value["summary"] = json!("   ");
        assert_eq!(
            validate_profile(value),
            Err(SchemaViolation::Blank { field: "summary" })
        );

        let mut value = payload();
        value["signals"][1]["label"] = json!("");
        assert_eq!(
            validate_profile(value),
            Err(SchemaViolation::Blank {
                field: "signals.label"
            })
        );
    }

    #[test]
    fn test_parse_profile() {
        assert_eq!(parse_profile(""), Err(SchemaViolation::Empty));
        assert_eq!(parse_profile(" \n"), Err(SchemaViolation::Empty));
        assert!(matches!(
            parse_profile("Here is the summary you asked for"),
            Err(SchemaViolation::Malformed(_))
        ));
        assert!(parse_profile(&payload().to_string()).is_ok());
    }

    #[test]
    fn test_response_schema_shape() {
        let schema = response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("definitions").is_none());
        assert!(schema.get("title").is_none());

        let props = &schema["properties"];
        assert_eq!(props["summary"]["type"], "STRING");
        assert_eq!(props["bullets"]["type"], "ARRAY");
        assert_eq!(props["bullets"]["items"]["type"], "STRING");

        let signal = &props["signals"]["items"];
        assert!(signal.get("$ref").is_none());
        assert_eq!(signal["type"], "OBJECT");
        assert_eq!(signal["properties"]["positive"]["type"], "BOOLEAN");

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        for field in ["summary", "bullets", "keywords", "signals"] {
            assert!(required.contains(&field), "{field} should be required");
        }
    }

    #[test]
    fn test_response_schema_matches_bounds() {
        let props = &response_schema()["properties"];
        for (field, bounds) in [("bullets", BULLETS), ("keywords", KEYWORDS), ("signals", SIGNALS)] {
            assert_eq!(props[field]["minItems"], json!(*bounds.start()), "{field} minItems");
            assert_eq!(props[field]["maxItems"], json!(*bounds.end()), "{field} maxItems");
        }
    }

    #[test]
    fn test_nullable_types() {
        let schema = json!({"type": ["string", "null"], "title": "Maybe"});
        let reduced = reduce(&schema, &Value::Null);
        assert_eq!(reduced, json!({"type": "STRING", "nullable": true}));
    }
}
