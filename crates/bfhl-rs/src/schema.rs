//! Response shape validation.
//!
//! The endpoint's success body is checked against the JSON Schema derived
//! from [`ApiResult`] before it is decoded, so a malformed response produces
//! a list of concrete violations instead of a bare serde message.

use std::sync::OnceLock;

use schemars::JsonSchema;
use tracing::warn;

use crate::ApiResult;
use crate::error::SubmitError;

/// Generate a JSON Schema `serde_json::Value` for a type.
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

fn result_validator() -> Option<&'static jsonschema::Validator> {
    static VALIDATOR: OnceLock<Option<jsonschema::Validator>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| {
            let schema = json_schema_for::<ApiResult>();
            match jsonschema::validator_for(&schema) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Result schema failed to compile, skipping shape checks: {e}");
                    None
                }
            }
        })
        .as_ref()
}

/// List every way `value` deviates from the expected result shape.
///
/// Each entry is `"<json pointer>: <problem>"`; an empty list means the
/// value is acceptable.
pub fn shape_violations(value: &serde_json::Value) -> Vec<String> {
    let Some(validator) = result_validator() else {
        return Vec::new();
    };
    validator
        .iter_errors(value)
        .map(|e| {
            let path = e.instance_path().to_string();
            let path = if path.is_empty() { "/".to_string() } else { path };
            format!("{path}: {e}")
        })
        .collect()
}

/// Validate and decode a response body into an [`ApiResult`].
pub fn decode_result(value: serde_json::Value) -> Result<ApiResult, SubmitError> {
    let violations = shape_violations(&value);
    if !violations.is_empty() {
        return Err(SubmitError::Shape { violations });
    }
    serde_json::from_value(value).map_err(|e| SubmitError::Shape {
        violations: vec![e.to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_requires_all_three_fields() {
        let schema = json_schema_for::<ApiResult>();
        let required = schema["required"].as_array().unwrap();
        for field in ["numbers", "alphabets", "highest_lowercase_alphabet"] {
            assert!(required.contains(&field.into()), "missing {field}");
        }
    }

    #[test]
    fn accepts_well_formed_body_with_extra_fields() {
        let body = json!({
            "is_success": true,
            "user_id": "john_doe_17091999",
            "numbers": ["1", "334"],
            "alphabets": ["M", "B"],
            "highest_lowercase_alphabet": ["b"]
        });
        assert!(shape_violations(&body).is_empty());
        let result = decode_result(body).unwrap();
        assert_eq!(result.numbers, vec!["1", "334"]);
        assert_eq!(result.highest_lowercase_alphabet, vec!["b"]);
    }

    #[test]
    fn missing_field_is_a_shape_error() {
        let body = json!({"alphabets": [], "highest_lowercase_alphabet": []});
        let err = decode_result(body).unwrap_err();
        match err {
            SubmitError::Shape { violations } => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].contains("numbers"), "{violations:?}");
            }
            other => panic!("expected Shape, got {other:?}"),
        }
    }

    #[test]
    fn wrong_element_type_points_at_the_element() {
        let body = json!({
            "numbers": [1, "2"],
            "alphabets": [],
            "highest_lowercase_alphabet": []
        });
        let violations = shape_violations(&body);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("/numbers/0"), "{violations:?}");
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(!shape_violations(&json!([1, 2, 3])).is_empty());
        assert!(matches!(
            decode_result(json!("ok")),
            Err(SubmitError::Shape { .. })
        ));
    }
}
