//! Generation request parsing.
//!
//! Bodies are read as a loose `serde_json::Value` rather than a derived
//! struct so that a missing `slides` key, a wrong top-level type and a bad
//! slide entry each map to their own error.

use serde_json::{Map, Value};

use crate::config::GenerationConfig;
use crate::error::ServiceError;

const NOT_AN_OBJECT: &str = "request body must be a JSON object";

/// Title and body text of one slide, defaults already applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSpec {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub slides: Vec<SlideSpec>,
}

impl GenerationRequest {
    /// Parse and validate a raw request body
    pub fn from_body(body: &[u8], config: &GenerationConfig) -> Result<Self, ServiceError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| ServiceError::InvalidRequest(NOT_AN_OBJECT.to_string()))?;
        Self::from_value(&value, config)
    }

    pub fn from_value(value: &Value, config: &GenerationConfig) -> Result<Self, ServiceError> {
        let object = value
            .as_object()
            .ok_or_else(|| ServiceError::InvalidRequest(NOT_AN_OBJECT.to_string()))?;

        let entries = match object.get("slides") {
            None | Some(Value::Null) => return Err(ServiceError::MissingData),
            Some(Value::Array(entries)) if entries.is_empty() => {
                return Err(ServiceError::MissingData)
            }
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(ServiceError::InvalidRequest(
                    "\"slides\" must be an array".to_string(),
                ))
            }
        };

        if entries.len() > config.max_slides {
            return Err(ServiceError::TooManySlides {
                max: config.max_slides,
            });
        }

        let slides = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let fields = entry.as_object().ok_or_else(|| {
                    ServiceError::InvalidRequest(format!("slide {} must be a JSON object", i + 1))
                })?;
                SlideSpec::from_fields(i, fields, config)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { slides })
    }
}

impl SlideSpec {
    fn from_fields(
        index: usize,
        fields: &Map<String, Value>,
        config: &GenerationConfig,
    ) -> Result<Self, ServiceError> {
        let title = text_field(index, fields, "title")?
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| config.default_title.clone());
        let content =
            text_field(index, fields, "content")?.unwrap_or_else(|| config.default_content.clone());
        Ok(Self { title, content })
    }
}

/// A string field; scalars are rendered as their JSON text, null counts as absent
fn text_field(
    index: usize,
    fields: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, ServiceError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v @ (Value::Bool(_) | Value::Number(_))) => Ok(Some(v.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => Err(ServiceError::InvalidRequest(format!(
            "slide {} field \"{key}\" must be a string",
            index + 1
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    fn generation() -> GenerationConfig {
        Config::defaults().unwrap().generation
    }

    fn parse(value: &Value) -> Result<GenerationRequest, ServiceError> {
        GenerationRequest::from_value(value, &generation())
    }

    #[test]
    fn test_slides_in_order() {
        let req = parse(&json!({"slides": [
            {"title": "Intro", "content": "Welcome"},
            {"title": "Agenda", "content": "Plan"}
        ]}))
        .unwrap();
        assert_eq!(
            req.slides,
            vec![
                SlideSpec {
                    title: "Intro".into(),
                    content: "Welcome".into()
                },
                SlideSpec {
                    title: "Agenda".into(),
                    content: "Plan".into()
                },
            ]
        );
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let req = parse(&json!({"slides": [{}, {"title": "", "content": ""}, {"title": null}]})).unwrap();
        assert_eq!(req.slides[0].title, "untitled");
        assert_eq!(req.slides[0].content, "no content");
        // empty content is kept, empty title is not
        assert_eq!(req.slides[1].title, "untitled");
        assert_eq!(req.slides[1].content, "");
        assert_eq!(req.slides[2].title, "untitled");
    }

    #[test]
    fn test_scalar_fields_are_stringified() {
        let req = parse(&json!({"slides": [{"title": 2024, "content": true}]})).unwrap();
        assert_eq!(req.slides[0].title, "2024");
        assert_eq!(req.slides[0].content, "true");
    }

    #[test]
    fn test_missing_or_empty_slides() {
        for body in [json!({}), json!({"slides": null}), json!({"slides": []})] {
            assert!(matches!(parse(&body), Err(ServiceError::MissingData)));
        }
    }

    #[test]
    fn test_invalid_shapes() {
        let err = parse(&json!([1, 2])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid request body: request body must be a JSON object"
        );
        assert!(matches!(
            parse(&json!({"slides": "nope"})),
            Err(ServiceError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse(&json!({"slides": [{"title": "ok"}, 3]})),
            Err(ServiceError::InvalidRequest(msg)) if msg == "slide 2 must be a JSON object"
        ));
        assert!(matches!(
            parse(&json!({"slides": [{"title": ["a"]}]})),
            Err(ServiceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_unparseable_body() {
        let err = GenerationRequest::from_body(b"{not json", &generation()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        assert!(err.to_string().contains("request body must be a JSON object"));
    }

    #[test]
    fn test_too_many_slides() {
        let mut config = generation();
        config.max_slides = 2;
        let body = json!({"slides": [{}, {}, {}]});
        assert!(matches!(
            GenerationRequest::from_value(&body, &config),
            Err(ServiceError::TooManySlides { max: 2 })
        ));
    }
}
