//! # Payload Schemas
//!
//! A [`Schema`] lists the fields a create or update payload may carry and how
//! each is checked. Validation collects every problem into one
//! [`ResourceError::Validation`] message. Payload keys the schema does not
//! name are rejected.
//!
//! Schemas also describe themselves: the `new`, `edit` and `new_search`
//! capabilities return [`Schema::describe`] so a client can build a form
//! without hard-coding the field list.

use remple::ResourceError;
use serde_json::{json, Map, Value};

/// How a single field is checked.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text { max: Option<usize> },
    Integer { min: Option<i64> },
    Bool,
    OneOf(&'static [&'static str]),
    /// An `http` or `https` URL.
    Uri,
    /// The id of a record in another collection.
    Reference(&'static str),
    /// A list of ids in another collection.
    ReferenceList(&'static str),
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } | FieldKind::OneOf(_) | FieldKind::Uri => "string",
            FieldKind::Reference(_) => "string",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Bool => "boolean",
            FieldKind::ReferenceList(_) => "array",
        }
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (FieldKind::Text { max }, Value::String(s)) => match max {
                Some(max) if s.chars().count() > *max => {
                    Err(format!("Enter a value not more than {max} characters long"))
                }
                _ => Ok(()),
            },
            (FieldKind::Text { .. }, _) => Err("Please enter a string".into()),
            (FieldKind::Integer { min }, Value::Number(n)) => match (n.as_i64(), min) {
                (None, _) => Err("Please enter an integer value".into()),
                (Some(v), Some(min)) if v < *min => {
                    Err(format!("Please enter a number that is {min} or greater"))
                }
                _ => Ok(()),
            },
            (FieldKind::Integer { .. }, _) => Err("Please enter an integer value".into()),
            (FieldKind::Bool, Value::Bool(_)) => Ok(()),
            (FieldKind::Bool, _) => Err("Please enter true or false".into()),
            (FieldKind::OneOf(choices), Value::String(s)) if choices.contains(&s.as_str()) => {
                Ok(())
            }
            (FieldKind::OneOf(choices), _) => {
                Err(format!("Value must be one of: {}", choices.join("; ")))
            }
            (FieldKind::Uri, Value::String(s)) if is_http_url(s) => Ok(()),
            (FieldKind::Uri, _) => Err("That is not a valid URL".into()),
            (FieldKind::Reference(_), Value::String(s)) if !s.is_empty() => Ok(()),
            (FieldKind::Reference(collection), _) => {
                Err(format!("Please enter the id of a {collection} record"))
            }
            (FieldKind::ReferenceList(collection), Value::Array(items)) => {
                if items.iter().all(|item| matches!(item, Value::String(s) if !s.is_empty())) {
                    Ok(())
                } else {
                    Err(format!("Please enter a list of {collection} ids"))
                }
            }
            (FieldKind::ReferenceList(collection), _) => {
                Err(format!("Please enter a list of {collection} ids"))
            }
        }
    }
}

fn is_http_url(s: &str) -> bool {
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !host.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// One named field of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// An id that must exist in another collection for a payload to be valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub collection: &'static str,
    pub id: String,
}

/// A payload that passed validation, plus the references still to be checked
/// against their stores.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub fields: Map<String, Value>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Adds an optional field.
    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: false,
        });
        self
    }

    /// Adds a field that must be present on create.
    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: true,
        });
        self
    }

    /// Every field of `self` followed by those of `other` not already present.
    pub fn extend(mut self, other: &Schema) -> Self {
        for spec in &other.fields {
            if self.spec(spec.name).is_none() {
                self.fields.push(spec.clone());
            }
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Checks `payload` against the schema.
    ///
    /// When `partial` is set (updates), required fields may be omitted.
    pub fn validate(&self, payload: &Map<String, Value>, partial: bool) -> Result<Validated, ResourceError> {
        let mut errors: Vec<String> = Vec::new();
        let mut references = Vec::new();

        for key in payload.keys() {
            if self.spec(key).is_none() {
                errors.push(format!("{key}: The input field '{key}' was not expected."));
            }
        }

        for spec in &self.fields {
            let Some(value) = payload.get(spec.name) else {
                if spec.required && !partial {
                    errors.push(format!("{}: Missing value", spec.name));
                }
                continue;
            };
            if value.is_null() && !spec.required {
                continue;
            }
            if let Err(message) = spec.kind.check(value) {
                errors.push(format!("{}: {}", spec.name, message));
                continue;
            }
            match (&spec.kind, value) {
                (FieldKind::Reference(collection), Value::String(id)) => references.push(Reference {
                    field: spec.name,
                    collection: *collection,
                    id: id.clone(),
                }),
                (FieldKind::ReferenceList(collection), Value::Array(items)) => {
                    references.extend(items.iter().filter_map(Value::as_str).map(|id| Reference {
                        field: spec.name,
                        collection: *collection,
                        id: id.to_string(),
                    }))
                }
                _ => {}
            }
        }

        if !errors.is_empty() {
            errors.sort();
            return Err(ResourceError::Validation(errors.join("; ")));
        }

        let fields = payload
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Validated { fields, references })
    }

    /// Field metadata, keyed by field name.
    pub fn describe(&self) -> Value {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|spec| {
                let mut field = json!({
                    "type": spec.kind.type_name(),
                    "required": spec.required,
                });
                match &spec.kind {
                    FieldKind::Text { max: Some(max) } => field["max_length"] = json!(max),
                    FieldKind::Integer { min: Some(min) } => field["minimum"] = json!(min),
                    FieldKind::OneOf(choices) => field["choices"] = json!(choices),
                    FieldKind::Uri => field["format"] = json!("uri"),
                    FieldKind::Reference(collection) | FieldKind::ReferenceList(collection) => {
                        field["collection"] = json!(collection)
                    }
                    _ => {}
                }
                (spec.name.to_string(), field)
            })
            .collect();
        json!({ "schema": self.name, "fields": fields })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_schema() -> Schema {
        Schema::new("LocationSchema")
            .field("description", FieldKind::Text { max: Some(16) })
            .required("purpose", FieldKind::OneOf(&["AS", "TS"]))
            .field("quota", FieldKind::Integer { min: Some(0) })
            .field("enabled", FieldKind::Bool)
            .required("space", FieldKind::Reference("spaces"))
            .field("pipeline", FieldKind::ReferenceList("pipelines"))
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_payload_collects_references() {
        let validated = location_schema()
            .validate(
                &object(json!({
                    "purpose": "AS",
                    "space": "space_1",
                    "pipeline": ["pipeline_1", "pipeline_2"],
                    "quota": 10,
                })),
                false,
            )
            .unwrap();
        assert_eq!(validated.references.len(), 3);
        assert_eq!(validated.references[0].collection, "spaces");
        assert_eq!(validated.fields["quota"], 10);
    }

    #[test]
    fn test_every_problem_is_reported() {
        let err = location_schema()
            .validate(
                &object(json!({
                    "purpose": "XX",
                    "quota": -1,
                    "colour": "red",
                })),
                false,
            )
            .unwrap_err();
        let ResourceError::Validation(message) = err else {
            panic!("expected a validation error");
        };
        assert!(message.contains("colour: The input field 'colour' was not expected."));
        assert!(message.contains("purpose: Value must be one of: AS; TS"));
        assert!(message.contains("quota: Please enter a number that is 0 or greater"));
        assert!(message.contains("space: Missing value"));
    }

    #[test]
    fn test_partial_payload_skips_required() {
        let schema = location_schema();
        assert!(schema
            .validate(&object(json!({ "enabled": false })), true)
            .is_ok());
        assert!(schema
            .validate(&object(json!({ "enabled": false })), false)
            .is_err());
    }

    #[test]
    fn test_text_length_counts_characters() {
        let schema = location_schema();
        let ok = json!({ "purpose": "TS", "space": "s", "description": "ééééééééééééééé" });
        assert!(schema.validate(&object(ok), false).is_ok());
        let long = json!({ "purpose": "TS", "space": "s", "description": "x".repeat(17) });
        assert!(schema.validate(&object(long), false).is_err());
    }

    #[test]
    fn test_uri_field() {
        let schema = Schema::new("PipelineSchema").field("remote_name", FieldKind::Uri);
        for good in ["http://192.168.1.1", "https://pipeline.example.org/api/"] {
            assert!(schema
                .validate(&object(json!({ "remote_name": good })), false)
                .is_ok());
        }
        for bad in ["ftp://host", "http://", "pipeline"] {
            assert!(schema
                .validate(&object(json!({ "remote_name": bad })), false)
                .is_err());
        }
    }

    #[test]
    fn test_describe_lists_constraints() {
        let description = location_schema().describe();
        assert_eq!(description["schema"], "LocationSchema");
        assert_eq!(description["fields"]["description"]["max_length"], 16);
        assert_eq!(description["fields"]["purpose"]["choices"], json!(["AS", "TS"]));
        assert_eq!(description["fields"]["pipeline"]["type"], "array");
        assert_eq!(description["fields"]["space"]["collection"], "spaces");
        assert_eq!(description["fields"]["space"]["required"], true);
    }
}
