//! Purpose: Validate top-level JSON:API document shape and expose raw views.
//! Exports: `Document`, `Resource`, `Identifier`, `Linkage`.
//! Role: First stage of decoding; separates error documents from data documents.
//! Invariants: `errors` and `data` are mutually exclusive; exactly one is present.
//! Invariants: Validation is pure and ordered; the first violated rule wins.

use crate::core::error::{Error, ErrorKind};
use serde_json::{Map, Value};
use tracing::debug;

/// A validated data document: the raw primary `data` value (single resource
/// or array) plus the side-loaded `included` collection. Error documents
/// never construct a `Document`; they surface as `UpstreamErrors`.
#[derive(Clone, Debug)]
pub struct Document {
    data: Value,
    included: Vec<Value>,
}

impl Document {
    /// Parse JSON text, then validate document shape.
    pub fn from_str(input: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(input).map_err(|err| {
            Error::new(ErrorKind::InvalidInput)
                .with_message("input is not valid JSON")
                .with_source(err)
        })?;
        Self::from_value(value)
    }

    /// Validate an already-decoded value as a JSON:API document.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        let Value::Object(mut object) = value else {
            return Err(
                Error::new(ErrorKind::InvalidInput).with_message("document must be a JSON object")
            );
        };

        if let Some(errors) = object.get("errors") {
            let list = match errors.as_array() {
                Some(list) if !list.is_empty() => list,
                _ => {
                    return Err(Error::new(ErrorKind::MalformedErrors)
                        .with_message("`errors` must be a non-empty array"));
                }
            };
            if object.contains_key("data") {
                return Err(Error::new(ErrorKind::ErrorsWithData)
                    .with_message("`errors` and `data` must not coexist"));
            }
            return Err(Error::new(ErrorKind::UpstreamErrors)
                .with_message("document reports upstream errors")
                .with_upstream(list.clone()));
        }

        let Some(data) = object.remove("data") else {
            return Err(Error::new(ErrorKind::MissingData).with_message("document has no `data`"));
        };

        let included = match object.remove("included") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        debug!(
            primary = if data.is_array() { "many" } else { "one" },
            included = included.len(),
            "validated document shape"
        );
        Ok(Self { data, included })
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn included(&self) -> &[Value] {
        &self.included
    }

    /// Number of primary resources (array length, or 1 for a single resource).
    pub fn primary_count(&self) -> usize {
        match &self.data {
            Value::Array(items) => items.len(),
            _ => 1,
        }
    }

    pub fn into_parts(self) -> (Value, Vec<Value>) {
        (self.data, self.included)
    }
}

/// Minimal `(type, id)` reference to a resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Identifier<'a> {
    pub type_name: &'a str,
    pub id: &'a str,
}

/// Read-only view over a raw resource object. Field-level validation (string
/// `type`, string `id`) is the resolver's job; accessors return `None` for
/// absent or mistyped members.
#[derive(Clone, Copy, Debug)]
pub struct Resource<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> Resource<'a> {
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|object| Self { object })
    }

    pub fn type_name(&self) -> Option<&'a str> {
        self.object.get("type").and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&'a str> {
        self.object.get("id").and_then(Value::as_str)
    }

    pub fn attributes(&self) -> Option<&'a Map<String, Value>> {
        self.object.get("attributes").and_then(Value::as_object)
    }

    pub fn relationships(&self) -> Option<&'a Map<String, Value>> {
        self.object.get("relationships").and_then(Value::as_object)
    }

    pub fn matches(&self, identifier: &Identifier<'_>) -> bool {
        self.type_name() == Some(identifier.type_name) && self.id() == Some(identifier.id)
    }
}

/// Linkage extracted from a relationship object's `data` member.
#[derive(Clone, Debug)]
pub enum Linkage<'a> {
    ToOne(Identifier<'a>),
    ToMany(Vec<Identifier<'a>>),
    Empty,
}

impl<'a> Linkage<'a> {
    /// Extract linkage from a relationship object. Null/absent `data` and
    /// malformed identifiers yield `Empty` (no linkage to resolve).
    pub fn from_relationship(value: &'a Value) -> Self {
        let Some(data) = value.get("data") else {
            return Linkage::Empty;
        };
        match data {
            Value::Object(_) => identifier_from(data)
                .map(Linkage::ToOne)
                .unwrap_or(Linkage::Empty),
            Value::Array(items) => {
                Linkage::ToMany(items.iter().filter_map(identifier_from).collect())
            }
            _ => Linkage::Empty,
        }
    }
}

fn identifier_from(value: &Value) -> Option<Identifier<'_>> {
    let object = value.as_object()?;
    Some(Identifier {
        type_name: object.get("type")?.as_str()?,
        id: object.get("id")?.as_str()?,
    })
}

#[cfg(test)]
mod tests {
    use super::{Document, Identifier, Linkage, Resource};
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn rejects_non_object_documents() {
        for input in ["null", "[]", "42", "\"data\""] {
            let err = Document::from_str(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "input: {input}");
        }
    }

    #[test]
    fn parse_failure_is_invalid_input_with_source() {
        let err = Document::from_str("{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn errors_member_must_be_non_empty_array() {
        let err = Document::from_value(json!({"errors": []})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedErrors);

        let err = Document::from_value(json!({"errors": {"status": "500"}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedErrors);
    }

    #[test]
    fn errors_and_data_are_mutually_exclusive() {
        let err =
            Document::from_value(json!({"errors": [{}], "data": {"type": "t"}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ErrorsWithData);
    }

    #[test]
    fn valid_error_document_surfaces_upstream_list() {
        let err = Document::from_value(json!({"errors": [{"status": "500"}]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamErrors);
        assert_eq!(err.upstream(), Some(vec![json!({"status": "500"})].as_slice()));
    }

    #[test]
    fn missing_data_member_is_rejected() {
        let err = Document::from_value(json!({"meta": {}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingData);
    }

    #[test]
    fn included_defaults_to_empty() {
        let document = Document::from_value(json!({"data": {"type": "t", "id": "1"}})).unwrap();
        assert!(document.included().is_empty());
        assert_eq!(document.primary_count(), 1);
    }

    #[test]
    fn linkage_shapes() {
        let to_one = json!({"data": {"type": "person", "id": "9"}});
        assert!(matches!(
            Linkage::from_relationship(&to_one),
            Linkage::ToOne(Identifier { type_name: "person", id: "9" })
        ));

        let to_many = json!({"data": [
            {"type": "comment", "id": "5"},
            {"type": "comment", "id": "12"}
        ]});
        match Linkage::from_relationship(&to_many) {
            Linkage::ToMany(identifiers) => assert_eq!(identifiers.len(), 2),
            other => panic!("expected to-many, got {other:?}"),
        }

        let null_data = json!({"data": null});
        assert!(matches!(Linkage::from_relationship(&null_data), Linkage::Empty));
        let absent = json!({"meta": {}});
        assert!(matches!(Linkage::from_relationship(&absent), Linkage::Empty));
    }

    #[test]
    fn resource_view_reads_members() {
        let value = json!({
            "type": "article",
            "id": "1",
            "attributes": {"title": "x"},
            "relationships": {"author": {"data": null}}
        });
        let resource = Resource::from_value(&value).unwrap();
        assert_eq!(resource.type_name(), Some("article"));
        assert_eq!(resource.id(), Some("1"));
        assert_eq!(resource.attributes().unwrap().len(), 1);
        assert_eq!(resource.relationships().unwrap().len(), 1);
        assert!(resource.matches(&Identifier { type_name: "article", id: "1" }));
        assert!(!resource.matches(&Identifier { type_name: "article", id: "2" }));
    }
}
