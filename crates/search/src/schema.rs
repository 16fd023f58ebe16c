//! Index schema and mapping definitions.
//!
//! Entities describe their index and field mappings through the [`Document`]
//! trait. Mappings are plain data ([`Mapping`], [`Field`]) so they can be
//! rendered into index-creation bodies and inspected by derived queries,
//! which need to know each property's type and whether it sits under a
//! `nested` path.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::config::ElasticsearchConfig;

/// Elasticsearch field datatypes used by the mappings in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Analyzed full-text field.
    Text,
    /// Exact-value field, not analyzed.
    Keyword,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// 64-bit float.
    Double,
    /// `true`/`false`.
    Boolean,
    /// Date or date-time.
    Date,
    /// Plain object; inner fields are flattened into the parent.
    Object,
    /// Object array indexed so each element can be queried on its own.
    Nested,
}

impl FieldType {
    /// Returns the mapping type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Keyword => "keyword",
            FieldType::Integer => "integer",
            FieldType::Long => "long",
            FieldType::Double => "double",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object => "object",
            FieldType::Nested => "nested",
        }
    }
}

/// A sub-field indexing the same value differently (e.g. `title.verbatim`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerField {
    /// Suffix appended to the parent path.
    pub suffix: String,
    /// Datatype of the sub-field.
    pub field_type: FieldType,
}

/// A mapped property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Property name.
    pub name: String,
    /// Datatype of the property.
    pub field_type: FieldType,
    /// Enables in-memory fielddata on text fields so they can be aggregated.
    pub fielddata: bool,
    /// For nested fields: also index the inner fields on the parent document.
    pub include_in_parent: bool,
    /// Date format, for date fields.
    pub format: Option<String>,
    /// Multi-field variants of this property.
    pub inner_fields: Vec<InnerField>,
    /// Properties of object and nested fields.
    pub properties: Vec<Field>,
}

impl Field {
    /// Creates a field of the given type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            fielddata: false,
            include_in_parent: false,
            format: None,
            inner_fields: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Creates a `text` field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    /// Creates a `keyword` field.
    pub fn keyword(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Keyword)
    }

    /// Creates a nested field with the given properties.
    pub fn nested(name: impl Into<String>, properties: Vec<Field>) -> Self {
        Self {
            properties,
            ..Self::new(name, FieldType::Nested)
        }
    }

    /// Enables fielddata.
    pub fn with_fielddata(mut self) -> Self {
        self.fielddata = true;
        self
    }

    /// Sets `include_in_parent`.
    pub fn with_include_in_parent(mut self) -> Self {
        self.include_in_parent = true;
        self
    }

    /// Sets the date format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Adds an inner field, e.g. `keyword` under suffix `verbatim`.
    pub fn with_inner_field(mut self, suffix: impl Into<String>, field_type: FieldType) -> Self {
        self.inner_fields.push(InnerField {
            suffix: suffix.into(),
            field_type,
        });
        self
    }

    /// Renders the field's mapping body (without its name).
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("type".to_string(), json!(self.field_type.as_str()));
        if self.fielddata {
            body.insert("fielddata".to_string(), json!(true));
        }
        if self.include_in_parent {
            body.insert("include_in_parent".to_string(), json!(true));
        }
        if let Some(ref format) = self.format {
            body.insert("format".to_string(), json!(format));
        }
        if !self.inner_fields.is_empty() {
            let fields: Map<String, Value> = self
                .inner_fields
                .iter()
                .map(|f| (f.suffix.clone(), json!({ "type": f.field_type.as_str() })))
                .collect();
            body.insert("fields".to_string(), Value::Object(fields));
        }
        if !self.properties.is_empty() {
            body.insert("properties".to_string(), properties_json(&self.properties));
        }
        Value::Object(body)
    }
}

fn properties_json(fields: &[Field]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.name.clone(), f.to_json()))
        .collect();
    Value::Object(properties)
}

/// A resolved property path, as seen by query builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    /// Dotted path, e.g. `writers.name`.
    pub path: String,
    /// Datatype at the end of the path.
    pub field_type: FieldType,
    /// Path of the closest enclosing nested field, if any.
    pub nested_path: Option<String>,
}

/// The mapping of an index: its top-level properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    /// Top-level properties.
    pub properties: Vec<Field>,
}

impl Mapping {
    /// Creates a mapping from top-level properties.
    pub fn new(properties: Vec<Field>) -> Self {
        Self { properties }
    }

    /// Renders the `mappings` section of an index-creation body.
    pub fn to_json(&self) -> Value {
        json!({ "properties": properties_json(&self.properties) })
    }

    /// Looks up a dotted path such as `writers.name` or `title.verbatim`.
    pub fn resolve(&self, path: &str) -> Option<PropertyPath> {
        let mut fields = &self.properties;
        let mut nested_path: Option<String> = None;
        let mut walked: Vec<&str> = Vec::new();
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let field = fields.iter().find(|f| f.name == segment)?;
            walked.push(segment);

            if field.field_type == FieldType::Nested {
                nested_path = Some(walked.join("."));
            }

            match segments.peek() {
                None => {
                    return Some(PropertyPath {
                        path: path.to_string(),
                        field_type: field.field_type,
                        nested_path: if field.field_type == FieldType::Nested {
                            // The nested field itself is addressed from its parent.
                            None
                        } else {
                            nested_path
                        },
                    });
                }
                Some(next) => {
                    if let Some(inner) = field.inner_fields.iter().find(|i| i.suffix == *next) {
                        segments.next();
                        if segments.peek().is_some() {
                            return None;
                        }
                        return Some(PropertyPath {
                            path: path.to_string(),
                            field_type: inner.field_type,
                            nested_path,
                        });
                    }
                    fields = &field.properties;
                }
            }
        }
        None
    }

    /// Returns the field at a dotted path, if it is a mapped property.
    pub fn field(&self, path: &str) -> Option<&Field> {
        let mut fields = &self.properties;
        let mut found = None;
        for segment in path.split('.') {
            let field = fields.iter().find(|f| f.name == segment)?;
            fields = &field.properties;
            found = Some(field);
        }
        found
    }
}

/// An entity persisted as a JSON document in a fixed index.
///
/// The implementation plays the role of mapping annotations: it names the
/// index, describes field types, and exposes the store-assigned id.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the index holding documents of this type.
    const INDEX: &'static str;

    /// Returns the document id, if the entity has been saved.
    fn id(&self) -> Option<&str>;

    /// Sets the document id (after the store assigned one, or when read back).
    fn set_id(&mut self, id: String);

    /// Returns the field mappings of the index.
    fn mapping() -> Mapping;
}

/// Builds the index-creation body for a document type.
pub fn create_index_body<T: Document>(config: &ElasticsearchConfig) -> Value {
    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas,
            "refresh_interval": config.refresh_interval,
        },
        "mappings": T::mapping().to_json()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mapping() -> Mapping {
        Mapping::new(vec![
            Field::text("title")
                .with_fielddata()
                .with_inner_field("verbatim", FieldType::Keyword),
            Field::nested("writers", vec![Field::text("name")]).with_include_in_parent(),
            Field::keyword("tags"),
        ])
    }

    #[test]
    fn test_mapping_json() {
        let json = sample_mapping().to_json();
        assert_eq!(json["properties"]["title"]["type"], "text");
        assert_eq!(json["properties"]["title"]["fielddata"], true);
        assert_eq!(
            json["properties"]["title"]["fields"]["verbatim"]["type"],
            "keyword"
        );
        assert_eq!(json["properties"]["writers"]["type"], "nested");
        assert_eq!(json["properties"]["writers"]["include_in_parent"], true);
        assert_eq!(
            json["properties"]["writers"]["properties"]["name"]["type"],
            "text"
        );
        assert_eq!(json["properties"]["tags"]["type"], "keyword");
        assert!(json["properties"]["tags"].get("fielddata").is_none());
    }

    #[test]
    fn test_resolve_nested_path() {
        let mapping = sample_mapping();
        let resolved = mapping.resolve("writers.name").unwrap();
        assert_eq!(resolved.field_type, FieldType::Text);
        assert_eq!(resolved.nested_path.as_deref(), Some("writers"));

        let writers = mapping.resolve("writers").unwrap();
        assert_eq!(writers.field_type, FieldType::Nested);
        assert!(writers.nested_path.is_none());
    }

    #[test]
    fn test_resolve_inner_field() {
        let mapping = sample_mapping();
        let resolved = mapping.resolve("title.verbatim").unwrap();
        assert_eq!(resolved.field_type, FieldType::Keyword);
        assert!(resolved.nested_path.is_none());
    }

    #[test]
    fn test_resolve_unknown_path() {
        let mapping = sample_mapping();
        assert!(mapping.resolve("authors.name").is_none());
        assert!(mapping.resolve("title.verbatim.extra").is_none());
        assert!(mapping.resolve("tags.keyword").is_none());
    }

    #[test]
    fn test_field_lookup() {
        let mapping = sample_mapping();
        assert_eq!(mapping.field("writers.name").unwrap().name, "name");
        assert!(mapping.field("writers.age").is_none());
    }
}
