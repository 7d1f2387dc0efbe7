//! Fields bound to an entity's values
//!
//! A [`BoundField`] pairs a descriptor with the values being displayed and
//! with request extras. Values are resolved on first access and cached.

use std::cell::OnceCell;

use annal_core::vocab::annal;
use annal_core::{AltScope, AnnalError, EntityValues, split_type_entity_id};
use annal_models::Collection;
use serde_json::Value;
use thiserror::Error;
use url::Url;
use url::form_urlencoded;

use crate::choices::lookup_choice;
use crate::descriptor::FieldDescriptor;

/// Why a reference field's target could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("Target id not found for field '{0}'")]
    IdNotFound(String),

    #[error("Target entity not found: {type_id}/{entity_id}")]
    EntityNotFound { type_id: String, entity_id: String },

    #[error("Not permitted to view {type_id}/{entity_id}")]
    NotPermitted { type_id: String, entity_id: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<TargetError> for AnnalError {
    fn from(e: TargetError) -> Self {
        match e {
            TargetError::IdNotFound(field_id) => AnnalError::TargetIdNotFound(field_id),
            TargetError::EntityNotFound { type_id, entity_id } => {
                AnnalError::TargetEntityNotFound { type_id, entity_id }
            }
            TargetError::NotPermitted { type_id, entity_id } => AnnalError::Forbidden {
                user_id: String::new(),
                scope: format!("VIEW {}/{}", type_id, entity_id),
            },
            TargetError::Storage(message) => AnnalError::with_context("target", message),
        }
    }
}

/// A referenced entity as seen by a bound field
#[derive(Debug, Clone)]
pub struct TargetEntity {
    /// URL against which the target's references are resolved
    pub url: Url,
    pub values: EntityValues,
}

/// Loads the entities that reference fields point at
pub trait TargetResolver {
    fn resolve_target(&self, type_id: &str, entity_id: &str) -> Result<Option<TargetEntity>, TargetError>;
}

impl TargetResolver for Collection {
    fn resolve_target(&self, type_id: &str, entity_id: &str) -> Result<Option<TargetEntity>, TargetError> {
        let entity = self
            .load_entity(type_id, entity_id, Some(AltScope::All))
            .map_err(|e| TargetError::Storage(e.to_string()))?;
        Ok(entity.map(|e| TargetEntity {
            url: e.view_url().clone(),
            values: e.values().clone(),
        }))
    }
}

/// Request context made available to bound fields
#[derive(Debug, Clone, Default)]
pub struct Extras {
    /// URL of the current request
    pub request_url: String,
    /// Continuation URL received with the current request
    pub continuation_url: String,
    /// Fallback values, keyed by property
    pub values: EntityValues,
    /// URL of the entity being displayed
    pub entity_url: Option<Url>,
}

/// A field descriptor bound to values
pub struct BoundField<'a> {
    descriptor: &'a FieldDescriptor,
    values: &'a EntityValues,
    extras: &'a Extras,
    name_prefix: String,
    value_key: OnceCell<String>,
    field_value: OnceCell<Value>,
}

impl<'a> BoundField<'a> {
    pub fn new(descriptor: &'a FieldDescriptor, values: &'a EntityValues, extras: &'a Extras) -> Self {
        Self::with_prefix(descriptor, values, extras, "")
    }

    /// Bind a field inside a repeat group; form names take the prefix
    pub fn with_prefix(
        descriptor: &'a FieldDescriptor,
        values: &'a EntityValues,
        extras: &'a Extras,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            descriptor,
            values,
            extras,
            name_prefix: prefix.into(),
            value_key: OnceCell::new(),
            field_value: OnceCell::new(),
        }
    }

    pub fn descriptor(&self) -> &'a FieldDescriptor {
        self.descriptor
    }

    pub fn values(&self) -> &'a EntityValues {
        self.values
    }

    pub fn extras(&self) -> &'a Extras {
        self.extras
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    /// Form field name including any group prefix
    pub fn field_name(&self) -> String {
        format!("{}{}", self.name_prefix, self.descriptor.field_name)
    }

    /// The property or subproperty under which the entity holds the value
    pub fn value_key(&self) -> &str {
        self.value_key.get_or_init(|| {
            let d = self.descriptor;
            std::iter::once(&d.property_uri)
                .chain(d.subproperty_uris.iter())
                .find(|key| self.values.contains_key(key.as_str()))
                .unwrap_or(&d.property_uri)
                .clone()
        })
    }

    /// Field value from the entity, the extras, the default, or empty
    pub fn field_value(&self) -> &Value {
        self.field_value.get_or_init(|| {
            let d = self.descriptor;
            if d.property_uri.is_empty() {
                return Value::String(String::new());
            }
            self.values
                .get(self.value_key())
                .or_else(|| self.extras.values.get(&d.property_uri))
                .or(d.default_value.as_ref())
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()))
        })
    }

    /// Field value as text; non-string values are shown as JSON
    pub fn field_value_text(&self) -> String {
        match self.field_value() {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// View link of the chosen entity, for fields with choices
    pub fn field_value_link(&self) -> Option<&str> {
        let choices = self.descriptor.choices.as_ref()?;
        let value = self.field_value().as_str()?;
        lookup_choice(choices, self.descriptor.ref_type.as_deref(), value)?
            .link
            .as_deref()
    }

    /// Label of the chosen entity, for fields with choices
    pub fn field_value_label(&self) -> Option<&str> {
        let choices = self.descriptor.choices.as_ref()?;
        let value = self.field_value().as_str()?;
        lookup_choice(choices, self.descriptor.ref_type.as_deref(), value).map(|c| c.label.as_str())
    }

    /// Whether the current value is one of the offered choices
    pub fn value_in_choices(&self) -> bool {
        match (&self.descriptor.choices, self.field_value().as_str()) {
            (Some(choices), Some(v)) => lookup_choice(choices, self.descriptor.ref_type.as_deref(), v).is_some(),
            _ => true,
        }
    }

    /// The entity a reference field points at; `None` without a reference type
    pub fn target_entity(&self, resolver: &dyn TargetResolver) -> Result<Option<TargetEntity>, TargetError> {
        let Some(ref_type) = self.descriptor.ref_type.as_deref() else {
            return Ok(None);
        };
        let reference = match self.field_value() {
            Value::String(s) if !s.is_empty() => s.as_str(),
            Value::Object(o) => match o.get("@id").and_then(Value::as_str) {
                Some(id) if !id.is_empty() => id,
                _ => return Err(TargetError::IdNotFound(self.descriptor.field_id.clone())),
            },
            _ => return Err(TargetError::IdNotFound(self.descriptor.field_id.clone())),
        };
        let (type_id, entity_id) = split_type_entity_id(reference, ref_type);
        match resolver.resolve_target(type_id, entity_id)? {
            Some(target) => Ok(Some(target)),
            None => Err(TargetError::EntityNotFound {
                type_id: type_id.to_string(),
                entity_id: entity_id.to_string(),
            }),
        }
    }

    /// The value a reference field surfaces.
    ///
    /// With a reference field the named property of the target entity is
    /// returned; otherwise the field's own value once the target is known
    /// to exist.
    pub fn target_value(&self, resolver: &dyn TargetResolver) -> Result<Value, TargetError> {
        match self.target_entity(resolver)? {
            None => Ok(self.field_value().clone()),
            Some(target) => match self.descriptor.ref_field.as_deref() {
                Some(ref_field) => Ok(target
                    .values
                    .get(ref_field)
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new()))),
                None => Ok(self.field_value().clone()),
            },
        }
    }

    /// Link for the target value, resolved against the target's URL.
    ///
    /// Attachment records link to their `resource_name`.
    pub fn target_value_link(&self, resolver: &dyn TargetResolver) -> Result<Option<String>, TargetError> {
        let target = self.target_entity(resolver)?;
        let value = match (&target, self.descriptor.ref_field.as_deref()) {
            (Some(t), Some(ref_field)) => t.values.get(ref_field).cloned().unwrap_or(Value::Null),
            (Some(t), None) => return Ok(Some(t.url.path().to_string())),
            (None, _) => self.field_value().clone(),
        };
        let base = target.map(|t| t.url).or_else(|| self.extras.entity_url.clone());
        let reference = match &value {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Object(o) => match o.get(annal::RESOURCE_NAME).and_then(Value::as_str) {
                Some(name) => name.to_string(),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(match base.and_then(|b| b.join(&reference).ok()) {
            Some(url) => url.to_string(),
            None => reference,
        }))
    }

    /// The current request URL carrying the continuation it was given
    pub fn continuation_url(&self) -> String {
        if self.extras.continuation_url.is_empty() {
            return self.extras.request_url.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("continuation_url", &self.extras.continuation_url)
            .finish();
        let sep = if self.extras.request_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.extras.request_url, sep, query)
    }

    /// Query parameter returning to the current page
    pub fn continuation_param(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("continuation_url", &self.continuation_url())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::describe_fields;
    use crate::selector::SelectorContext;
    use annal_core::RenderType;
    use annal_models::{FieldRef, RecordField, RecordType, Site};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn values(v: Value) -> EntityValues {
        v.as_object().cloned().unwrap()
    }

    fn setup() -> (TempDir, Collection) {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), "http://test.example.com/annalist/").unwrap();
        site.initialize().unwrap();
        let coll = site.create_collection("testcoll", Default::default()).unwrap();
        coll.create_entity("_type", "img", RecordType::values("Image", "test:Image", &[]).build())
            .unwrap();
        coll.create_entity(
            "img",
            "pic1",
            values(json!({
                "rdfs:label": "Picture",
                "test:file": {"resource_name": "file.jpg", "resource_type": "image/jpeg"}
            })),
        )
        .unwrap();
        coll.create_entity(
            "_field",
            "Img_ref",
            RecordField::values("Image", RenderType::RefImage, "test:image", "small:0,12")
                .with(annal::FIELD_REF_TYPE, "img")
                .with(annal::FIELD_REF_FIELD, "test:file")
                .build(),
        )
        .unwrap();
        (tmp, coll)
    }

    fn describe(coll: &Collection, id: &str) -> FieldDescriptor {
        describe_fields(coll, &[FieldRef::new(id)], &SelectorContext::new(), &mut Vec::new())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_field_value_fallbacks() {
        let (_tmp, coll) = setup();
        let mut d = describe(&coll, "Entity_label");
        let extras = Extras {
            values: values(json!({"rdfs:label": "From extras"})),
            ..Default::default()
        };
        let entity = values(json!({"rdfs:label": "Stored"}));
        assert_eq!(BoundField::new(&d, &entity, &extras).field_value(), &json!("Stored"));

        let empty = EntityValues::new();
        assert_eq!(BoundField::new(&d, &empty, &extras).field_value(), &json!("From extras"));

        d.default_value = Some(json!("Default"));
        let none = Extras::default();
        assert_eq!(BoundField::new(&d, &empty, &none).field_value(), &json!("Default"));
        d.default_value = None;
        assert_eq!(BoundField::new(&d, &empty, &none).field_value_text(), "");
    }

    #[test]
    fn test_subproperty_value_key() {
        let (_tmp, coll) = setup();
        let mut d = describe(&coll, "Entity_label");
        d.subproperty_uris = vec!["test:title".to_string()];
        let entity = values(json!({"test:title": "Sub"}));
        let extras = Extras::default();
        let bound = BoundField::new(&d, &entity, &extras);
        assert_eq!(bound.value_key(), "test:title");
        assert_eq!(bound.field_value(), &json!("Sub"));
    }

    #[test]
    fn test_prefixed_field_name() {
        let (_tmp, coll) = setup();
        let d = describe(&coll, "Entity_label");
        let empty = EntityValues::new();
        let extras = Extras::default();
        let bound = BoundField::with_prefix(&d, &empty, &extras, "View_fields__0__");
        assert_eq!(bound.field_name(), "View_fields__0__Entity_label");
    }

    #[test]
    fn test_target_value_and_link() {
        let (_tmp, coll) = setup();
        let d = describe(&coll, "Img_ref");
        let extras = Extras::default();

        let entity = values(json!({"test:image": "pic1"}));
        let bound = BoundField::new(&d, &entity, &extras);
        assert_eq!(
            bound.target_value(&coll).unwrap(),
            json!({"resource_name": "file.jpg", "resource_type": "image/jpeg"})
        );
        assert_eq!(
            bound.target_value_link(&coll).unwrap().as_deref(),
            Some("http://test.example.com/annalist/c/testcoll/d/img/pic1/file.jpg")
        );
        assert_eq!(bound.field_value_link(), Some("/annalist/c/testcoll/d/img/pic1/"));
    }

    #[test]
    fn test_target_failures_are_distinguished() {
        let (_tmp, coll) = setup();
        let d = describe(&coll, "Img_ref");
        let extras = Extras::default();

        let empty = EntityValues::new();
        let err = BoundField::new(&d, &empty, &extras).target_value(&coll).unwrap_err();
        assert_eq!(err, TargetError::IdNotFound("Img_ref".to_string()));

        let missing = values(json!({"test:image": "img/nopic"}));
        let err = BoundField::new(&d, &missing, &extras).target_value(&coll).unwrap_err();
        assert_eq!(
            err,
            TargetError::EntityNotFound {
                type_id: "img".to_string(),
                entity_id: "nopic".to_string()
            }
        );
        assert!(matches!(AnnalError::from(err), AnnalError::TargetEntityNotFound { .. }));
    }

    #[test]
    fn test_continuation() {
        let (_tmp, coll) = setup();
        let d = describe(&coll, "Entity_label");
        let empty = EntityValues::new();
        let extras = Extras {
            request_url: "/annalist/c/testcoll/d/img/pic1/".to_string(),
            continuation_url: "/annalist/c/testcoll/d/img/".to_string(),
            ..Default::default()
        };
        let bound = BoundField::new(&d, &empty, &extras);
        assert_eq!(
            bound.continuation_url(),
            "/annalist/c/testcoll/d/img/pic1/?continuation_url=%2Fannalist%2Fc%2Ftestcoll%2Fd%2Fimg%2F"
        );
        assert!(bound.continuation_param().starts_with("continuation_url=%2Fannalist%2Fc%2Ftestcoll%2Fd%2Fimg%2Fpic1%2F%3F"));
    }
}
