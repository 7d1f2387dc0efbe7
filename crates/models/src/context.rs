//! JSON-LD context generation for collections
//!
//! The context declares vocabulary prefixes and one coercion entry per
//! property URI used by the collection's views, groups and fields.

use std::collections::BTreeMap;

use annal_core::vocab::{BUILTIN_PREFIXES, annal, is_absolute_uri, is_xsd_datatype};
use annal_core::{AnnalResult, RenderType, Validatable, ValueMode};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::collection::Collection;
use crate::records::{FieldRef, RecordField};
use crate::store::write_json_atomic;

/// Context entry for a field's property, if its values need coercion
pub fn property_definition(field: &RecordField) -> Option<Value> {
    let render_type = match field.value_mode() {
        ValueMode::Entity | ValueMode::Field => RenderType::Enum,
        ValueMode::Import => RenderType::UriImport,
        ValueMode::Upload => RenderType::FileUpload,
        ValueMode::Direct => field.render_type(),
    };
    if render_type.is_literal() {
        let value_type = field.value_type();
        is_xsd_datatype(value_type).then(|| json!({ "@type": value_type }))
    } else if render_type.is_id() {
        Some(json!({ "@type": "@id" }))
    } else if render_type.is_set() {
        Some(json!({ "@container": "@set" }))
    } else if render_type.is_list() {
        Some(json!({ "@container": "@list" }))
    } else {
        None
    }
}

struct ContextBuilder<'a> {
    prefixes: Map<String, Value>,
    properties: Map<String, Value>,
    fields: &'a BTreeMap<String, RecordField>,
}

impl ContextBuilder<'_> {
    fn known_property(&self, property: &str) -> bool {
        if is_absolute_uri(property) {
            return true;
        }
        match property.split_once(':') {
            Some((prefix, _)) => self.prefixes.contains_key(prefix),
            None => false,
        }
    }

    fn add_property(&mut self, property: &str, field: &RecordField) {
        if property.is_empty() || !self.known_property(property) {
            return;
        }
        let Some(definition) = property_definition(field) else {
            return;
        };
        match self.properties.get(property) {
            Some(existing) if *existing != definition => {
                warn!(
                    property,
                    field_id = field.id(),
                    existing = %existing,
                    new = %definition,
                    "incompatible context redefinition"
                );
            }
            Some(_) => {}
            None => {
                self.properties.insert(property.to_string(), definition);
            }
        }
    }

    fn add_field_refs(&mut self, refs: &[FieldRef]) {
        let fields = self.fields;
        for field_ref in refs {
            let Some(field) = fields.get(&field_ref.field_id) else {
                continue;
            };
            let property = field_ref
                .property_uri
                .as_deref()
                .unwrap_or(field.property_uri());
            self.add_property(property, field);
        }
    }
}

/// Build the context document for a collection
pub fn build_collection_context(coll: &Collection) -> AnnalResult<Value> {
    let fields: BTreeMap<String, RecordField> = coll
        .fields()?
        .into_iter()
        .map(|f| (f.id().to_string(), f))
        .collect();
    let mut builder = ContextBuilder {
        prefixes: Map::new(),
        properties: Map::new(),
        fields: &fields,
    };

    for vocab in coll.vocabs()? {
        match vocab.validate() {
            Ok(()) => {
                builder
                    .prefixes
                    .insert(vocab.prefix().to_string(), Value::from(vocab.uri()));
            }
            Err(e) => warn!(coll_id = coll.id(), error = %e, "skipping vocabulary"),
        }
    }
    for (prefix, uri) in BUILTIN_PREFIXES {
        builder
            .prefixes
            .entry(prefix.to_string())
            .or_insert_with(|| Value::from(*uri));
    }
    builder
        .properties
        .insert(annal::TYPE.to_string(), json!({ "@type": "@id" }));

    for view in coll.views()? {
        builder.add_field_refs(&view.field_refs());
    }
    for group in coll.groups()? {
        builder.add_field_refs(&group.field_refs());
    }
    for field in fields.values() {
        builder.add_field_refs(&field.field_fields());
        builder.add_property(field.property_uri(), field);
    }

    let mut context = builder.prefixes;
    context.extend(builder.properties);
    Ok(json!({ "@context": context }))
}

/// Regenerate and write a collection's context file
pub fn write_collection_context(coll: &Collection) -> AnnalResult<Value> {
    let context = build_collection_context(coll)?;
    write_json_atomic(&coll.context_path(), &context)?;
    info!(coll_id = coll.id(), "regenerated context");
    Ok(context)
}
