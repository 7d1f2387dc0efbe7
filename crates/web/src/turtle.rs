//! Turtle serialisation of stored entity bodies
//!
//! The subject is the entity URL. Keys that are CURIEs with a known prefix
//! or absolute URIs become predicates; other keys are not serialised.
//! Nested objects without `@id` become blank nodes.

use std::collections::BTreeMap;

use annal_core::EntityValues;
use serde_json::Value;
use url::Url;

pub struct TurtleWriter {
    prefixes: BTreeMap<String, String>,
    base: Url,
}

impl TurtleWriter {
    /// Writer using the prefix definitions of a JSON-LD context document
    pub fn from_context(context: &Value, base: Url) -> Self {
        let prefixes = context
            .get("@context")
            .and_then(Value::as_object)
            .map(|ctx| {
                ctx.iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                    .filter(|(_, uri)| uri.ends_with('/') || uri.ends_with('#'))
                    .collect()
            })
            .unwrap_or_default();
        Self { prefixes, base }
    }

    pub fn write(&self, values: &EntityValues) -> String {
        let mut out = String::new();
        for (prefix, uri) in &self.prefixes {
            out.push_str(&format!("@prefix {}: <{}> .\n", prefix, uri));
        }
        out.push('\n');
        out.push_str(&format!("<{}>", self.base));
        let body = self.predicates(values, 1);
        if body.is_empty() {
            out.push_str(" .\n");
        } else {
            out.push('\n');
            out.push_str(&body.join(" ;\n"));
            out.push_str(" .\n");
        }
        out
    }

    fn predicates(&self, values: &EntityValues, depth: usize) -> Vec<String> {
        let indent = "    ".repeat(depth);
        let mut lines = Vec::new();
        if let Some(types) = values.get("@type") {
            let objects: Vec<String> = as_list(types)
                .iter()
                .filter_map(|t| t.as_str())
                .map(|t| self.iri(t))
                .collect();
            if !objects.is_empty() {
                lines.push(format!("{}a {}", indent, objects.join(", ")));
            }
        }
        let mut keys: Vec<&String> = values.keys().collect();
        keys.sort();
        for key in keys {
            let value = &values[key.as_str()];
            if key.starts_with('@') {
                continue;
            }
            let Some(predicate) = self.predicate(key) else {
                continue;
            };
            let objects: Vec<String> = as_list(value)
                .iter()
                .filter_map(|v| self.object(v, depth))
                .collect();
            if !objects.is_empty() {
                lines.push(format!("{}{} {}", indent, predicate, objects.join(", ")));
            }
        }
        lines
    }

    fn predicate(&self, key: &str) -> Option<String> {
        if let Some((prefix, local)) = key.split_once(':') {
            if self.prefixes.contains_key(prefix) && is_local_name(local) {
                return Some(key.to_string());
            }
        }
        matches!(Url::parse(key), Ok(u) if matches!(u.scheme(), "http" | "https" | "file"))
            .then(|| format!("<{}>", key))
    }

    /// A CURIE when the prefix is known, otherwise an IRI resolved
    /// against the entity URL; unknown CURIEs pass through as IRIs
    fn iri(&self, value: &str) -> String {
        if let Some((prefix, local)) = value.split_once(':') {
            if self.prefixes.contains_key(prefix) && is_local_name(local) {
                return value.to_string();
            }
        }
        match self.base.join(value) {
            Ok(url) => format!("<{}>", url),
            Err(_) => format!("<{}>", value),
        }
    }

    fn object(&self, value: &Value, depth: usize) -> Option<String> {
        match value {
            Value::String(s) => Some(literal(s)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null => None,
            Value::Array(_) => None,
            Value::Object(o) => {
                if let Some(id) = o.get("@id").and_then(Value::as_str) {
                    return Some(self.iri(id));
                }
                let inner = self.predicates(o, depth + 1);
                if inner.is_empty() {
                    None
                } else {
                    Some(format!("[\n{}\n{}]", inner.join(" ;\n"), "    ".repeat(depth)))
                }
            }
        }
    }
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn is_local_name(local: &str) -> bool {
    !local.starts_with("//")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_write_entity() {
        let context = json!({"@context": {
            "annal": "http://purl.org/annalist/2014/#",
            "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
            "annal:type": {"@type": "@id"}
        }});
        let base = Url::parse("http://test.example.com/annalist/c/testcoll/d/testtype/entity1/").unwrap();
        let writer = TurtleWriter::from_context(&context, base);
        let values = json!({
            "@id": "./",
            "@type": ["test:testtype", "annal:EntityData"],
            "annal:id": "entity1",
            "rdfs:label": "Entity \"1\"",
            "annal:type": {"@id": "annal:EntityData"},
            "resource_name": "skipped"
        });
        let ttl = writer.write(values.as_object().unwrap());
        assert_eq!(
            ttl,
            "@prefix annal: <http://purl.org/annalist/2014/#> .\n\
             @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
             \n\
             <http://test.example.com/annalist/c/testcoll/d/testtype/entity1/>\n\
             \x20   a <test:testtype>, annal:EntityData ;\n\
             \x20   annal:id \"entity1\" ;\n\
             \x20   annal:type annal:EntityData ;\n\
             \x20   rdfs:label \"Entity \\\"1\\\"\" .\n"
        );
    }
}
