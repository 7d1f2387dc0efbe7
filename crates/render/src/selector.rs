//! Restriction expressions for reference fields
//!
//! ```text
//! selector := "" | "ALL" | clause ("and" clause)*
//! clause   := operand ("==" | "!=" | "in") operand
//! operand  := "[" field "]"            field of the candidate entity
//!           | name "[" field "]"       field of a context value
//!           | name "." field           field of a context value
//!           | "'" text "'" | '"' text '"'
//!           | bare                     entity field on the left, literal on the right
//! ```
//!
//! Selectors are compiled once per field descriptor and evaluated against
//! each candidate entity.

use std::collections::HashMap;
use std::sync::LazyLock;

use annal_core::{AnnalError, AnnalResult, EntityValues};
use regex::Regex;
use serde_json::Value;

/// Named values visible to selectors, such as `view`
pub type SelectorContext = HashMap<String, EntityValues>;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?:(?P<op>==|!=)|'(?P<sq>(?:[^'\\]|\\.)*)'|"(?P<dq>(?:[^"\\]|\\.)*)"|(?P<ctx>[A-Za-z_][A-Za-z0-9_]*)?\[(?P<field>[^\]]+)\]|(?P<bare>[^\s\[\]'"=!]+))"#,
    )
    .expect("selector token pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Op(String),
    Quoted(String),
    Bracket { context: Option<String>, field: String },
    Bare(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Entity(String),
    Context { name: String, field: String },
    Literal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Eq,
    Ne,
    In,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    left: Operand,
    op: Comparison,
    right: Operand,
}

/// A compiled selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    clauses: Vec<Clause>,
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn tokenize(source: &str) -> AnnalResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = source;
    while !rest.trim().is_empty() {
        let caps = TOKEN
            .captures(rest)
            .ok_or_else(|| AnnalError::unexpected(format!("selector syntax near '{}'", rest.trim())))?;
        let token = if let Some(op) = caps.name("op") {
            Token::Op(op.as_str().to_string())
        } else if let Some(s) = caps.name("sq").or_else(|| caps.name("dq")) {
            Token::Quoted(unescape(s.as_str()))
        } else if let Some(field) = caps.name("field") {
            Token::Bracket {
                context: caps.name("ctx").map(|c| c.as_str().to_string()),
                field: field.as_str().to_string(),
            }
        } else if let Some(bare) = caps.name("bare") {
            Token::Bare(bare.as_str().to_string())
        } else {
            return Err(AnnalError::unexpected(format!("selector syntax in '{}'", source)));
        };
        tokens.push(token);
        let consumed = caps.get(0).map(|m| m.end()).unwrap_or(rest.len());
        rest = &rest[consumed..];
    }
    Ok(tokens)
}

fn operand(token: Token, left: bool) -> AnnalResult<Operand> {
    match token {
        Token::Quoted(s) => Ok(Operand::Literal(s)),
        Token::Bracket { context: None, field } => Ok(Operand::Entity(field)),
        Token::Bracket {
            context: Some(name),
            field,
        } => Ok(Operand::Context { name, field }),
        Token::Bare(word) => {
            // `view.annal:record_type` names a context value
            if let Some((name, field)) = word.split_once('.') {
                if !name.is_empty()
                    && !name.contains(':')
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    && !field.is_empty()
                {
                    return Ok(Operand::Context {
                        name: name.to_string(),
                        field: field.to_string(),
                    });
                }
            }
            if left {
                Ok(Operand::Entity(word))
            } else {
                Ok(Operand::Literal(word))
            }
        }
        Token::Op(op) => Err(AnnalError::unexpected(format!("selector: unexpected '{}'", op))),
    }
}

impl Selector {
    /// Compile a selector expression
    pub fn parse(source: &str) -> AnnalResult<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() || trimmed == "ALL" {
            return Ok(Self::all());
        }
        let mut tokens = tokenize(trimmed)?.into_iter();
        let mut clauses = Vec::new();
        loop {
            let left = tokens
                .next()
                .ok_or_else(|| AnnalError::unexpected(format!("selector '{}' is incomplete", source)))?;
            let op = match tokens.next() {
                Some(Token::Op(op)) if op == "==" => Comparison::Eq,
                Some(Token::Op(op)) if op == "!=" => Comparison::Ne,
                Some(Token::Bare(word)) if word == "in" => Comparison::In,
                other => {
                    return Err(AnnalError::unexpected(format!(
                        "selector '{}': expected comparison, found {:?}",
                        source, other
                    )));
                }
            };
            let right = tokens
                .next()
                .ok_or_else(|| AnnalError::unexpected(format!("selector '{}' is incomplete", source)))?;
            clauses.push(Clause {
                left: operand(left, true)?,
                op,
                right: operand(right, false)?,
            });
            match tokens.next() {
                None => break,
                Some(Token::Bare(word)) if word == "and" => continue,
                Some(other) => {
                    return Err(AnnalError::unexpected(format!(
                        "selector '{}': unexpected {:?}",
                        source, other
                    )));
                }
            }
        }
        Ok(Self {
            source: source.to_string(),
            clauses,
        })
    }

    /// The selector that accepts every entity
    pub fn all() -> Self {
        Self {
            source: "ALL".to_string(),
            clauses: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_all(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Test a candidate entity's values
    pub fn select(&self, entity: &EntityValues, context: &SelectorContext) -> bool {
        self.clauses.iter().all(|c| c.matches(entity, context))
    }
}

/// Values of an operand, flattened to strings; `{"@id": x}` counts as `x`
fn operand_values(op: &Operand, entity: &EntityValues, context: &SelectorContext) -> Option<Vec<String>> {
    let value = match op {
        Operand::Literal(s) => return Some(vec![s.clone()]),
        Operand::Entity(field) => entity.get(field)?,
        Operand::Context { name, field } => context.get(name)?.get(field)?,
    };
    Some(flatten(value))
}

fn flatten(value: &Value) -> Vec<String> {
    match value {
        Value::Null => vec![],
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(flatten).collect(),
        Value::Object(map) => match map.get("@id") {
            Some(id) => flatten(id),
            None => vec![value.to_string()],
        },
        other => vec![other.to_string()],
    }
}

impl Clause {
    fn matches(&self, entity: &EntityValues, context: &SelectorContext) -> bool {
        let left = operand_values(&self.left, entity, context);
        let right = operand_values(&self.right, entity, context);
        match self.op {
            Comparison::Eq => left.is_some() && left == right,
            Comparison::Ne => left != right,
            Comparison::In => {
                let left = left.unwrap_or_default();
                if left.is_empty() {
                    return true;
                }
                let right = right.unwrap_or_default();
                left.iter().all(|v| right.contains(v))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity() -> EntityValues {
        json!({
            "p:a": "1",
            "p:b": "2",
            "@type": ["http://example.com/type", "foo:bar"],
            "annal:field_entity_type": "test:Type",
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn context() -> SelectorContext {
        let view = json!({"v:a": "1", "v:b": ["2", "3"], "annal:record_type": "test:Type"});
        [("view".to_string(), view.as_object().cloned().unwrap())].into()
    }

    fn select(source: &str) -> bool {
        Selector::parse(source).unwrap().select(&entity(), &context())
    }

    #[test]
    fn test_all_selects_everything() {
        assert!(Selector::parse("ALL").unwrap().is_all());
        assert!(Selector::parse("").unwrap().is_all());
        assert!(select("ALL"));
    }

    #[test]
    fn test_equality() {
        assert!(select("'1' == [p:a]"));
        assert!(!select("[p:a]=='2'"));
        assert!(select("p:a == 1"));
        assert!(select("p:b != 1"));
        assert!(!select("p:a != \"1\""));
        assert!(!select("p:missing == 1"));
    }

    #[test]
    fn test_membership() {
        assert!(select("'foo:bar' in [@type]"));
        assert!(!select("'bar:foo' in [@type]"));
        assert!(select("[p:a] in view[v:a]"));
        assert!(select("[p:b] in view[v:b]"));
        assert!(!select("[p:a] in view[v:b]"));
        assert!(select("[annal:field_entity_type] in view[annal:record_type]"));
        assert!(select("annal:field_entity_type in view.annal:record_type"));
        assert!(select("[p:missing] in view[v:b]"));
    }

    #[test]
    fn test_conjunction() {
        assert!(select("p:a == 1 and p:b == 2"));
        assert!(!select("p:a == 1 and p:b == 3"));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(Selector::parse("p:a ==").is_err());
        assert!(Selector::parse("p:a ~ 1").is_err());
        assert!(Selector::parse("p:a == 1 or p:b == 2").is_err());
    }
}
