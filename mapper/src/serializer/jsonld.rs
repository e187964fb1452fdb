//! JSON-LD 1.1 codec for mapper documents.
//!
//! Writing produces a flat document: the prefix `@context` and one `@graph`
//! node per subject block. Reading accepts what the StreamPipes backend and UI
//! exchange: a `@graph` document, a bare array of nodes, or a single node,
//! with embedded node objects flattened into their own blocks.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::context::iris::RDF_TYPE;
use crate::context::Context;
use crate::document::{Document, Object, SubjectBlock};

/// Errors raised while reading JSON-LD.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The top-level value is neither an object nor an array.
    #[error("expected a JSON-LD object or array, found {found}")]
    NotADocument {
        /// JSON type that was found.
        found: &'static str,
    },
    /// A node object has no usable `@id`.
    #[error(
        "node object without a string @id inside {}",
        .parent.as_deref().unwrap_or("the top level")
    )]
    MissingId {
        /// Subject of the enclosing node, for embedded nodes.
        parent: Option<String>,
    },
    /// A value cannot be represented as a literal or a reference.
    #[error("unsupported value for {predicate} on {subject}: {reason}")]
    InvalidValue {
        /// Subject of the node.
        subject: String,
        /// Property key.
        predicate: String,
        /// What was wrong.
        reason: &'static str,
    },
}

/// Serializes a document to a JSON-LD `Value`.
///
/// Type tags and predicates are compacted against `context`; subjects and
/// reference targets are written as they appear in the document.
#[must_use]
pub fn to_json_ld(doc: &Document, context: &Context) -> Value {
    let ctx: Map<String, Value> = context
        .iter()
        .map(|(prefix, ns)| (prefix.to_owned(), json!(ns)))
        .collect();
    let graph: Vec<Value> = doc.blocks.iter().map(|b| block_to_json(b, context)).collect();
    json!({
        "@context": Value::Object(ctx),
        "@graph": graph
    })
}

fn block_to_json(block: &SubjectBlock, context: &Context) -> Value {
    let mut node = Map::new();
    node.insert("@id".to_owned(), json!(block.subject));
    for (predicate, object) in &block.pairs {
        let (key, value) = if context.expand(predicate) == RDF_TYPE {
            ("@type".to_owned(), json!(context.compact(&context.expand(object.as_str()))))
        } else {
            let value = match object {
                Object::Literal(s) => json!(s),
                Object::Iri(iri) => json!({ "@id": iri }),
            };
            (context.compact(&context.expand(predicate)), value)
        };
        // A repeated key is promoted to an array rather than overwritten.
        if let Some(existing) = node.get_mut(&key) {
            let prev = std::mem::replace(existing, Value::Null);
            *existing = match prev {
                Value::Array(mut arr) => {
                    arr.push(value);
                    Value::Array(arr)
                }
                other => json!([other, value]),
            };
        } else {
            node.insert(key, value);
        }
    }
    Value::Object(node)
}

/// Parses a JSON-LD value into a document.
///
/// Keys, type tags and identifiers are expanded with `context` merged with
/// any local `@context`. Numbers, booleans and `@value` objects become
/// literals in their lexical form. Node objects that share an `@id` are merged.
///
/// # Errors
///
/// Returns [`CodecError`] for values that are not node objects, nodes without
/// an `@id`, and property values that are neither literals nor references.
pub fn from_json_ld(value: &Value, context: &Context) -> Result<Document, CodecError> {
    let mut ctx = context.clone();
    let nodes: Vec<&Value> = match value {
        Value::Object(map) => {
            if let Some(Value::Object(local)) = map.get("@context") {
                merge_local_context(&mut ctx, local);
            }
            match map.get("@graph") {
                Some(Value::Array(items)) => items.iter().collect(),
                Some(single @ Value::Object(_)) => vec![single],
                Some(_) => return Err(CodecError::NotADocument { found: "non-array @graph" }),
                None => vec![value],
            }
        }
        Value::Array(items) => items.iter().collect(),
        other => return Err(CodecError::NotADocument { found: json_type(other) }),
    };

    let mut doc = Document::new();
    for node in nodes {
        match node {
            Value::Object(map) => {
                flatten_node(map, None, &ctx, &mut doc)?;
            }
            other => return Err(CodecError::NotADocument { found: json_type(other) }),
        }
    }
    Ok(doc)
}

fn merge_local_context(ctx: &mut Context, local: &Map<String, Value>) {
    for (prefix, ns) in local {
        // Term definitions other than plain prefix bindings are ignored.
        if let Value::String(ns) = ns {
            ctx.insert(prefix.clone(), ns.clone());
        }
    }
}

/// Converts one node object into a block and appends it, followed by the
/// blocks of any nodes embedded in it. Returns the node's subject.
fn flatten_node(
    map: &Map<String, Value>,
    parent: Option<&str>,
    ctx: &Context,
    doc: &mut Document,
) -> Result<String, CodecError> {
    let subject = match map.get("@id") {
        Some(Value::String(id)) => ctx.expand(id),
        _ => {
            return Err(CodecError::MissingId {
                parent: parent.map(str::to_owned),
            })
        }
    };

    let mut block = SubjectBlock::new(subject.clone());
    let mut embedded = Vec::new();
    for (key, value) in map {
        match key.as_str() {
            "@type" => {
                for tag in strings(value) {
                    block.push_type(ctx.expand(tag));
                }
            }
            k if k.starts_with('@') => {}
            k => {
                let predicate = ctx.expand(k);
                let mut objects = Vec::new();
                collect_objects(value, &subject, k, ctx, &mut objects, &mut embedded)?;
                for object in objects {
                    block.push(predicate.clone(), object);
                }
            }
        }
    }
    merge_block(doc, block);

    for node in embedded {
        flatten_node(node, Some(&subject), ctx, doc)?;
    }
    Ok(subject)
}

fn collect_objects<'v>(
    value: &'v Value,
    subject: &str,
    key: &str,
    ctx: &Context,
    out: &mut Vec<Object>,
    embedded: &mut Vec<&'v Map<String, Value>>,
) -> Result<(), CodecError> {
    let invalid = |reason| CodecError::InvalidValue {
        subject: subject.to_owned(),
        predicate: key.to_owned(),
        reason,
    };
    match value {
        Value::Null => {}
        Value::String(s) => out.push(Object::Literal(s.clone())),
        Value::Number(n) => out.push(Object::Literal(n.to_string())),
        Value::Bool(b) => out.push(Object::Literal(b.to_string())),
        Value::Array(items) => {
            for item in items {
                collect_objects(item, subject, key, ctx, out, embedded)?;
            }
        }
        Value::Object(map) => {
            if let Some(literal) = map.get("@value") {
                match literal {
                    Value::String(s) => out.push(Object::Literal(s.clone())),
                    Value::Number(n) => out.push(Object::Literal(n.to_string())),
                    Value::Bool(b) => out.push(Object::Literal(b.to_string())),
                    _ => return Err(invalid("@value is not a scalar")),
                }
            } else if let Some(list) = map.get("@list") {
                collect_objects(list, subject, key, ctx, out, embedded)?;
            } else {
                match map.get("@id") {
                    Some(Value::String(id)) => {
                        out.push(Object::Iri(ctx.expand(id)));
                        if map.keys().any(|k| k != "@id") {
                            embedded.push(map);
                        }
                    }
                    _ => return Err(invalid("node object without a string @id")),
                }
            }
        }
    }
    Ok(())
}

/// Appends `block`, or merges it into an existing block for the same subject.
fn merge_block(doc: &mut Document, block: SubjectBlock) {
    match doc.blocks.iter_mut().find(|b| b.subject == block.subject) {
        Some(existing) => {
            for pair in block.pairs {
                if !existing.pairs.contains(&pair) {
                    existing.pairs.push(pair);
                }
            }
        }
        None => doc.push(block),
    }
}

fn strings(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
