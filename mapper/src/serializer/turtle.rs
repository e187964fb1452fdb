//! Turtle 1.1 serializer for mapper documents.
//!
//! Emits the context's prefixes, then one statement group per subject block
//! with `a` for `rdf:type` and `;`/`,` grouping of predicates and objects.

use crate::context::iris::RDF_TYPE;
use crate::context::Context;
use crate::document::{Document, Object, SubjectBlock};

/// Serializes a document to a Turtle string.
#[must_use]
pub fn to_turtle(doc: &Document, context: &Context) -> String {
    let mut out = String::with_capacity(256 + doc.triple_count() * 64);

    let width = context.iter().map(|(p, _)| p.len()).max().unwrap_or(0);
    for (prefix, ns) in context.iter() {
        let pad = width - prefix.len() + 1;
        out.push_str(&format!("@prefix {prefix}:{:pad$} <{ns}> .\n", ""));
    }
    out.push('\n');

    for block in &doc.blocks {
        write_block(&mut out, block, context);
    }
    out
}

fn write_block(out: &mut String, block: &SubjectBlock, context: &Context) {
    // Predicates keep the order of their first appearance.
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for (predicate, object) in &block.pairs {
        let predicate = context.expand(predicate);
        let term = match object {
            Object::Iri(target) if predicate == RDF_TYPE => name(&context.expand(target), context),
            Object::Iri(target) => format!("<{}>", context.expand(target)),
            Object::Literal(text) => turtle_string(text),
        };
        match groups.iter_mut().find(|(p, _)| *p == predicate) {
            Some((_, objects)) => objects.push(term),
            None => groups.push((predicate, vec![term])),
        }
    }

    out.push_str(&format!("<{}>", context.expand(&block.subject)));
    if groups.is_empty() {
        out.push_str(" .\n\n");
        return;
    }
    let lines: Vec<String> = groups
        .iter()
        .map(|(predicate, objects)| {
            let verb = if predicate == RDF_TYPE {
                "a".to_owned()
            } else {
                name(predicate, context)
            };
            format!("  {verb} {}", objects.join(" , "))
        })
        .collect();
    out.push('\n');
    out.push_str(&lines.join(" ;\n"));
    out.push_str(" .\n\n");
}

/// Writes `iri` as a prefixed name when the local part is a plain name,
/// otherwise in angle brackets.
fn name(iri: &str, context: &Context) -> String {
    let compact = context.compact(iri);
    match compact.split_once(':') {
        Some((_, local))
            if compact != iri
                && !local.is_empty()
                && local
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') =>
        {
            compact
        }
        _ => format!("<{iri}>"),
    }
}

fn turtle_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("\"{escaped}\"")
}
