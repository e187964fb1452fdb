//! N-Triples serializer for mapper documents.
//!
//! One triple per line with absolute IRIs. CURIEs in the document are expanded
//! through the context; literals are written as `xsd:string`.

use crate::context::iris::XSD_STRING;
use crate::context::Context;
use crate::document::{Document, Object};

/// Serializes a document to an N-Triples string.
#[must_use]
pub fn to_ntriples(doc: &Document, context: &Context) -> String {
    let mut out = String::with_capacity(doc.triple_count() * 96);
    for t in doc.triples() {
        let object = match t.object {
            Object::Iri(target) => iri(&context.expand(target)),
            Object::Literal(text) => lit(text),
        };
        triple(
            &mut out,
            &context.expand(t.subject),
            &context.expand(t.predicate),
            &object,
        );
    }
    out
}

fn triple(out: &mut String, subj: &str, pred: &str, obj: &str) {
    out.push('<');
    out.push_str(subj);
    out.push_str("> <");
    out.push_str(pred);
    out.push_str("> ");
    out.push_str(obj);
    out.push_str(" .\n");
}

fn iri(s: &str) -> String {
    format!("<{s}>")
}

fn lit(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("\"{escaped}\"^^<{XSD_STRING}>")
}
