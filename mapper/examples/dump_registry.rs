//! Lists every built-in class mapping and serializes a sample schema.
//!
//! Run with: `cargo run --example dump_registry -p sp-mapper`

use sp_mapper::model::{Entity, EventProperty, EventPropertyPrimitive, EventSchema};
use sp_mapper::{Encoder, MapperConfig, MappingKind, Multiplicity, Registry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = Registry::global()?;

    println!("StreamPipes entity mappings ({} classes)", registry.len());
    for class in registry.classes() {
        println!();
        println!("  {:28} {}", class.class, class.type_tag);
        for field in &class.fields {
            let mapping = match &field.kind {
                MappingKind::Identity => "(subject)".to_owned(),
                MappingKind::Predicate { iri, range } => format!("{iri} [{range:?}]"),
            };
            let many = if field.multiplicity == Multiplicity::Multi { "*" } else { "" };
            println!("    {:24} {mapping}{many}", field.name);
        }
    }

    let mut schema = EventSchema::new();
    schema.event_properties.push(EventProperty::Primitive(EventPropertyPrimitive {
        runtime_name: Some("temperature".into()),
        runtime_type: Some("http://www.w3.org/2001/XMLSchema#float".into()),
        ..EventPropertyPrimitive::new(None)
    }));
    let doc = Encoder::new(registry, &MapperConfig::default()).encode(&schema.to_instance())?;

    println!();
    let json_ld = sp_mapper::serializer::jsonld::to_json_ld(&doc, registry.context());
    println!("{}", serde_json::to_string_pretty(&json_ld)?);
    println!();
    print!("{}", sp_mapper::serializer::turtle::to_turtle(&doc, registry.context()));
    Ok(())
}
