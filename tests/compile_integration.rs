//! Integration tests for schema compilation.
//!
//! These tests load model descriptors the way a host would and check the
//! compiled documents end to end.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use sigil::prelude::*;
use sigil::compiler::{SchemaFormat, SchemaType};

const BLOG: &str = r#"{
    "models": [
        {
            "name": "User",
            "fields": [
                {"name": "name", "type": "string", "annotations": [{"kind": "IsNotEmpty"}]},
                {"name": "email", "type": "string", "annotations": [
                    {"kind": "IsEmail"},
                    {"kind": "IsNotEmpty"}
                ]},
                {"name": "posts", "type": "Post[]", "annotations": [{"kind": "ArrayNotEmpty"}]},
                {"name": "avatar", "type": "UploadedFile"}
            ]
        },
        {
            "name": "Post",
            "fields": [
                {"name": "title", "type": "string", "annotations": [
                    {"kind": "MinLength", "args": [2]},
                    {"kind": "MaxLength", "args": [100]}
                ]},
                {"name": "author", "type": "User"},
                {"name": "tags", "type": "Array", "annotations": [
                    {"kind": "IsNotEmpty", "each": true}
                ]},
                {"name": "publishedAt", "type": "date"}
            ]
        }
    ]
}"#;

fn blog() -> SchemaCompiler<ModelRegistry> {
    SchemaCompiler::new(ModelRegistry::from_json_str(BLOG).expect("Failed to load descriptor"))
}

/// Test the canonical User model end to end
#[test]
fn test_user_end_to_end() {
    let registry = ModelRegistry::from_json_str(
        r#"{"models": [{"name": "User", "fields": [
            {"name": "name", "type": "string", "annotations": [{"kind": "IsNotEmpty"}]},
            {"name": "email", "type": "string", "annotations": [{"kind": "IsEmail"}]},
            {"name": "age", "type": "number", "annotations": [
                {"kind": "IsInt"},
                {"kind": "Min", "args": [18]},
                {"kind": "Max", "args": [100]}
            ]}
        ]}]}"#,
    )
    .expect("Failed to load descriptor");

    let compiled = SchemaCompiler::new(registry)
        .compile("User")
        .expect("Failed to compile User");

    let expected = json!({
        "name": "User",
        "schema": {
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "email": {"type": "string", "format": "email"},
                "age": {"type": "integer", "format": "int32", "minimum": 18, "maximum": 100}
            },
            "required": ["name"]
        }
    });
    assert_eq!(serde_json::to_value(&*compiled).unwrap(), expected);
}

/// Test that repeated compiles hit the cache
#[test]
fn test_idempotent_compilation() {
    let compiler = blog();
    let first = compiler.compile("User").expect("Failed to compile User");
    let second = compiler.compile("User").expect("Failed to compile User");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
    assert!(compiler.stats().hits >= 1);
}

/// Test that mutually referencing models terminate with stubs
#[test]
fn test_mutual_cycle() {
    let compiler = blog();
    let user = compiler.compile("User").expect("Failed to compile User");

    let posts = user.schema.property("posts").expect("posts property");
    let post = posts.items.as_deref().expect("posts items");
    assert!(post.is_object());

    let author = post
        .properties
        .as_ref()
        .and_then(|p| p.get("author"))
        .expect("author property");
    assert_eq!(
        serde_json::to_value(author).unwrap(),
        json!({"type": "object", "properties": {}, "required": []})
    );
    assert!(compiler.stats().stubs >= 1);
}

/// Test a long reference chain that loops back to its start
#[test]
fn test_long_cycle() {
    let depth = 64;
    let models = (0..depth).map(|i| {
        Model::new(format!("Link{i}"))
            .with_field(Field::new("next", format!("Link{}", (i + 1) % depth).as_str()))
    });
    let registry = ModelRegistry::from_models(models).expect("Failed to build registry");
    let compiler = SchemaCompiler::new(registry);

    compiler.compile("Link0").expect("Failed to compile chain");
    let stats = compiler.stats();
    assert_eq!(stats.misses, depth as u64);
    assert_eq!(stats.stubs, 1);
}

/// Test annotation composition on scalar fields
#[test]
fn test_annotation_composition() {
    let compiler = blog();
    let post = compiler.compile("Post").expect("Failed to compile Post");

    let title = post.schema.property("title").expect("title property");
    assert_eq!((title.min_length, title.max_length), (Some(2), Some(100)));

    let published = post.schema.property("publishedAt").expect("publishedAt property");
    assert_eq!(published.schema_type, SchemaType::String);
    assert_eq!(published.format, Some(SchemaFormat::DateTime));
}

/// Test required accumulation and array-not-empty
#[test]
fn test_required_accumulation() {
    let compiler = blog();
    let user = compiler.compile("User").expect("Failed to compile User");

    let required: Vec<_> = user.schema.required.iter().map(|s| s.as_str()).collect();
    assert_eq!(required, vec!["name", "email", "posts"]);
    assert_eq!(user.schema.property("posts").unwrap().min_items, Some(1));

    // Element-scoped IsNotEmpty does not mark the field
    let post = compiler.compile("Post").expect("Failed to compile Post");
    assert!(post.schema.required.is_empty());
    assert_eq!(
        serde_json::to_value(post.schema.property("tags").unwrap()).unwrap(),
        json!({"type": "array", "items": {"type": "string"}})
    );
}

/// Test binary family mapping
#[test]
fn test_binary_family() {
    let model = Model::new("Media")
        .with_field(Field::new("buffer", "Buffer"))
        .with_field(Field::new("bytes", "Uint8Array"))
        .with_field(Field::new("upload", "Express.Multer.File"))
        .with_field(Field::new("raw", PrimitiveType::Binary));
    let compiler = SchemaCompiler::new(ModelRegistry::new());
    let compiled = compiler.compile_model(&model);

    for property in compiled.schema.properties.values() {
        assert_eq!(
            serde_json::to_value(property).unwrap(),
            json!({"type": "string", "format": "binary"})
        );
    }
    let user = blog().compile("User").unwrap();
    assert_eq!(
        serde_json::to_value(user.schema.property("avatar").unwrap()).unwrap(),
        json!({"type": "string", "format": "binary"})
    );
}

/// Test that missing nested references degrade without failing siblings
#[test]
fn test_missing_nested_reference() {
    let model = Model::new("Order")
        .with_field(Field::new("customer", "Customer"))
        .with_field(Field::new("lines", "LineItem[]"))
        .with_field(
            Field::new("note", PrimitiveType::String)
                .with_annotation(Annotation::new(AnnotationKind::IsNotEmpty)),
        );
    let compiler = SchemaCompiler::new(ModelRegistry::from_models([model]).unwrap());
    let order = compiler.compile("Order").expect("Failed to compile Order");

    assert_eq!(
        serde_json::to_value(&order.schema).unwrap(),
        json!({
            "type": "object",
            "properties": {
                "customer": {"type": "object", "properties": {}, "required": []},
                "lines": {
                    "type": "array",
                    "items": {"type": "object", "properties": {}, "required": []}
                },
                "note": {"type": "string"}
            },
            "required": ["note"]
        })
    );
}

/// Test that a missing top-level model is the one hard failure
#[test]
fn test_missing_top_level_model() {
    let err = blog().compile("Comment").unwrap_err();
    assert!(matches!(err, sigil::SchemaError::ModelNotFound { .. }));
    assert!(err.to_string().contains("Comment"));
}

/// Test that compiled documents survive a text round trip
#[test]
fn test_json_round_trip() {
    let compiler = blog();
    for name in ["User", "Post"] {
        let compiled = compiler.compile(name).expect("Failed to compile");
        let text = compiled.to_json_pretty().expect("Failed to encode");
        let decoded = CompiledSchema::from_json(&text).expect("Failed to decode");
        assert_eq!(decoded, *compiled);
        assert_eq!(decoded.to_json().unwrap(), compiled.to_json().unwrap());
    }
}

/// Test compiling a batch of components
#[test]
fn test_compile_all_components() {
    let compiler = blog();
    let components = compiler.compile_all(["Post", "User"]).expect("Failed to compile");
    assert_eq!(
        components.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
        vec!["Post", "User"]
    );

    let everything = compiler.compile_registry();
    assert_eq!(everything.len(), 2);
    assert_eq!(everything["Post"], components["Post"]);
}

/// Test a host-supplied resolver that builds models on demand
#[test]
fn test_closure_resolver() {
    let resolver = |name: &str| match name {
        "Point" => Some(
            Model::new("Point")
                .with_field(Field::new("x", PrimitiveType::Number))
                .with_field(Field::new("y", PrimitiveType::Number)),
        ),
        "Shape" => Some(Model::new("Shape").with_field(Field::new("vertices", "Point[]"))),
        _ => None,
    };
    let compiler = SchemaCompiler::new(resolver);
    let shape = compiler.compile("Shape").expect("Failed to compile Shape");

    let vertices = shape.schema.property("vertices").unwrap();
    let point = vertices.items.as_deref().unwrap();
    assert_eq!(point.properties.as_ref().unwrap().len(), 2);
}
