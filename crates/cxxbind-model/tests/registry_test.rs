//! Integration tests for ingestion and the object registry.

use cxxbind_model::{ingest, ModelError, RawTree, Symbol};

fn load(json: &str) -> cxxbind_model::ObjectManager {
    let tree = RawTree::from_json(json).expect("Failed to decode tree");
    ingest(tree).objects
}

/// `typedef struct Point {...} Point;` keeps the class registered while the
/// typedef stays reachable through its scope.
#[test]
fn test_typedef_struct_idiom() {
    let objects = load(
        r#"{ "root": {
            "classes": [{ "name": "Point" }],
            "typedefs": [{ "name": "Point", "target": "struct Point" }]
        } }"#,
    );
    assert!(matches!(objects.get("::Point").unwrap(), Symbol::Class(_)));

    let root = objects.symbol(objects.root()).scope().unwrap();
    assert!(objects.symbol(root.typedefs["Point"]).is_typedef());
    assert_eq!(
        objects.resolve_all_typedef("::Point").unwrap().qualified_name(),
        "::Point"
    );
}

#[test]
fn test_lookup_normalizes_names() {
    let objects = load(
        r#"{ "root": { "namespaces": [{ "name": "net", "classes": [{ "name": "Socket" }] }] } }"#,
    );
    assert!(objects.contains("net::Socket"));
    assert!(objects.contains("::net::Socket"));
    assert!(objects.contains("class net::Socket"));
    assert!(matches!(objects.get("Socket"), Err(ModelError::NotFound(_))));
}

#[test]
fn test_typedef_chain_into_namespace() {
    let objects = load(
        r#"{ "root": {
            "namespaces": [{ "name": "net", "classes": [{ "name": "Socket" }] }],
            "typedefs": [
                { "name": "SocketT", "target": "net::Socket" },
                { "name": "Sock", "target": "SocketT" }
            ]
        } }"#,
    );
    let resolved = objects.resolve_all_typedef("Sock").unwrap();
    assert_eq!(resolved.qualified_name(), "::net::Socket");
}
