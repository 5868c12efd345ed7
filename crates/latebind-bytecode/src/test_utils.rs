//! Shared fixtures for sink tests.

use indoc::indoc;
use latebind_core::{FieldRef, MethodRef, TypeRef, TypeUniverse};

const MANIFEST: &str = indoc! {r#"
    { "types": [
      { "name": "System.Object" },
      { "name": "System.String" },
      { "name": "Demo.Widget",
        "fields": [
          { "name": "Name", "type": "System.String" },
          { "name": "Cache", "type": "System.Object", "static": true }
        ],
        "methods": [
          { "name": "Describe", "returns": "System.String", "virtual": true },
          { "name": "Log", "params": ["System.String"], "static": true }
        ] }
    ] }
"#};

pub fn universe() -> TypeUniverse {
    TypeUniverse::from_manifest_json(MANIFEST).unwrap()
}

pub fn ty(u: &TypeUniverse, name: &str) -> TypeRef {
    u.parse(name).unwrap()
}

pub fn widget_field(u: &TypeUniverse, name: &str) -> FieldRef {
    u.lookup_field(&ty(u, "Demo.Widget"), name).unwrap().unwrap()
}

pub fn widget_method(u: &TypeUniverse, name: &str) -> MethodRef {
    u.lookup_methods(&ty(u, "Demo.Widget"), name)
        .unwrap()
        .remove(0)
}
