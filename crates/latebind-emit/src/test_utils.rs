//! Shared fixtures for emitter tests: the stock binder runtime plus a small
//! target type and a call-site holder.

use indoc::indoc;
use latebind_bytecode::{Colors, MethodBody, Opcode, Operand};
use latebind_core::{FieldRef, TypeRef, TypeUniverse, parse_manifest};

use crate::{BinderProfile, CallSiteEmitter, stock_universe};

const DEMO: &str = indoc! {r#"
    { "types": [
      { "name": "Demo.Widget",
        "fields": [{ "name": "Name", "type": "System.String" }],
        "methods": [{ "name": "Describe", "returns": "System.String", "virtual": true }] },
      { "name": "Demo.Sites",
        "fields": [
          { "name": "NameSite",
            "type": "System.Runtime.CompilerServices.CallSite`1<System.Func`3<System.Runtime.CompilerServices.CallSite, System.Object, System.Object>>",
            "static": true }
        ] }
    ] }
"#};

pub fn universe() -> TypeUniverse {
    let mut u = stock_universe().unwrap();
    u.load_manifest(&parse_manifest(DEMO).unwrap()).unwrap();
    u
}

pub fn emitter(u: &TypeUniverse) -> CallSiteEmitter<'_> {
    CallSiteEmitter::new(u, &BinderProfile::default()).unwrap()
}

pub fn ty(u: &TypeUniverse, name: &str) -> TypeRef {
    u.parse(name).unwrap()
}

pub fn widget(u: &TypeUniverse) -> TypeRef {
    ty(u, "Demo.Widget")
}

pub fn name_site(u: &TypeUniverse) -> FieldRef {
    u.lookup_field(&ty(u, "Demo.Sites"), "NameSite").unwrap().unwrap()
}

/// Body with three arguments and no return value.
pub fn body() -> MethodBody {
    MethodBody::builder("stub").args(3).build()
}

pub fn dump(u: &TypeUniverse, body: &MethodBody) -> String {
    body.dump(u, Colors::OFF)
}

/// Names of all called methods, in order.
pub fn calls(body: &MethodBody) -> Vec<String> {
    body.instructions()
        .iter()
        .filter_map(|i| match &i.operand {
            Operand::Method(m) => Some(m.name.clone()),
            _ => None,
        })
        .collect()
}

/// Length pushed right before each `newarr`.
pub fn array_lengths(body: &MethodBody) -> Vec<i32> {
    let code = body.instructions();
    code.iter()
        .enumerate()
        .filter(|(_, i)| i.opcode == Opcode::Newarr)
        .filter_map(|(at, _)| code[at - 1].operand.as_int())
        .collect()
}

/// Flags passed to every `CSharpArgumentInfo.Create` call, in order.
pub fn descriptor_flags(body: &MethodBody) -> Vec<i32> {
    let code = body.instructions();
    code.iter()
        .enumerate()
        .filter(|(_, i)| matches!(&i.operand, Operand::Method(m) if m.name == "Create" && m.params.len() == 2))
        .filter_map(|(at, _)| code[at - 2].operand.as_int())
        .collect()
}

/// String constants, in order.
pub fn strings(body: &MethodBody) -> Vec<String> {
    body.instructions()
        .iter()
        .filter_map(|i| match &i.operand {
            Operand::Str(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}
