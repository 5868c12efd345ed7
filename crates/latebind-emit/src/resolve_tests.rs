use latebind_core::{
    FieldDef, GenericContextId, MethodDef, TypeDef, TypeId, TypeRef, TypeUniverse, UniverseError,
};
use test_log::test;

use crate::test_utils::{ty, universe, widget};
use crate::{GenericBinding, LookupScope, MemberResolver, ResolveError};

const SITE: &str = "System.Runtime.CompilerServices.CallSite`1<System.Func`3<System.Runtime.CompilerServices.CallSite, !0, System.Object>>";

/// `Demo.Holder<T>` under construction, with `static CallSite<Func<CallSite, T, object>> Site`.
fn open_holder(u: &mut TypeUniverse, name: &str) -> (TypeId, GenericContextId) {
    let site = ty(u, SITE);
    let (id, ctx) = u
        .begin_generic_type(TypeDef::class(name).with_generic_params(["T"]))
        .unwrap();
    u.add_field(id, FieldDef::static_field("Site", site)).unwrap();
    (id, ctx)
}

/// `CallSite<Func<CallSite, T, object>>` with `T` from `ctx`.
fn open_site(u: &TypeUniverse, ctx: GenericContextId) -> TypeRef {
    ty(u, SITE).substitute(&[u.param(ctx, 0)])
}

#[test]
fn closed_type_matches_direct_lookup() {
    let u = universe();
    let resolver = MemberResolver::new(&u);

    let field = resolver.resolve_field(&widget(&u), "Name").unwrap();

    assert_eq!(Some(field.clone()), u.lookup_field(&widget(&u), "Name").unwrap());
    assert!(!field.is_deferred());
    assert_eq!(
        LookupScope::classify(&u, &widget(&u)).unwrap(),
        LookupScope::Closed(widget(&u))
    );
}

#[test]
fn closed_instantiation_substitutes_arguments() {
    let u = universe();
    let resolver = MemberResolver::new(&u);
    let site = ty(&u, SITE).substitute(&[ty(&u, "System.String")]);

    let target = resolver.resolve_field(&site, "Target").unwrap();
    let invoke = resolver.resolve_method(&target.field_type, "Invoke", None).unwrap();

    assert_eq!(
        u.display_short(&target.field_type).to_string(),
        "Func`3<CallSite, String, Object>"
    );
    assert_eq!(invoke.params.len(), 2);
    assert_eq!(invoke.params[1], ty(&u, "System.String"));
    assert_eq!(invoke.ret, Some(ty(&u, "System.Object")));
    assert!(invoke.has_this);
}

#[test]
fn open_instantiation_goes_through_the_definition() {
    let mut u = universe();
    let (_, ctx) = open_holder(&mut u, "Demo.Holder`1");
    let site = open_site(&u, ctx);
    let resolver = MemberResolver::new(&u);

    let scope = LookupScope::classify(&u, &site).unwrap();
    let target = resolver.resolve_field(&site, "Target").unwrap();
    let create = resolver.resolve_method(&site, "Create", None).unwrap();

    assert!(scope.is_open());
    assert_eq!(
        scope,
        LookupScope::OpenGeneric {
            definition: u.find("System.Runtime.CompilerServices.CallSite`1").unwrap(),
            binding: GenericBinding {
                context: ctx,
                args: site.type_args().to_vec(),
            },
        }
    );
    assert_eq!(target.context, Some(ctx));
    assert_eq!(target.declaring, site);
    assert_eq!(
        u.display_short(&target.field_type).to_string(),
        "Func`3<CallSite, T, Object>"
    );
    assert_eq!(create.context, Some(ctx));
    assert!(!create.has_this);
    assert_eq!(create.ret, Some(site.clone()));
}

#[test]
fn direct_lookup_refuses_open_instantiations() {
    let mut u = universe();
    let (_, ctx) = open_holder(&mut u, "Demo.Holder`1");
    let site = open_site(&u, ctx);

    let err = u.lookup_field(&site, "Target").unwrap_err();

    assert!(matches!(err, UniverseError::OpenInstantiation(_)));
}

#[test]
fn bare_definition_under_construction() {
    let mut u = universe();
    let (holder, ctx) = open_holder(&mut u, "Demo.Holder`1");
    let resolver = MemberResolver::new(&u);

    let field = resolver.resolve_field(&TypeRef::Def(holder), "Site").unwrap();

    assert_eq!(field.context, Some(ctx));
    assert!(field.is_static);
    assert_eq!(u.display_short(&field.declaring).to_string(), "Holder`1<T>");
    assert_eq!(field.field_type, open_site(&u, ctx));
}

#[test]
fn finished_definition_is_closed_again() {
    let mut u = universe();
    let (holder, _) = open_holder(&mut u, "Demo.Holder`1");
    u.finish_type(holder);
    let closed = TypeRef::generic(holder, [ty(&u, "System.String")]);
    let resolver = MemberResolver::new(&u);

    let field = resolver.resolve_field(&closed, "Site").unwrap();

    assert!(!field.is_deferred());
    assert_eq!(field.field_type, ty(&u, SITE).substitute(&[ty(&u, "System.String")]));
}

#[test]
fn parameter_alone_names_no_definition() {
    let mut u = universe();
    let (_, ctx) = open_holder(&mut u, "Demo.Holder`1");
    let resolver = MemberResolver::new(&u);

    let err = resolver.resolve_field(&u.param(ctx, 0), "Length").unwrap_err();

    assert_eq!(err, ResolveError::NoDefinition("T".into()));
}

#[test]
fn mixing_two_open_contexts_is_a_fault() {
    let mut u = universe();
    let (_, first) = open_holder(&mut u, "Demo.First`1");
    let (_, second) = open_holder(&mut u, "Demo.Second`1");
    let func = ty(&u, "System.Func`3<System.Object, System.Object, System.Object>");
    let mixed = TypeRef::generic(
        func.definition().unwrap(),
        [u.param(first, 0), u.param(second, 0), ty(&u, "System.Object")],
    );
    let resolver = MemberResolver::new(&u);

    let err = resolver.resolve_method(&mixed, "Invoke", None).unwrap_err();

    assert!(matches!(
        err,
        ResolveError::Universe(UniverseError::MixedContexts(_))
    ));
}

#[test]
fn missing_member_names_type_and_member() {
    let u = universe();
    let resolver = MemberResolver::new(&u);

    let err = resolver.resolve_field(&widget(&u), "Age").unwrap_err();

    assert_eq!(err.to_string(), "`Demo.Widget` has no member `Age`");
}

#[test]
fn overloads_need_parameter_types() {
    let mut u = universe();
    let string = ty(&u, "System.String");
    let object = ty(&u, "System.Object");
    let id = u.find("Demo.Widget").unwrap();
    u.add_method(id, MethodDef::instance("Print").param(string.clone()))
        .unwrap();
    u.add_method(id, MethodDef::instance("Print").param(object.clone()))
        .unwrap();
    let resolver = MemberResolver::new(&u);

    let exact = resolver
        .resolve_method(&widget(&u), "Print", Some(&[object.clone()][..]))
        .unwrap();
    let ambiguous = resolver.resolve_method(&widget(&u), "Print", None).unwrap_err();
    let missing = resolver
        .resolve_method(&widget(&u), "Print", Some(&[ty(&u, "System.Int32")][..]))
        .unwrap_err();

    assert_eq!(exact.params, [object]);
    assert_eq!(
        ambiguous,
        ResolveError::AmbiguousMethod {
            type_name: "Demo.Widget".into(),
            member: "Print".into(),
            candidates: 2,
        }
    );
    assert_eq!(
        missing.to_string(),
        "`Demo.Widget` has no member `Print(System.Int32)`"
    );
}
