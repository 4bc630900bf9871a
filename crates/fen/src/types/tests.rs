use std::sync::Arc;

use crate::source::Range;
use crate::surface::TypeIdentifier;

use super::*;

fn primitives() -> PrimitiveTable {
    PrimitiveTable::new()
}

fn context(index: usize) -> LocalContextId {
    LocalContextId::new("Test", index)
}

fn local(name: &str, index: usize) -> Ty {
    Arc::new(Type::LocalType(LocalType {
        name: name.to_string(),
        range: None,
        context: context(index),
    }))
}

fn reference(name: &str, flavour: ReferenceFlavour, next: Ty) -> Ty {
    Arc::new(Type::Reference(TypeReference {
        flavour,
        module: None,
        identifier: TypeIdentifier {
            name: name.to_string(),
            range: Range::single_line(0, 0, name.len()),
        },
        next,
    }))
}

fn record(fields: &[(&str, Ty)]) -> Ty {
    Arc::new(Type::Record(RecordType::new(
        fields
            .iter()
            .map(|(name, ty)| (name.to_string(), None, ty.clone()))
            .collect(),
        None,
    )))
}

fn custom(name: &str, parameters: &[&str], variants: &[(&str, Vec<Ty>)]) -> Ty {
    Arc::new(Type::Custom(CustomType {
        name: name.to_string(),
        fq_name: format!("Test.{name}"),
        declared_at: None,
        parameters: parameters
            .iter()
            .map(|name| LocalTypeDefinition {
                name: name.to_string(),
                range: None,
            })
            .collect(),
        context: context(7),
        variants: variants
            .iter()
            .enumerate()
            .map(|(index, (name, parameters))| Variant {
                name: name.to_string(),
                name_range: None,
                parameters: parameters.clone(),
                index,
            })
            .collect(),
    }))
}

fn alias(name: &str, parameters: &[&str], index: usize, next: Ty) -> Ty {
    Arc::new(Type::Alias(AliasType {
        name: name.to_string(),
        fq_name: format!("Test.{name}"),
        declared_at: None,
        parameters: parameters
            .iter()
            .map(|name| LocalTypeDefinition {
                name: name.to_string(),
                range: None,
            })
            .collect(),
        context: context(index),
        next,
    }))
}

#[test]
fn primitives_compare_by_name() {
    let p = primitives();
    assert!(compatible(&p.int(), &p.int()));
    assert!(!compatible(&p.int(), &p.bool()));
    let wrapped = reference("Int", ReferenceFlavour::Primitive, p.int());
    assert!(compatible(&wrapped, &p.int()));
    assert!(compatible(&p.int(), &wrapped));
}

#[test]
fn any_matching_unifies_with_everything() {
    let p = primitives();
    let any = Type::any();
    let function = Type::function(vec![p.int(), p.bool()]);
    assert!(compatible(&any, &function));
    assert!(compatible(&function, &any));
    assert!(compatible(&any, &any));
}

#[test]
fn records_compare_as_field_sets() {
    let p = primitives();
    let xy = record(&[("x", p.int()), ("y", p.int())]);
    let yx = record(&[("y", p.int()), ("x", p.int())]);
    let x = record(&[("x", p.int())]);
    let xb = record(&[("x", p.int()), ("y", p.bool())]);
    assert!(compatible(&xy, &yx));
    assert!(!compatible(&xy, &x));
    assert!(!compatible(&xy, &xb));
}

#[test]
fn record_indices_follow_parse_order_and_sorted_view_is_by_name() {
    let p = primitives();
    let ty = record(&[("zeta", p.int()), ("alpha", p.bool())]);
    let Type::Record(record) = ty.as_ref() else {
        panic!("expected record");
    };
    assert_eq!(record.fields[0].index, 0);
    assert_eq!(record.fields[1].index, 1);
    let sorted: Vec<&str> = record.sorted_fields().map(|f| f.name.as_str()).collect();
    assert_eq!(sorted, vec!["alpha", "zeta"]);
    assert_eq!(record.field("zeta").map(|f| f.index), Some(0));
    assert!(record.field("missing").is_none());
}

#[test]
fn tuples_and_functions_compare_pairwise() {
    let p = primitives();
    assert!(compatible(
        &Type::tuple(vec![p.int(), p.bool()]),
        &Type::tuple(vec![p.int(), p.bool()])
    ));
    assert!(!compatible(
        &Type::tuple(vec![p.int(), p.bool()]),
        &Type::tuple(vec![p.int()])
    ));
    assert!(!compatible(
        &Type::function(vec![p.int(), p.int()]),
        &Type::function(vec![p.int(), p.bool()])
    ));
}

#[test]
fn custom_types_are_nominal() {
    let p = primitives();
    let a = custom("Shape", &[], &[("Circle", vec![p.int()])]);
    let b = custom("Other", &[], &[("Circle", vec![p.int()])]);
    let a_again = custom("Shape", &[], &[]);
    assert!(!compatible(&a, &b));
    assert!(compatible(&a, &a_again));
}

#[test]
fn aliases_unwrap_before_comparison() {
    let p = primitives();
    let point = alias("Point", &[], 1, record(&[("x", p.int())]));
    assert!(compatible(&point, &record(&[("x", p.int())])));
    let alias_ref = reference("Point", ReferenceFlavour::Alias, point.clone());
    assert!(compatible(&alias_ref, &point));
}

#[test]
fn local_types_bind_on_first_use() {
    let p = primitives();
    let mut unifier = TypeUnifier::new();
    let a = local("a", 1);
    assert!(unifier.unify(&a, &p.int()));
    assert!(unifier.unify(&a, &p.int()));
    assert!(!unifier.unify(&a, &p.bool()));
    assert_eq!(unifier.substitute(&a).human_readable(), "Int");
}

#[test]
fn local_types_from_different_contexts_are_distinct() {
    let p = primitives();
    let mut unifier = TypeUnifier::new();
    assert!(unifier.unify(&local("a", 1), &p.int()));
    assert!(unifier.unify(&local("a", 2), &p.bool()));
    assert!(unifier.lookup(&context(1), "a").is_some());
    assert!(unifier.lookup(&context(3), "a").is_none());
}

#[test]
fn invokers_compare_generators_and_parameters() {
    let p = primitives();
    let list_int = p.list_of(p.int());
    let list_bool = p.list_of(p.bool());
    assert!(compatible(&list_int, &p.list_of(p.int())));
    assert!(!compatible(&list_int, &list_bool));
    assert!(!compatible(&list_int, &p.array_of(p.int())));

    let mut unifier = TypeUnifier::new();
    let list_a = p.list_of(local("a", 1));
    assert!(unifier.unify(&list_a, &list_int));
    assert_eq!(unifier.substitute(&list_a).human_readable(), "List Int");
}

#[test]
fn generic_alias_invoker_expands() {
    let p = primitives();
    let pair = alias("Pair", &["a"], 3, Type::tuple(vec![local("a", 3), local("a", 3)]));
    let pair_int = Type::invoker(reference("Pair", ReferenceFlavour::Alias, pair), vec![p.int()]);
    assert!(compatible(&pair_int, &Type::tuple(vec![p.int(), p.int()])));
    assert!(!compatible(&pair_int, &Type::tuple(vec![p.int(), p.bool()])));
    let resolved = resolve(&pair_int).expect("resolves");
    assert_eq!(resolved.human_readable(), "(Int, Int)");
}

#[test]
fn wrong_number_of_alias_arguments_fails_to_resolve() {
    let p = primitives();
    let pair = alias("Pair", &["a"], 3, Type::tuple(vec![local("a", 3)]));
    let bad = Type::invoker(pair, vec![p.int(), p.bool()]);
    assert!(matches!(
        resolve(&bad),
        Err(TypeError::WrongNumberOfTypeArguments { expected: 1, got: 2, .. })
    ));
}

#[test]
fn resolve_unwinds_references_and_rejects_local_types() {
    let p = primitives();
    let point = alias("Point", &[], 1, record(&[("x", p.int())]));
    let wrapped = reference("Point", ReferenceFlavour::Alias, point);
    let resolved = resolve(&wrapped).expect("resolves");
    assert!(matches!(resolved.as_ref(), Type::Record(_)));
    assert!(matches!(
        resolve(&local("a", 1)),
        Err(TypeError::UnresolvedLocalType(name)) if name == "a"
    ));
}

#[test]
fn custom_application_exposes_arguments() {
    let p = primitives();
    let maybe = custom("Maybe", &["a"], &[("Just", vec![]), ("Nothing", vec![])]);
    let maybe_int = Type::invoker(reference("Maybe", ReferenceFlavour::Type, maybe), vec![p.int()]);
    let (found, arguments) = custom_application(&maybe_int).expect("custom");
    assert_eq!(found.name(), "Maybe");
    assert_eq!(arguments.len(), 1);
    assert!(custom_application(&p.int()).is_none());
}

#[test]
fn recursive_reference_resolves_through_weak_pointer() {
    let p = primitives();
    let list = Arc::new_cyclic(|weak| {
        Type::Custom(CustomType {
            name: "IntList".to_string(),
            fq_name: "Test.IntList".to_string(),
            declared_at: None,
            parameters: Vec::new(),
            context: context(9),
            variants: vec![Variant {
                name: "Cons".to_string(),
                name_range: None,
                parameters: vec![
                    p.int(),
                    Arc::new(Type::RecursiveReference(RecursiveReference {
                        name: "IntList".to_string(),
                        range: None,
                        target: weak.clone(),
                    })),
                ],
                index: 0,
            }],
        })
    });
    let Type::Custom(custom) = list.as_ref() else {
        panic!("expected custom");
    };
    let tail = &custom.variants[0].parameters[1];
    assert!(compatible(tail, &list));
    assert_eq!(resolve(tail).expect("resolves").name(), "IntList");
}

#[test]
fn human_readable_forms() {
    let p = primitives();
    assert_eq!(
        Type::function(vec![p.int(), p.int(), p.int()]).human_readable(),
        "Int -> Int -> Int"
    );
    assert_eq!(
        Type::function(vec![Type::function(vec![p.int(), p.bool()]), p.int()]).human_readable(),
        "(Int -> Bool) -> Int"
    );
    assert_eq!(record(&[("x", p.int())]).human_readable(), "{ x : Int }");
    assert_eq!(p.list_of(p.list_of(p.int())).human_readable(), "List (List Int)");
    assert_eq!(Type::any().human_readable(), "*");
}

#[test]
fn degenerate_alias_reads_like_its_target() {
    let shape = custom("Shape", &[], &[]);
    let same_name = alias("Shape", &[], 1, shape.clone());
    assert_eq!(same_name.human_readable(), shape.human_readable());
}

#[test]
fn static_scope_rejects_unknown_names_dynamic_scope_adds_them() {
    let mut fixed = LocalTypeScope::new_static(
        context(1),
        vec![LocalTypeDefinition {
            name: "a".to_string(),
            range: None,
        }],
    );
    assert!(fixed.lookup("a", None).is_ok());
    assert_eq!(
        fixed.lookup("b", None).err(),
        Some(TypeError::UnknownTypeParameter("b".to_string()))
    );

    let mut open = LocalTypeScope::new_dynamic(context(2));
    assert!(open.lookup("b", None).is_ok());
    open.fetch_or_create_reference("c", None);
    open.fetch_or_create_reference("b", None);
    assert_eq!(open.all_names(), vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn every_type_is_compatible_with_itself() {
    let p = primitives();
    let samples = vec![
        p.int(),
        record(&[("x", p.int())]),
        Type::tuple(vec![p.bool()]),
        Type::function(vec![p.int(), p.bool()]),
        custom("Shape", &[], &[]),
        p.list_of(p.int()),
        local("a", 1),
        Type::any(),
    ];
    for ty in &samples {
        assert!(compatible(ty, ty), "{} not compatible with itself", ty.human_readable());
        for other in &samples {
            assert_eq!(
                compatible(ty, other),
                compatible(other, ty),
                "asymmetric for {} and {}",
                ty.human_readable(),
                other.human_readable()
            );
        }
    }
}
