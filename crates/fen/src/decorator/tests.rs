use std::sync::Arc;

use crate::decorated::{ArithmeticOperator, Expression, ExpressionKind, OperatorType, ReferenceTarget};
use crate::errors::{DecorateErrorKind, DecorateWarningKind, UnusedKind};
use crate::module::{DefinitionKind, StaticModules};
use crate::source::{DocumentUri, Position};
use crate::surface::parse_source;
use crate::types::{function_parts, resolve, Type};

use super::*;

fn decorate_with(
    src: &str,
    path: &[&str],
    resolver: &mut StaticModules,
    options: DecorateOptions,
) -> DecorateResult {
    let name = if path.is_empty() { "main".to_string() } else { path.join("/") };
    let document = DocumentUri::new(format!("file:///{name}.fen"));
    let parsed = parse_source(src, &document);
    assert!(
        parsed.diagnostics.is_empty(),
        "unexpected parse diagnostics: {:?}",
        parsed.diagnostics
    );
    decorate_module(
        &parsed.module,
        path.iter().map(|part| part.to_string()).collect(),
        document,
        resolver,
        options,
    )
}

fn decorate(src: &str) -> DecorateResult {
    decorate_with(src, &[], &mut StaticModules::new(), DecorateOptions::default())
}

fn error_kinds(result: &DecorateResult) -> Vec<DecorateErrorKind> {
    result.errors.iter().map(|error| error.kind.clone()).collect()
}

fn body<'a>(result: &'a DecorateResult, name: &str) -> &'a Expression {
    let definition = result.module.definitions.find(name).expect("definition");
    &definition.value.as_ref().expect("decorated body").expression
}

fn type_of(result: &DecorateResult, name: &str) -> String {
    result.module.definitions.find(name).expect("definition").ty.human_readable()
}

fn math_module() -> StaticModules {
    let math = decorate_with(
        "sqrt : Int -> Int\nsqrt x = x\n",
        &["Math"],
        &mut StaticModules::new(),
        DecorateOptions::default(),
    );
    assert!(!math.has_errors(), "{:?}", error_kinds(&math));
    let mut modules = StaticModules::new();
    modules.insert(Arc::new(math.module));
    modules
}

#[test]
fn empty_module_has_nothing() {
    let result = decorate("");
    assert!(result.module.definitions.is_empty());
    assert!(result.module.types.is_empty());
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn annotated_function_keeps_declared_type() {
    let result = decorate("add : Int -> Int -> Int\nadd a b = a + b\n");
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert!(result.warnings.is_empty());
    assert_eq!(result.module.definitions.len(), 1);
    let add = result.module.definitions.find("add").expect("add");
    let function = function_parts(&add.ty).expect("function type");
    assert_eq!(function.arity(), 2);
    assert_eq!(add.ty.human_readable(), "Int -> Int -> Int");
    assert_eq!(body(&result, "add").kind_name(), "BinaryOperator");
}

#[test]
fn case_over_custom_type_binds_variant_parameters() {
    let src = "data Shape = Circle Int | Square Int Int\n\
               area : Shape -> Int\n\
               area s = case s of\n    Circle r -> r\n    Square w h -> w\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));

    let shape = result.module.types.get("Shape").expect("Shape");
    let Type::Custom(custom) = shape.ty.as_ref() else {
        panic!("expected custom type");
    };
    let variants: Vec<(&str, usize)> = custom
        .variants
        .iter()
        .map(|variant| (variant.name.as_str(), variant.index))
        .collect();
    assert_eq!(variants, vec![("Circle", 0), ("Square", 1)]);

    let ExpressionKind::CaseCustomType {
        consequences,
        default,
        ..
    } = &body(&result, "area").kind
    else {
        panic!("expected case over custom type");
    };
    assert_eq!(consequences.len(), 2);
    assert!(default.is_none());

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].kind,
        DecorateWarningKind::Unused {
            kind: UnusedKind::CaseParameter,
            name: "h".to_string()
        }
    );
}

#[test]
fn definition_without_annotation_is_reported_at_its_name() {
    let result = decorate("add a b = a + b\n");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0].kind,
        DecorateErrorKind::MustHaveAnnotationBefore {
            definition_missing: false,
            ..
        }
    ));
    let add = result.module.definitions.find("add").expect("add");
    assert_eq!(result.errors[0].range(), add.identifier.range);
}

#[test]
fn annotation_without_definition_is_reported_at_the_annotation() {
    let result = decorate("f : Int -> Int\n");
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors[0].kind,
        DecorateErrorKind::MustHaveAnnotationBefore {
            definition_missing: true,
            ..
        }
    ));
    assert_eq!(result.errors[0].range().start.line, 0);
    assert_eq!(result.errors[0].range().start.column, 0);
}

#[test]
fn body_type_mismatch_is_reported_over_the_body() {
    let result = decorate("f : Int -> Int\nf a = True\n");
    assert_eq!(
        error_kinds(&result),
        vec![DecorateErrorKind::UnMatchingTypes {
            expected: "Int".to_string(),
            found: "Bool".to_string()
        }]
    );
    assert_eq!(result.errors[0].range(), body(&result, "f").range);
}

#[test]
fn record_constructor_with_missing_field() {
    let src = "type Point = { x : Int, y : Int }\norigin : Point\norigin = Point { x = 0 }\n";
    let result = decorate(src);
    assert_eq!(result.errors.len(), 1, "{:?}", error_kinds(&result));
    assert!(matches!(
        result.errors[0].kind,
        DecorateErrorKind::WrongNumberOfFieldsInConstructor {
            expected: 2,
            found: 1,
            ..
        }
    ));
    let constructor = body(&result, "origin");
    assert_eq!(constructor.kind_name(), "RecordConstructorFromRecord");
    assert_eq!(result.errors[0].range(), constructor.range);
}

#[test]
fn record_constructor_from_parameters() {
    let src = "type Point = { x : Int, y : Int }\norigin : Point\norigin = Point 1 True\n";
    let result = decorate(src);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        &result.errors[0].kind,
        DecorateErrorKind::WrongTypeForRecordConstructorField { field, .. } if field == "y"
    ));
    assert_eq!(body(&result, "origin").kind_name(), "RecordConstructorFromParameters");
}

#[test]
fn imported_function_is_called() {
    let mut modules = math_module();
    let src = "import Math exposing (sqrt)\nmagnitude : Int -> Int\nmagnitude x = sqrt x\n";
    let result = decorate_with(src, &[], &mut modules, DecorateOptions::default());
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.module.imports.len(), 1);

    let ExpressionKind::FunctionCall { function, .. } = &body(&result, "magnitude").kind else {
        panic!("expected function call");
    };
    let ExpressionKind::Reference(reference) = &function.kind else {
        panic!("expected reference");
    };
    assert!(matches!(
        reference.target,
        ReferenceTarget::Definition {
            import: Some(0),
            index: 0
        }
    ));
    assert_eq!(result.module.imported_definitions[0].references.len(), 1);
}

#[test]
fn unresolvable_import_is_reported_over_the_import() {
    let src = "import Math exposing (sqrt)\nmagnitude : Int -> Int\nmagnitude x = sqrt x\n";
    let result = decorate(src);
    let import_error = result
        .errors
        .iter()
        .find(|error| matches!(error.kind, DecorateErrorKind::CouldNotImportModule { .. }))
        .expect("import error");
    let range = import_error.range();
    assert_eq!(range.start.line, 0);
    assert_eq!(range.start.column, 0);
    assert_eq!(range.end.line, 0);
    assert_eq!(range.end.column, "import Math exposing (sqrt)".len() - 1);
}

#[test]
fn scoped_reference_through_import() {
    let mut modules = math_module();
    let src = "import Math\nroot : Int -> Int\nroot x = Math.sqrt x\n";
    let result = decorate_with(src, &[], &mut modules, DecorateOptions::default());
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert!(result.warnings.is_empty());
}

#[test]
fn unused_import_is_a_warning() {
    let mut modules = math_module();
    let result = decorate_with("import Math\nx = 1\n", &[], &mut modules, DecorateOptions::default());
    assert!(result.errors.is_empty());
    assert_eq!(
        result.warnings.iter().map(|warning| warning.kind.clone()).collect::<Vec<_>>(),
        vec![DecorateWarningKind::UnusedImport("Math".to_string())]
    );
}

#[test]
fn unused_exposed_definition_is_a_warning() {
    let mut modules = math_module();
    let result = decorate_with(
        "import Math exposing (sqrt)\nx = 1\n",
        &[],
        &mut modules,
        DecorateOptions::default(),
    );
    let kinds: Vec<DecorateWarningKind> = result.warnings.iter().map(|warning| warning.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            DecorateWarningKind::UnusedImport("Math".to_string()),
            DecorateWarningKind::Unused {
                kind: UnusedKind::ImportedDefinition,
                name: "sqrt".to_string()
            },
        ]
    );
}

#[test]
fn unused_definitions_only_when_enabled() {
    let src = "one : Int\none = 1\n";
    assert!(decorate(src).warnings.is_empty());
    let options = DecorateOptions {
        unused_warnings: true,
        unused_definitions: true,
    };
    let result = decorate_with(src, &[], &mut StaticModules::new(), options);
    assert_eq!(result.warnings.len(), 1);

    let silent = DecorateOptions {
        unused_warnings: false,
        unused_definitions: true,
    };
    let result = decorate_with("f : Int -> Int\nf unused = 1\n", &[], &mut StaticModules::new(), silent);
    assert!(result.warnings.is_empty());
}

#[test]
fn ignored_names_are_never_unused() {
    let result = decorate("f : Int -> Int\nf _ = 1\n");
    assert!(result.warnings.is_empty());
}

#[test]
fn constants_take_their_body_type() {
    let result = decorate("answer = 42\ndouble = answer + answer\nname = \"fen\"\n");
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert_eq!(type_of(&result, "answer"), "Int");
    assert_eq!(type_of(&result, "double"), "Int");
    assert_eq!(type_of(&result, "name"), "String");
    let answer = result.module.definitions.find("answer").expect("answer");
    assert_eq!(answer.kind, DefinitionKind::Constant);
    assert_eq!(answer.references.len(), 2);
}

#[test]
fn constant_used_before_its_declaration() {
    let result = decorate("double = answer * 2\nanswer = 21\n");
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert_eq!(type_of(&result, "double"), "Int");
}

#[test]
fn cyclic_constants_are_rejected() {
    let result = decorate("a = b\nb = a\n");
    assert!(error_kinds(&result)
        .iter()
        .any(|kind| matches!(kind, DecorateErrorKind::CyclicConstant(_))));
}

#[test]
fn generic_variant_constructor_builds_invoker() {
    let src = "type Maybe a\n    = Just a\n    | Nothing\n\
               wrap : Int -> Maybe Int\nwrap x = Just x\n\
               none : Maybe Int\nnone = Nothing\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    let just = body(&result, "wrap");
    assert_eq!(just.kind_name(), "CustomTypeVariantConstructor");
    assert_eq!(just.ty.human_readable(), "Maybe Int");
    assert_eq!(body(&result, "none").ty.human_readable(), "Maybe Int");
}

#[test]
fn variant_constructor_arity_is_strict() {
    let src = "data Shape = Circle Int | Square Int Int\ns : Shape\ns = Square 1\n";
    let result = decorate(src);
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::WrongNumberOfVariantArguments {
            expected: 2,
            found: 1,
            ..
        }]
    ));
}

#[test]
fn generic_function_result_is_substituted_at_call_site() {
    let src = "identity : a -> a\nidentity x = x\ncall : Int -> Int\ncall n = identity n\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert_eq!(body(&result, "call").ty.human_readable(), "Int");
}

#[test]
fn arity_short_call_is_incomplete() {
    let src = "f : Int -> Int -> Int\nf a b = a + b\ng : Int -> Int\ng = f 1\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    let incomplete = body(&result, "g");
    assert_eq!(incomplete.kind_name(), "IncompleteFunctionCall");
    assert_eq!(incomplete.ty.human_readable(), "Int -> Int");
}

#[test]
fn partial_application_passed_as_argument_is_a_curry_function() {
    let src = "add : Int -> Int -> Int\nadd a b = a + b\n\
               apply : (Int -> Int) -> Int -> Int\napply f x = f x\n\
               seven : Int\nseven = apply (add 1) 6\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    let ExpressionKind::FunctionCall { arguments, .. } = &body(&result, "seven").kind else {
        panic!("expected call");
    };
    assert_eq!(arguments[0].kind_name(), "CurryFunction");
    assert_eq!(arguments[0].ty.human_readable(), "Int -> Int");
}

#[test]
fn too_many_arguments() {
    let src = "inc : Int -> Int\ninc a = a + 1\nx : Int\nx = inc 1 2\n";
    let result = decorate(src);
    assert!(error_kinds(&result).iter().any(|kind| matches!(
        kind,
        DecorateErrorKind::ExtraFunctionArguments {
            expected: 1,
            found: 2
        }
    )));
}

#[test]
fn argument_mismatch_reports_one_based_index() {
    let src = "add : Int -> Int -> Int\nadd a b = a + b\nx : Int\nx = add 1 True\n";
    let result = decorate(src);
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::FunctionArgumentTypeMismatch { index: 2, .. }]
    ));
}

#[test]
fn calling_a_non_function_is_an_error() {
    let result = decorate("one : Int\none = 1\nx : Int\nx = one 2\n");
    assert!(error_kinds(&result)
        .iter()
        .any(|kind| matches!(kind, DecorateErrorKind::ExpectedFunctionType(_))));
    assert!(body(&result, "x").is_poisoned());
}

#[test]
fn tail_self_call_is_a_recur_call() {
    let src = "count : Int -> Int\ncount n = if n == 0 then 0 else count (n - 1)\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    let ExpressionKind::If { alternative, .. } = &body(&result, "count").kind else {
        panic!("expected if");
    };
    assert_eq!(alternative.kind_name(), "RecurCall");
}

#[test]
fn pipes_rewrite_to_calls() {
    let src = "add : Int -> Int -> Int\nadd a b = a + b\n\
               right : Int\nright = 1 |> add 2\n\
               left : Int\nleft = add 2 <| 1\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    for name in ["right", "left"] {
        let ExpressionKind::Pipe { call, .. } = &body(&result, name).kind else {
            panic!("expected pipe in {name}");
        };
        let ExpressionKind::FunctionCall { arguments, .. } = &call.kind else {
            panic!("expected call in {name}");
        };
        assert_eq!(arguments.len(), 2);
        assert!(matches!(arguments[0].kind, ExpressionKind::Integer(2)));
        assert!(matches!(arguments[1].kind, ExpressionKind::Integer(1)));
        assert_eq!(call.ty.human_readable(), "Int");
    }
}

#[test]
fn lambda_takes_parameter_types_from_context() {
    let src = "apply : (Int -> Int) -> Int -> Int\napply f x = f x\n\
               y : Int\ny = apply (\\v -> v + 1) 2\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
}

#[test]
fn lambda_without_context_is_an_error() {
    let result = decorate("f = \\x -> x\n");
    assert!(error_kinds(&result).contains(&DecorateErrorKind::LambdaNeedsContext));
}

#[test]
fn fixed_multiplication_uses_fixed_operator() {
    let result = decorate("scale : Fixed -> Fixed\nscale x = x * 1.5\n");
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    let ExpressionKind::BinaryOperator { operator, .. } = &body(&result, "scale").kind else {
        panic!("expected operator");
    };
    assert_eq!(*operator, OperatorType::Arithmetic(ArithmeticOperator::FixedMultiply));
}

#[test]
fn operator_operands_must_match() {
    let result = decorate("x : Int\nx = 1 + True\n");
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::UnMatchingBinaryOperatorTypes { .. }]
    ));
}

#[test]
fn comparison_produces_bool_and_cons_builds_list() {
    let result = decorate("b = 1 < 2\nl = 1 :: [2, 3]\n");
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert_eq!(type_of(&result, "b"), "Bool");
    assert_eq!(type_of(&result, "l"), "List Int");
}

#[test]
fn list_items_must_agree() {
    let result = decorate("l = [1, True]\n");
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::EveryItemInTheListMustHaveTheSameType { .. }]
    ));
    let single = decorate("l = [1]\n");
    assert_eq!(type_of(&single, "l"), "List Int");
}

#[test]
fn if_rules() {
    let result = decorate("x : Int\nx = if 1 then 2 else True\n");
    let kinds = error_kinds(&result);
    assert!(kinds
        .iter()
        .any(|kind| matches!(kind, DecorateErrorKind::IfTestMustHaveBooleanType(_))));
    assert!(kinds.iter().any(|kind| matches!(
        kind,
        DecorateErrorKind::IfConsequenceAndAlternativeMustHaveSameType { .. }
    )));
}

#[test]
fn let_bindings_and_destructuring() {
    let src = "f : Int -> Int\nf x =\n    let\n        a = x\n        { y } = { y = 2 }\n    in\n    a + y\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn unused_let_variable() {
    let src = "f : Int -> Int\nf x =\n    let\n        a = x\n        b = 2\n    in\n    a\n";
    let result = decorate(src);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].kind,
        DecorateWarningKind::Unused {
            kind: UnusedKind::LetVariable,
            name: "b".to_string()
        }
    );
}

#[test]
fn parameters_win_over_let_bindings() {
    let result = decorate("f : Int -> Int\nf a = let a = True in a\n");
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    let ExpressionKind::Let { body: inner, .. } = &body(&result, "f").kind else {
        panic!("expected let");
    };
    let ExpressionKind::Reference(reference) = &inner.kind else {
        panic!("expected reference");
    };
    assert!(matches!(reference.kind, crate::decorated::ReferenceKind::FunctionParameter));
    assert_eq!(inner.ty.human_readable(), "Int");
    assert_eq!(
        result.warnings.iter().map(|warning| warning.kind.clone()).collect::<Vec<_>>(),
        vec![DecorateWarningKind::Unused {
            kind: UnusedKind::LetVariable,
            name: "a".to_string()
        }]
    );
}

#[test]
fn record_lookups_and_missing_fields() {
    let src = "type Point = { x : Int, y : Int }\ngetX : Point -> Int\ngetX p = p.x\n\
               getZ : Point -> Int\ngetZ p = p.z\n";
    let result = decorate(src);
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::CouldNotFindFieldInLookup { field, .. }] if field == "z"
    ));
    assert_eq!(body(&result, "getX").ty.human_readable(), "Int");
}

#[test]
fn record_update_checks_fields() {
    let src = "type Point = { x : Int, y : Int }\nmove : Point -> Point\nmove p = { p | x = 1, w = 2 }\n";
    let result = decorate(src);
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::NewRecordLiteralFieldNotInType { field, .. }] if field == "w"
    ));
}

#[test]
fn record_literal_field_missing_from_expected_type() {
    let src = "type Point = { x : Int, y : Int }\norigin : Point\norigin = { x = 0, z = 1 }\n";
    let result = decorate(src);
    assert_eq!(
        error_kinds(&result),
        vec![DecorateErrorKind::NewRecordLiteralFieldNotInType {
            field: "z".to_string(),
            ty: "Point".to_string()
        }]
    );
    assert_eq!(result.errors[0].range().start, Position::new(2, 18));
    assert_eq!(result.errors[0].range().end, Position::new(2, 18));
}

#[test]
fn duplicate_record_field() {
    let result = decorate("r = { a = 1, a = 2 }\n");
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::YouCanOnlySetFieldInRecordOnce(name)] if name == "a"
    ));
}

#[test]
fn case_rules() {
    let src = "data Shape = Circle Int | Square Int Int\n\
               area : Shape -> Int\n\
               area s = case s of\n    Circle r -> r\n";
    let result = decorate(src);
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::UnhandledCustomTypeVariants { missing }] if missing == &vec!["Square".to_string()]
    ));

    let src = "data Shape = Circle Int | Square Int Int\n\
               area : Shape -> Int\n\
               area s = case s of\n    Circle r -> r\n    Circle q -> q\n    Triangle -> 0\n    _ -> 1\n";
    let kinds = error_kinds(&decorate(src));
    assert!(kinds
        .iter()
        .any(|kind| matches!(kind, DecorateErrorKind::AlreadyHandledCustomTypeVariant(_))));
    assert!(kinds
        .iter()
        .any(|kind| matches!(kind, DecorateErrorKind::UnknownVariantInCase { .. })));

    let kinds = error_kinds(&decorate("f : Int -> Int\nf n = case n of\n    Circle r -> r\n"));
    assert!(kinds
        .iter()
        .any(|kind| matches!(kind, DecorateErrorKind::CaseTestMustBeCustomType(_))));
}

#[test]
fn case_without_arms_points_at_the_keyword() {
    let src = "data Shape = Circle Int | Square Int Int\nf : Shape -> Int\nf s = case s of\n";
    let result = decorate(src);
    assert!(error_kinds(&result).contains(&DecorateErrorKind::CaseMustHaveConsequences));
    let error = result
        .errors
        .iter()
        .find(|error| error.kind == DecorateErrorKind::CaseMustHaveConsequences)
        .expect("case error");
    assert_eq!(error.range().start, Position::new(2, 6));
    assert_eq!(error.range().end, Position::new(2, 9));
}

#[test]
fn literal_case_and_guards() {
    let src = "f : Int -> Int\nf n =\n    case n of\n        0 -> 1\n        _ -> 2\n\
               abs : Int -> Int\nabs x =\n    | x < 0 -> -x\n    | _ -> x\n";
    let result = decorate(src);
    assert!(result.errors.is_empty(), "{:?}", error_kinds(&result));
    assert_eq!(body(&result, "f").kind_name(), "CasePattern");
    assert_eq!(body(&result, "abs").kind_name(), "Guard");

    let result = decorate("abs : Int -> Int\nabs x =\n    | x -> 1\n    | _ -> 2\n");
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::GuardConditionMustBeBoolean(_)]
    ));
}

#[test]
fn cast_requires_alias() {
    let src = "type alias Meters = Int\nm : Meters\nm = 3 as Meters\nbad = 3 as Int\n";
    let result = decorate(src);
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::CastTargetMustBeAlias(name)] if name == "Int"
    ));
    assert_eq!(body(&result, "m").kind_name(), "CastOperator");
}

#[test]
fn unknown_names_poison_their_subtree() {
    let result = decorate("x : Int\nx = missing + 1\n");
    assert!(matches!(
        error_kinds(&result).as_slice(),
        [DecorateErrorKind::UnknownVariable(name)] if name == "missing"
    ));
    let ExpressionKind::BinaryOperator { left, .. } = &body(&result, "x").kind else {
        panic!("expected operator");
    };
    assert!(left.is_poisoned());
    assert!(resolve(&left.ty).expect("resolves").is_any_matching());
}

#[test]
fn references_are_recorded_on_bindings() {
    let result = decorate("f : Int -> Int\nf x = x + x\n");
    let binding = result.module.bindings.first().expect("binding");
    assert_eq!(binding.identifier.name, "x");
    assert_eq!(binding.references.len(), 2);
}

#[test]
fn decoration_is_deterministic() {
    let src = "data Shape = Circle Int | Square Int Int\narea : Shape -> Int\narea s = case s of\n    Circle r -> r\n    Square w h -> w\n";
    let first = decorate(src);
    let second = decorate(src);
    assert_eq!(format!("{:?}", first.module.statements), format!("{:?}", second.module.statements));
    assert_eq!(error_kinds(&first), error_kinds(&second));
}
