use crate::diagnostics::Diagnostic;
use crate::source::{DocumentUri, HasRange, Position};
use crate::surface::{
    parse_source, BinaryOperatorKind, Expression, ExposedItem, LetTarget, SourceModule, Statement,
    TypeExpr,
};

fn parse_ok(src: &str) -> SourceModule {
    let result = parse_source(src, &DocumentUri::default());
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        diag_codes(&result.diagnostics)
    );
    result.module
}

fn diag_codes(diags: &[Diagnostic]) -> Vec<String> {
    let mut codes: Vec<String> = diags.iter().map(|d| d.code.clone()).collect();
    codes.sort();
    codes
}

fn body_of(module: &SourceModule, name: &str) -> Expression {
    module
        .statements
        .iter()
        .find_map(|statement| match statement {
            Statement::Definition(definition) if definition.name.name == name => {
                Some(definition.expression.clone())
            }
            Statement::Constant(constant) if constant.name.name == name => {
                Some(constant.expression.clone())
            }
            _ => None,
        })
        .expect("definition")
}

#[test]
fn parses_annotation_and_definition() {
    let module = parse_ok("add : Int -> Int -> Int\nadd a b = a + b\n");
    assert_eq!(module.statements.len(), 2);
    let Statement::Annotation(annotation) = &module.statements[0] else {
        panic!("expected annotation");
    };
    let TypeExpr::Function { parts, .. } = &annotation.type_expr else {
        panic!("expected function type");
    };
    assert_eq!(parts.len(), 3);
    let Statement::Definition(definition) = &module.statements[1] else {
        panic!("expected definition");
    };
    assert_eq!(definition.parameters.len(), 2);
    assert_eq!(definition.expression.to_string(), "(+ a b)");
}

#[test]
fn unannotated_value_becomes_constant() {
    let module = parse_ok("answer = 42\nf : Int\nf = 1\n");
    assert!(matches!(module.statements[0], Statement::Constant(_)));
    assert!(matches!(module.statements[2], Statement::Definition(_)));
}

#[test]
fn parses_custom_types_with_both_introducers() {
    let module = parse_ok("data Shape = Circle Int | Square Int Int\ntype Maybe a\n    = Just a\n    | Nothing\n");
    let Statement::CustomType(shape) = &module.statements[0] else {
        panic!("expected custom type");
    };
    assert_eq!(shape.variants.len(), 2);
    assert_eq!(shape.variants[1].parameters.len(), 2);
    let Statement::CustomType(maybe) = &module.statements[1] else {
        panic!("expected custom type");
    };
    assert_eq!(maybe.parameters[0].name, "a");
    assert_eq!(maybe.variants[1].name.name, "Nothing");
}

#[test]
fn parses_record_alias_and_type_alias() {
    let module = parse_ok("type Point = { x : Int, y : Int }\ntype alias Pair a = (a, a)\n");
    let Statement::Alias(point) = &module.statements[0] else {
        panic!("expected alias");
    };
    assert!(point.alias_keyword.is_none());
    assert!(matches!(point.definition, TypeExpr::Record { ref fields, .. } if fields.len() == 2));
    let Statement::Alias(pair) = &module.statements[1] else {
        panic!("expected alias");
    };
    assert!(pair.alias_keyword.is_some());
    assert!(matches!(pair.definition, TypeExpr::Tuple { .. }));
}

#[test]
fn parses_imports_with_alias_and_exposing() {
    let module = parse_ok("import Data.Math as M exposing (sqrt, Shape(..))\nimport Text exposing (..)\n");
    let Statement::Import(import) = &module.statements[0] else {
        panic!("expected import");
    };
    assert_eq!(import.path.dotted(), "Data.Math");
    assert_eq!(import.alias.as_ref().map(|(_, name)| name.name.as_str()), Some("M"));
    let exposing = import.exposing.as_ref().expect("exposing");
    assert!(matches!(&exposing.items[0], ExposedItem::Variable(name) if name.name == "sqrt"));
    assert!(matches!(
        &exposing.items[1],
        ExposedItem::Type { with_variants: true, .. }
    ));
    let Statement::Import(text) = &module.statements[1] else {
        panic!("expected import");
    };
    assert!(text.exposing.as_ref().is_some_and(|e| e.everything.is_some()));
}

#[test]
fn parses_case_arms_by_layout() {
    let src = "area : Shape -> Int\narea s = case s of\n    Circle r -> r\n    Square w h -> w\n";
    let module = parse_ok(src);
    let Expression::CaseCustomType {
        consequences,
        default,
        ..
    } = body_of(&module, "area")
    else {
        panic!("expected case");
    };
    assert_eq!(consequences.len(), 2);
    assert!(default.is_none());
    assert_eq!(consequences[1].parameters.len(), 2);
}

#[test]
fn parses_literal_case_with_default() {
    let src = "f : Int -> Int\nf n =\n    case n of\n        0 -> 1\n        -1 -> 2\n        _ -> 3\n";
    let module = parse_ok(src);
    let Expression::CasePattern {
        consequences,
        default,
        ..
    } = body_of(&module, "f")
    else {
        panic!("expected pattern case");
    };
    assert_eq!(consequences.len(), 2);
    assert!(matches!(consequences[1].pattern, Expression::Integer { value: -1, .. }));
    assert!(default.is_some());
}

#[test]
fn parses_guards_let_and_lambda() {
    let src = "abs : Int -> Int\nabs x =\n    | x < 0 -> -x\n    | _ -> x\n\
               g : Int -> Int\ng x =\n    let\n        a = x\n        { b } = r\n    in\n    a + b\n\
               h = \\a b -> a\n";
    let module = parse_ok(src);
    let Expression::Guard { items, default, .. } = body_of(&module, "abs") else {
        panic!("expected guard");
    };
    assert_eq!(items.len(), 1);
    assert!(default.is_some());

    let Expression::Let { assignments, .. } = body_of(&module, "g") else {
        panic!("expected let");
    };
    assert_eq!(assignments.len(), 2);
    assert!(matches!(assignments[1].target, LetTarget::Record { .. }));

    let Expression::Lambda { parameters, .. } = body_of(&module, "h") else {
        panic!("expected lambda");
    };
    assert_eq!(parameters.len(), 2);
}

#[test]
fn operator_precedence_and_pipes() {
    let module = parse_ok("x = a |> f 1 2 + 3 * 4\n");
    let body = body_of(&module, "x");
    assert_eq!(body.to_string(), "(|> a (+ (call f 1 2) (* 3 4)))");
    let Expression::BinaryOperator { operator, .. } = body else {
        panic!("expected pipe");
    };
    assert_eq!(operator, BinaryOperatorKind::PipeRight);
}

#[test]
fn parses_constructors_records_and_lookups() {
    let module = parse_ok("origin = Point { x = 0, y = 0 }\nmoved = { p | x = 1 }\nd = p.pos.x\ns = Math.sqrt 4\n");
    let Expression::Constructor { name, arguments, .. } = body_of(&module, "origin") else {
        panic!("expected constructor");
    };
    assert_eq!(name.identifier.name, "Point");
    let Expression::Record(record) = &arguments[0] else {
        panic!("expected record literal");
    };
    assert_eq!(record.fields.len(), 2);

    let Expression::Record(update) = body_of(&module, "moved") else {
        panic!("expected record update");
    };
    assert!(update.template.is_some());

    let Expression::RecordLookup { lookups, .. } = body_of(&module, "d") else {
        panic!("expected lookup");
    };
    assert_eq!(lookups.len(), 2);

    let Expression::Call { function, .. } = body_of(&module, "s") else {
        panic!("expected call");
    };
    let Expression::Variable(variable) = *function else {
        panic!("expected scoped variable");
    };
    assert_eq!(variable.module.map(|m| m.dotted()), Some("Math".to_string()));
}

#[test]
fn record_literal_keeps_parse_order_and_sorted_view() {
    let module = parse_ok("r = { zeta = 1, alpha = 2 }\n");
    let Expression::Record(record) = body_of(&module, "r") else {
        panic!("expected record");
    };
    assert_eq!(record.fields[0].name.name, "zeta");
    let sorted: Vec<&str> = record
        .sorted_fields()
        .map(|field| field.name.name.as_str())
        .collect();
    assert_eq!(sorted, vec!["alpha", "zeta"]);
}

#[test]
fn parses_interpolated_strings_with_absolute_ranges() {
    let module = parse_ok("greet name = \"hi ${name}!\"\n");
    let Expression::StringInterpolation { parts, .. } = body_of(&module, "greet") else {
        panic!("expected interpolation");
    };
    let inner = parts
        .iter()
        .find_map(|part| match part {
            crate::surface::InterpolationPart::Expression(expression) => Some(expression),
            _ => None,
        })
        .expect("expression part");
    assert_eq!(inner.range().start, Position::new(0, 19));
}

#[test]
fn parses_cast_external_and_asm() {
    let module = parse_ok("a = b as Meters\nsqrt = __externalfn \"sqrt\" 1\nraw = __asm { nop }\n");
    assert!(matches!(body_of(&module, "a"), Expression::Cast { .. }));
    assert!(matches!(
        body_of(&module, "sqrt"),
        Expression::ExternalFunction { arity: 1, .. }
    ));
    assert!(matches!(body_of(&module, "raw"), Expression::Asm { .. }));
}

#[test]
fn keeps_comments_out_of_statements() {
    let module = parse_ok("-- leading\nx = 1 {- trailing -}\n");
    assert_eq!(module.statements.len(), 1);
    assert_eq!(module.comments.len(), 2);
}

#[test]
fn recovers_at_next_statement_after_error() {
    let result = parse_source("x = )\ny = 2\n", &DocumentUri::default());
    assert!(diag_codes(&result.diagnostics).contains(&"E2002".to_string()));
    assert_eq!(result.module.statements.len(), 1);
    assert!(matches!(&result.module.statements[0], Statement::Constant(c) if c.name.name == "y"));
}

#[test]
fn indented_statement_is_rejected() {
    let result = parse_source("  x = 1\n", &DocumentUri::default());
    assert_eq!(diag_codes(&result.diagnostics), vec!["E2001".to_string()]);
}
