use std::fmt::{self, Display, Formatter};

use super::ast::*;

fn join<T: Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

impl Display for VariableIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Display for TypeIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Display for ModuleReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl Display for ScopedVariableIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{module}.{}", self.identifier),
            None => write!(f, "{}", self.identifier),
        }
    }
}

impl Display for ScopedTypeIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{module}.{}", self.identifier),
            None => write!(f, "{}", self.identifier),
        }
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Reference {
                name, arguments, ..
            } => {
                if arguments.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "({name} {})", join(arguments, " "))
                }
            }
            TypeExpr::Local(identifier) => write!(f, "{identifier}"),
            TypeExpr::Function { parts, .. } => write!(f, "({})", join(parts, " -> ")),
            TypeExpr::Tuple { items, .. } => write!(f, "({})", join(items, ", ")),
            TypeExpr::Record { fields, .. } => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{} : {}", field.name, field.type_expr))
                    .collect();
                write!(f, "{{ {} }}", fields.join(", "))
            }
            TypeExpr::Unmanaged { name, .. } => write!(f, "Unmanaged<{name}>"),
            TypeExpr::AnyMatching(_) => f.write_str("*"),
        }
    }
}

impl Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOperatorKind::PipeRight => "|>",
            BinaryOperatorKind::PipeLeft => "<|",
            BinaryOperatorKind::LogicalOr => "||",
            BinaryOperatorKind::LogicalAnd => "&&",
            BinaryOperatorKind::Equal => "==",
            BinaryOperatorKind::NotEqual => "!=",
            BinaryOperatorKind::Less => "<",
            BinaryOperatorKind::LessOrEqual => "<=",
            BinaryOperatorKind::Greater => ">",
            BinaryOperatorKind::GreaterOrEqual => ">=",
            BinaryOperatorKind::Cons => "::",
            BinaryOperatorKind::Append => "++",
            BinaryOperatorKind::BitwiseOr => "|",
            BinaryOperatorKind::BitwiseXor => "^",
            BinaryOperatorKind::BitwiseAnd => "&",
            BinaryOperatorKind::ShiftLeft => "<<",
            BinaryOperatorKind::ShiftRight => ">>",
            BinaryOperatorKind::Plus => "+",
            BinaryOperatorKind::Minus => "-",
            BinaryOperatorKind::Multiply => "*",
            BinaryOperatorKind::Divide => "/",
            BinaryOperatorKind::Remainder => "%",
        };
        f.write_str(text)
    }
}

impl Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOperatorKind::Negate => "-",
            UnaryOperatorKind::Not => "!",
            UnaryOperatorKind::BitwiseNot => "~",
        })
    }
}

impl Display for LetTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LetTarget::Single(identifier) => write!(f, "{identifier}"),
            LetTarget::Record { names, .. } => write!(f, "{{ {} }}", join(names, ", ")),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Integer { value, .. } => write!(f, "{value}"),
            Expression::Fixed { value, .. } => write!(f, "{}", Expression::fixed_as_f64(*value)),
            Expression::Bool { value, .. } => f.write_str(if *value { "True" } else { "False" }),
            Expression::Character { value, .. } => write!(f, "'{}'", value.escape_default()),
            Expression::String(token) => write!(f, "{:?}", token.text),
            Expression::StringInterpolation { parts, .. } => {
                f.write_str("(interpolate")?;
                for part in parts {
                    match part {
                        InterpolationPart::Text { text, .. } => write!(f, " {text:?}")?,
                        InterpolationPart::Expression(expression) => write!(f, " {expression}")?,
                    }
                }
                f.write_str(")")
            }
            Expression::ResourceName { name, .. } => write!(f, "@{name}"),
            Expression::TypeId { name, .. } => write!(f, "${name}"),
            Expression::List { items, .. } => write!(f, "[{}]", join(items, ", ")),
            Expression::Array { items, .. } => write!(f, "[|{}|]", join(items, ", ")),
            Expression::Tuple { items, .. } => write!(f, "({})", join(items, ", ")),
            Expression::Record(record) => {
                let fields: Vec<String> = record
                    .fields
                    .iter()
                    .map(|field| format!("{} = {}", field.name, field.expression))
                    .collect();
                match &record.template {
                    Some(template) => write!(f, "{{ {template} | {} }}", fields.join(", ")),
                    None => write!(f, "{{ {} }}", fields.join(", ")),
                }
            }
            Expression::Variable(variable) => write!(f, "{variable}"),
            Expression::RecordLookup { base, lookups, .. } => {
                write!(f, "{base}.{}", join(lookups, "."))
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => write!(f, "(call {function} {})", join(arguments, " ")),
            Expression::Constructor {
                name, arguments, ..
            } => {
                if arguments.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "({name} {})", join(arguments, " "))
                }
            }
            Expression::BinaryOperator {
                operator,
                left,
                right,
                ..
            } => write!(f, "({operator} {left} {right})"),
            Expression::UnaryOperator {
                operator, operand, ..
            } => write!(f, "({operator}{operand})"),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => write!(f, "(if {condition} then {consequence} else {alternative})"),
            Expression::Let {
                assignments, body, ..
            } => {
                let assignments: Vec<String> = assignments
                    .iter()
                    .map(|assignment| format!("{} = {}", assignment.target, assignment.expression))
                    .collect();
                write!(f, "(let {} in {body})", assignments.join("; "))
            }
            Expression::CaseCustomType {
                test,
                consequences,
                default,
                ..
            } => {
                write!(f, "(case {test} of")?;
                for consequence in consequences {
                    write!(f, " [{}", consequence.variant)?;
                    for parameter in &consequence.parameters {
                        write!(f, " {parameter}")?;
                    }
                    write!(f, " -> {}]", consequence.expression)?;
                }
                if let Some(default) = default {
                    write!(f, " [_ -> {}]", default.expression)?;
                }
                f.write_str(")")
            }
            Expression::CasePattern {
                test,
                consequences,
                default,
                ..
            } => {
                write!(f, "(case {test} of")?;
                for consequence in consequences {
                    write!(f, " [{} -> {}]", consequence.pattern, consequence.expression)?;
                }
                if let Some(default) = default {
                    write!(f, " [_ -> {}]", default.expression)?;
                }
                f.write_str(")")
            }
            Expression::Guard { items, default, .. } => {
                f.write_str("(guard")?;
                for item in items {
                    write!(f, " [{} -> {}]", item.condition, item.consequence)?;
                }
                if let Some(default) = default {
                    write!(f, " [_ -> {}]", default.expression)?;
                }
                f.write_str(")")
            }
            Expression::Lambda {
                parameters, body, ..
            } => write!(f, "(\\{} -> {body})", join(parameters, " ")),
            Expression::Cast {
                expression, target, ..
            } => write!(f, "({expression} as {target})"),
            Expression::Asm { text, .. } => write!(f, "(asm {text:?})"),
            Expression::ExternalFunction { name, arity, .. } => {
                write!(f, "(externalfn {name:?} {arity})")
            }
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Import(import) => {
                write!(f, "import {}", import.path)?;
                if let Some((_, alias)) = &import.alias {
                    write!(f, " as {alias}")?;
                }
                if let Some(exposing) = &import.exposing {
                    if exposing.everything.is_some() {
                        f.write_str(" exposing (..)")?;
                    } else {
                        let items: Vec<String> = exposing
                            .items
                            .iter()
                            .map(|item| match item {
                                ExposedItem::Variable(name) => name.name.clone(),
                                ExposedItem::Type {
                                    name,
                                    with_variants: true,
                                } => format!("{name}(..)"),
                                ExposedItem::Type { name, .. } => name.name.clone(),
                            })
                            .collect();
                        write!(f, " exposing ({})", items.join(", "))?;
                    }
                }
                Ok(())
            }
            Statement::Alias(alias) => {
                write!(f, "type alias {}", alias.name)?;
                for parameter in &alias.parameters {
                    write!(f, " {parameter}")?;
                }
                write!(f, " = {}", alias.definition)
            }
            Statement::CustomType(custom) => {
                write!(f, "type {}", custom.name)?;
                for parameter in &custom.parameters {
                    write!(f, " {parameter}")?;
                }
                let variants: Vec<String> = custom
                    .variants
                    .iter()
                    .map(|variant| {
                        if variant.parameters.is_empty() {
                            variant.name.name.clone()
                        } else {
                            format!("{} {}", variant.name, join(&variant.parameters, " "))
                        }
                    })
                    .collect();
                write!(f, " = {}", variants.join(" | "))
            }
            Statement::Annotation(annotation) => {
                write!(f, "{} : {}", annotation.name, annotation.type_expr)
            }
            Statement::Definition(definition) => {
                write!(f, "{}", definition.name)?;
                for parameter in &definition.parameters {
                    write!(f, " {parameter}")?;
                }
                write!(f, " = {}", definition.expression)
            }
            Statement::Constant(constant) => {
                write!(f, "{} = {}", constant.name, constant.expression)
            }
        }
    }
}

impl Display for SourceModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}
