use std::fmt;

use super::Type;

pub(super) fn human_readable(ty: &Type) -> String {
    match ty {
        Type::Primitive(primitive) => primitive.kind.name().to_string(),
        Type::Record(record) => {
            if record.fields.is_empty() {
                return "{}".to_string();
            }
            let fields: Vec<String> = record
                .fields
                .iter()
                .map(|field| format!("{} : {}", field.name, human_readable(&field.ty)))
                .collect();
            format!("{{ {} }}", fields.join(", "))
        }
        Type::Tuple(tuple) => {
            let items: Vec<String> = tuple.items.iter().map(|item| human_readable(item)).collect();
            format!("({})", items.join(", "))
        }
        Type::Custom(custom) => custom.name.clone(),
        Type::Function(function) => function
            .parts
            .iter()
            .map(|part| {
                let text = human_readable(part);
                if is_function(part) {
                    format!("({text})")
                } else {
                    text
                }
            })
            .collect::<Vec<_>>()
            .join(" -> "),
        Type::Reference(reference) => match &reference.module {
            Some(module) => format!("{}.{}", module.dotted(), reference.identifier.name),
            None => reference.identifier.name.clone(),
        },
        Type::RecursiveReference(reference) => reference.name.clone(),
        Type::CustomVariant(variant) => human_readable(&variant.custom),
        Type::Alias(alias) => alias.name.clone(),
        Type::LocalType(local) => local.name.clone(),
        Type::LocalTypeContext(context) => human_readable(&context.next),
        Type::Invoker(invoker) => {
            let mut text = human_readable(&invoker.generator);
            for param in &invoker.params {
                let param_text = human_readable(param);
                if needs_parens_as_argument(param) {
                    text.push_str(&format!(" ({param_text})"));
                } else {
                    text.push(' ');
                    text.push_str(&param_text);
                }
            }
            text
        }
        Type::Unmanaged(unmanaged) => format!("Unmanaged<{}>", unmanaged.name),
        Type::AnyMatching(_) => "*".to_string(),
    }
}

fn is_function(ty: &Type) -> bool {
    match ty {
        Type::Function(_) => true,
        Type::LocalTypeContext(context) => is_function(&context.next),
        _ => false,
    }
}

fn needs_parens_as_argument(ty: &Type) -> bool {
    match ty {
        Type::Function(_) => true,
        Type::Invoker(invoker) => !invoker.params.is_empty(),
        Type::LocalTypeContext(context) => needs_parens_as_argument(&context.next),
        _ => false,
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&human_readable(self))
    }
}
