use std::collections::HashSet;
use std::sync::{Arc, Weak};

use crate::decorated::{
    DecoratedAlias, DecoratedAnnotation, DecoratedCustomType, DecoratedImport, DecoratedStatement,
    DecoratedVariant,
};
use crate::errors::DecorateErrorKind;
use crate::module::{
    DefinitionKind, ImportedDefinition, ImportedType, Module, ModuleDefinition, ModuleTypeKind,
};
use crate::source::Range;
use crate::surface::{
    AliasStatement, Annotation, ConstantDefinition, CustomTypeStatement, Definition, ExposedItem,
    ImportStatement, Statement, TypeExpr, VariableIdentifier,
};
use crate::type_lookup::{TypeCreateAndLookup, TypeLookup};
use crate::types::{
    function_parts, type_arity, AnyMatchingType, CustomType, FunctionType, LocalContextId,
    LocalTypeDefinition, LocalTypeNameOnlyContext, LocalTypeScope, RecordType, RecursiveReference,
    TupleType, Ty, Type, UnmanagedType, Variant,
};

use super::{BodyState, Decorator, PendingBody};

/// Annotation read but not yet paired with its definition.
struct PendingAnnotation {
    name: VariableIdentifier,
    ty: Ty,
    context: LocalContextId,
    statement: usize,
    range: Range,
}

/// The custom type being built, for self references in its variants.
struct RecursiveTarget<'a> {
    name: &'a str,
    arity: usize,
    weak: &'a Weak<Type>,
}

impl<'s, 'r> Decorator<'s, 'r> {
    pub(super) fn declare(&mut self, statements: &'s [Statement]) {
        let mut pending: Option<PendingAnnotation> = None;
        let mut annotated: HashSet<String> = HashSet::new();
        for statement in statements {
            match statement {
                Statement::Import(import) => {
                    self.flush_annotation(pending.take());
                    self.declare_import(import);
                }
                Statement::Alias(alias) => {
                    self.flush_annotation(pending.take());
                    self.declare_alias(alias);
                }
                Statement::CustomType(custom) => {
                    self.flush_annotation(pending.take());
                    self.declare_custom_type(custom);
                }
                Statement::Annotation(annotation) => {
                    self.flush_annotation(pending.take());
                    if !annotated.insert(annotation.name.name.clone()) {
                        self.error(
                            DecorateErrorKind::AlreadyDeclared(annotation.name.name.clone()),
                            annotation.name.range,
                        );
                    }
                    pending = Some(self.declare_annotation(annotation));
                }
                Statement::Definition(definition) => {
                    self.declare_definition(definition, pending.take());
                }
                Statement::Constant(constant) => {
                    self.flush_annotation(pending.take());
                    self.declare_constant(constant);
                }
            }
        }
        self.flush_annotation(pending);
    }

    fn flush_annotation(&mut self, pending: Option<PendingAnnotation>) {
        if let Some(annotation) = pending {
            self.error(
                DecorateErrorKind::MustHaveAnnotationBefore {
                    name: annotation.name.name,
                    definition_missing: true,
                },
                annotation.range,
            );
        }
    }

    fn declare_import(&mut self, import: &ImportStatement) {
        let path = import.path.path();
        let import_index = match self.resolver.resolve_module(&path, import.range) {
            Ok(module) => Some(self.add_import(import, module)),
            Err(error) => {
                self.error(
                    DecorateErrorKind::CouldNotImportModule {
                        path: import.path.dotted(),
                        reason: error.to_string(),
                    },
                    import.range,
                );
                None
            }
        };
        self.module.statements.push(DecoratedStatement::Import(DecoratedImport {
            keyword: import.keyword,
            path: import.path.clone(),
            alias: import.alias.clone(),
            exposing: import.exposing.clone(),
            import_index,
            range: import.range,
        }));
    }

    fn add_import(&mut self, import: &ImportStatement, module: Arc<Module>) -> usize {
        let alias = import.alias.as_ref().map(|(_, name)| name.name.clone());
        let import_index =
            self.module
                .import_module(import.path.path(), alias, module.clone(), import.path.range);
        let everything = import
            .exposing
            .as_ref()
            .is_some_and(|exposing| exposing.everything.is_some());
        let items: &[ExposedItem] = import
            .exposing
            .as_ref()
            .map(|exposing| exposing.items.as_slice())
            .unwrap_or(&[]);

        for (name, entry) in &module.exposed_types {
            let unqualified = everything
                || items.iter().any(|item| match item {
                    ExposedItem::Type {
                        name: exposed,
                        with_variants,
                    } => {
                        exposed.name == *name
                            || (*with_variants
                                && entry.kind == ModuleTypeKind::Variant
                                && variant_owner(&entry.ty).as_deref() == Some(exposed.name.as_str()))
                    }
                    ExposedItem::Variable(_) => false,
                });
            self.add_imported_type(ImportedType {
                import_index,
                name: name.clone(),
                ty: entry.ty.clone(),
                kind: entry.kind,
                exposed_unqualified: unqualified,
            });
        }

        if everything {
            for (name, definition_index) in &module.exposed_definitions {
                self.add_imported_definition(import_index, *definition_index, name, None);
            }
        }
        for item in items {
            match item {
                ExposedItem::Variable(identifier) => {
                    match module.exposed_definitions.get(&identifier.name) {
                        Some(definition_index) => self.add_imported_definition(
                            import_index,
                            *definition_index,
                            &identifier.name,
                            Some(identifier.range),
                        ),
                        None => self.error(
                            DecorateErrorKind::NotExposed {
                                module: import.path.dotted(),
                                name: identifier.name.clone(),
                            },
                            identifier.range,
                        ),
                    }
                }
                ExposedItem::Type { name, .. } => {
                    if !module.exposed_types.contains_key(&name.name) {
                        self.error(
                            DecorateErrorKind::NotExposed {
                                module: import.path.dotted(),
                                name: name.name.clone(),
                            },
                            name.range,
                        );
                    }
                }
            }
        }
        import_index
    }

    fn add_imported_type(&mut self, imported: ImportedType) {
        let existing = self
            .module
            .imported_types
            .iter_mut()
            .find(|entry| entry.import_index == imported.import_index && entry.name == imported.name);
        match existing {
            Some(entry) => entry.exposed_unqualified |= imported.exposed_unqualified,
            None => self.module.imported_types.push(imported),
        }
    }

    fn add_imported_definition(
        &mut self,
        import_index: usize,
        definition_index: usize,
        name: &str,
        exposing_range: Option<Range>,
    ) {
        let existing = self
            .module
            .imported_definitions
            .iter_mut()
            .find(|entry| entry.import_index == import_index && entry.name == name);
        match existing {
            Some(entry) => {
                entry.exposed_unqualified = true;
                if exposing_range.is_some() {
                    entry.exposing_range = exposing_range;
                }
            }
            None => self.module.imported_definitions.push(ImportedDefinition {
                import_index,
                definition_index,
                name: name.to_string(),
                exposed_unqualified: true,
                exposing_range,
                references: Vec::new(),
            }),
        }
    }

    fn declare_alias(&mut self, alias: &AliasStatement) {
        let context = self.new_context();
        let parameters = type_parameters(&alias.parameters);
        let mut scope = LocalTypeScope::new_static(context.clone(), parameters.clone());
        let definition = self.build_type(&alias.definition, &mut scope, None);
        let ty = match self
            .module
            .add_type_alias(&alias.name, parameters.clone(), context, definition.clone())
        {
            Ok(ty) => ty,
            Err(kind) => {
                self.error(kind, alias.name.range);
                definition.clone()
            }
        };
        self.module.statements.push(DecoratedStatement::Alias(DecoratedAlias {
            type_keyword: alias.type_keyword,
            alias_keyword: alias.alias_keyword,
            name: alias.name.clone(),
            parameters,
            definition,
            ty,
            range: alias.range,
        }));
    }

    fn declare_custom_type(&mut self, statement: &CustomTypeStatement) {
        let context = self.new_context();
        let parameters = type_parameters(&statement.parameters);
        let mut scope = LocalTypeScope::new_static(context.clone(), parameters.clone());
        let fq_name = self.module.fully_qualified_name(&statement.name.name);
        let declared_at = self.module.reference_to(statement.name.range);

        let custom = Arc::new_cyclic(|weak| {
            let target = RecursiveTarget {
                name: &statement.name.name,
                arity: statement.parameters.len(),
                weak,
            };
            let mut variants = Vec::with_capacity(statement.variants.len());
            for (index, variant) in statement.variants.iter().enumerate() {
                let mut variant_parameters = Vec::with_capacity(variant.parameters.len());
                for parameter in &variant.parameters {
                    variant_parameters.push(self.build_type(parameter, &mut scope, Some(&target)));
                }
                variants.push(Variant {
                    name: variant.name.name.clone(),
                    name_range: Some(variant.name.range),
                    parameters: variant_parameters,
                    index,
                });
            }
            Type::Custom(CustomType {
                name: statement.name.name.clone(),
                fq_name,
                declared_at: Some(declared_at),
                parameters: parameters.clone(),
                context,
                variants,
            })
        });

        for (kind, range) in self.module.add_custom_type(custom.clone(), statement.name.range) {
            self.error(kind, range);
        }

        let variants = match custom.as_ref() {
            Type::Custom(built) => built
                .variants
                .iter()
                .zip(&statement.variants)
                .map(|(variant, written)| DecoratedVariant {
                    name: written.name.clone(),
                    parameters: variant.parameters.clone(),
                    index: variant.index,
                    range: written.range,
                })
                .collect(),
            _ => Vec::new(),
        };
        self.module
            .statements
            .push(DecoratedStatement::CustomType(DecoratedCustomType {
                keyword: statement.keyword,
                name: statement.name.clone(),
                parameters,
                variants,
                ty: custom,
                range: statement.range,
            }));
    }

    fn declare_annotation(&mut self, annotation: &Annotation) -> PendingAnnotation {
        let context = self.new_context();
        let mut scope = LocalTypeScope::new_dynamic(context.clone());
        let ty = self.build_type(&annotation.type_expr, &mut scope, None);
        let ty = if scope.definitions().is_empty() {
            ty
        } else {
            Arc::new(Type::LocalTypeContext(LocalTypeNameOnlyContext {
                context: context.clone(),
                names: scope.into_definitions(),
                next: ty,
            }))
        };
        let statement = self.module.statements.len();
        self.module
            .statements
            .push(DecoratedStatement::Annotation(DecoratedAnnotation {
                name: annotation.name.clone(),
                colon: annotation.colon,
                ty: ty.clone(),
                definition: None,
                range: annotation.range,
            }));
        PendingAnnotation {
            name: annotation.name.clone(),
            ty,
            context,
            statement,
            range: annotation.range,
        }
    }

    fn declare_definition(&mut self, definition: &'s Definition, annotation: Option<PendingAnnotation>) {
        let annotation = match annotation {
            Some(annotation) if annotation.name.name == definition.name.name => Some(annotation),
            other => {
                self.flush_annotation(other);
                None
            }
        };

        let (ty, kind, context) = match &annotation {
            Some(annotation) => {
                let is_function = function_parts(&annotation.ty).is_some();
                let kind = if definition.parameters.is_empty() && !is_function {
                    DefinitionKind::Constant
                } else {
                    DefinitionKind::Function
                };
                (annotation.ty.clone(), kind, Some(annotation.context.clone()))
            }
            None => {
                self.error(
                    DecorateErrorKind::MustHaveAnnotationBefore {
                        name: definition.name.name.clone(),
                        definition_missing: false,
                    },
                    definition.name.range,
                );
                let parts = vec![Type::any(); definition.parameters.len() + 1];
                let ty = if definition.parameters.is_empty() {
                    Type::any()
                } else {
                    Type::function(parts)
                };
                (ty, DefinitionKind::Function, None)
            }
        };

        let annotated = annotation.is_some();
        let entry = ModuleDefinition::new(
            definition.name.clone(),
            self.module.fully_qualified_name(&definition.name.name),
            kind,
            ty,
            annotated,
            definition.parameters.clone(),
        );
        let Some(index) = self.register_definition(entry, &definition.parameters, &definition.expression, context) else {
            return;
        };
        if let Some(annotation) = annotation {
            if let Some(DecoratedStatement::Annotation(statement)) =
                self.module.statements.get_mut(annotation.statement)
            {
                statement.definition = Some(index);
            }
        }
    }

    fn declare_constant(&mut self, constant: &'s ConstantDefinition) {
        let entry = ModuleDefinition::new(
            constant.name.clone(),
            self.module.fully_qualified_name(&constant.name.name),
            DefinitionKind::Constant,
            Type::any(),
            false,
            Vec::new(),
        );
        self.register_definition(entry, &[], &constant.expression, None);
    }

    fn register_definition(
        &mut self,
        entry: ModuleDefinition,
        parameters: &'s [VariableIdentifier],
        expression: &'s crate::surface::Expression,
        context: Option<LocalContextId>,
    ) -> Option<usize> {
        let range = entry.identifier.range;
        match self.module.add_definition(entry) {
            Ok(index) => {
                self.bodies.push(Some(PendingBody {
                    parameters,
                    expression,
                    context,
                }));
                self.states.push(BodyState::Pending);
                self.module.statements.push(DecoratedStatement::Definition(index));
                Some(index)
            }
            Err(kind) => {
                self.error(kind, range);
                None
            }
        }
    }

    /// Builds a decorated type from a written one. Failures are reported and
    /// replaced by `*` carrying the written range.
    fn build_type(
        &mut self,
        expression: &TypeExpr,
        scope: &mut LocalTypeScope,
        recursive: Option<&RecursiveTarget<'_>>,
    ) -> Ty {
        match expression {
            TypeExpr::Reference {
                name,
                arguments,
                range,
            } => {
                let mut built = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    built.push(self.build_type(argument, scope, recursive));
                }
                if let Some(target) = recursive.filter(|target| {
                    name.module.is_none() && name.identifier.name == target.name
                }) {
                    let reference = Arc::new(Type::RecursiveReference(RecursiveReference {
                        name: target.name.to_string(),
                        range: Some(name.identifier.range),
                        target: target.weak.clone(),
                    }));
                    return self.apply_arguments(&name.identifier.name, reference, target.arity, built, *range);
                }
                match self.module.create_some_type_reference(name) {
                    Ok((_, found)) if found.kind == ModuleTypeKind::Variant => {
                        self.error(DecorateErrorKind::UnknownType(name.identifier.name.clone()), name.range());
                        any_at(*range)
                    }
                    Ok((reference, found)) => {
                        let arity = type_arity(&found.ty);
                        self.apply_arguments(&name.identifier.name, reference, arity, built, *range)
                    }
                    Err(kind) => {
                        self.error(kind, name.range());
                        any_at(*range)
                    }
                }
            }
            TypeExpr::Local(identifier) => match scope.lookup(&identifier.name, Some(identifier.range)) {
                Ok(ty) => ty,
                Err(error) => {
                    self.error(error.into(), identifier.range);
                    any_at(identifier.range)
                }
            },
            TypeExpr::Function { parts, range } => {
                let mut built = Vec::with_capacity(parts.len());
                for part in parts {
                    built.push(self.build_type(part, scope, recursive));
                }
                Arc::new(Type::Function(FunctionType {
                    parts: built,
                    range: Some(*range),
                }))
            }
            TypeExpr::Tuple { items, range } => {
                let mut built = Vec::with_capacity(items.len());
                for item in items {
                    built.push(self.build_type(item, scope, recursive));
                }
                Arc::new(Type::Tuple(TupleType {
                    items: built,
                    range: Some(*range),
                }))
            }
            TypeExpr::Record { fields, range } => {
                let mut seen = HashSet::new();
                let mut built = Vec::with_capacity(fields.len());
                for field in fields {
                    let ty = self.build_type(&field.type_expr, scope, recursive);
                    if !seen.insert(field.name.name.clone()) {
                        self.error(
                            DecorateErrorKind::AlreadyDeclared(field.name.name.clone()),
                            field.name.range,
                        );
                        continue;
                    }
                    built.push((field.name.name.clone(), Some(field.name.range), ty));
                }
                Arc::new(Type::Record(RecordType::new(built, Some(*range))))
            }
            TypeExpr::Unmanaged { name, range, .. } => Arc::new(Type::Unmanaged(UnmanagedType {
                name: name.name.clone(),
                range: Some(*range),
            })),
            TypeExpr::AnyMatching(range) => any_at(*range),
        }
    }

    fn apply_arguments(
        &mut self,
        name: &str,
        generator: Ty,
        arity: usize,
        arguments: Vec<Ty>,
        range: Range,
    ) -> Ty {
        if arguments.len() > arity {
            self.error(
                DecorateErrorKind::ExtraTypeParameters {
                    name: name.to_string(),
                    expected: arity,
                    found: arguments.len(),
                },
                range,
            );
            return generator;
        }
        if arguments.len() < arity {
            self.error(
                DecorateErrorKind::UndefinedTypeParameter {
                    name: name.to_string(),
                    expected: arity,
                },
                range,
            );
            return generator;
        }
        if arguments.is_empty() {
            return generator;
        }
        Arc::new(Type::Invoker(crate::types::InvokerType {
            generator,
            params: arguments,
            range: Some(range),
        }))
    }
}

fn type_parameters(parameters: &[VariableIdentifier]) -> Vec<LocalTypeDefinition> {
    parameters
        .iter()
        .map(|parameter| LocalTypeDefinition {
            name: parameter.name.clone(),
            range: Some(parameter.range),
        })
        .collect()
}

fn any_at(range: Range) -> Ty {
    Arc::new(Type::AnyMatching(AnyMatchingType { range: Some(range) }))
}

/// Name of the custom type a registered variant belongs to.
fn variant_owner(ty: &Ty) -> Option<String> {
    match ty.as_ref() {
        Type::CustomVariant(variant) => Some(variant.custom.name()),
        _ => None,
    }
}
