use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ExportAllDeclaration, ExportNamedDeclaration, ImportDeclaration, ImportDeclarationSpecifier,
    ModuleExportName, Statement,
};
use oxc_parser::Parser;
use oxc_span::SourceType;

/// What a local import binding refers to in its source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Named(String),
    Default,
    Namespace,
}

/// Shape of one top-level export-related binding of a module.
///
/// A statement with several specifiers yields one value per specifier, in
/// source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStatement {
    /// `export * as exported from "source"`
    NamespaceReexport { exported: String, source: String },
    /// `export { imported as exported } from "source"`, including `default as exported`
    NamedReexport {
        exported: String,
        imported: String,
        source: String,
    },
    /// `export * from "source"`
    WildcardReexport { source: String },
    /// One binding of `import ... from "source"`
    Import {
        local: String,
        imported: ImportedName,
        source: String,
    },
    /// `export { local as exported }` without a source
    LocalExport { local: String, exported: String },
    /// Export forms that never point at another module (declarations, `export default`)
    Other,
}

pub fn source_type_for_path(path: &Path) -> SourceType {
    SourceType::from_path(path)
        .unwrap_or_else(|_| SourceType::mjs().with_jsx(true))
        .with_module(true)
}

/// Parses `source_text` and classifies its top-level import/export statements.
///
/// Any parser error fails the whole module; callers never see a partial list.
pub fn parse_module_statements(
    source_text: &str,
    source_type: SourceType,
) -> Result<Vec<ModuleStatement>, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source_text, source_type).parse();
    // Duplicate exported names land here as well, so a barrel exporting a
    // name twice is rejected whole instead of letting the later one win.
    if parsed.panicked || !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .iter()
            .map(|e| format!("{e:?}"))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(if message.is_empty() {
            "parser panicked".to_string()
        } else {
            message
        });
    }

    let mut out: Vec<ModuleStatement> = vec![];
    for statement in &parsed.program.body {
        match statement {
            Statement::ImportDeclaration(it) => collect_import(it, &mut out),
            Statement::ExportAllDeclaration(it) => collect_export_all(it, &mut out),
            Statement::ExportNamedDeclaration(it) => collect_export_named(it, &mut out),
            Statement::ExportDefaultDeclaration(_) => out.push(ModuleStatement::Other),
            _ => {}
        }
    }
    Ok(out)
}

fn collect_import(it: &ImportDeclaration<'_>, out: &mut Vec<ModuleStatement>) {
    let Some(specifiers) = it.specifiers.as_ref() else {
        return;
    };
    let source = it.source.value.to_string();
    specifiers.iter().for_each(|specifier| {
        let (local, imported) = match specifier {
            ImportDeclarationSpecifier::ImportSpecifier(s) => (
                s.local.name.as_str(),
                imported_name_of(&s.imported),
            ),
            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                (s.local.name.as_str(), ImportedName::Default)
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                (s.local.name.as_str(), ImportedName::Namespace)
            }
        };
        out.push(ModuleStatement::Import {
            local: local.to_string(),
            imported,
            source: source.clone(),
        });
    });
}

fn imported_name_of(name: &ModuleExportName<'_>) -> ImportedName {
    let text = module_export_name_as_str(name);
    if text == super::DEFAULT_EXPORT {
        ImportedName::Default
    } else {
        ImportedName::Named(text.to_string())
    }
}

fn collect_export_all(it: &ExportAllDeclaration<'_>, out: &mut Vec<ModuleStatement>) {
    let source = it.source.value.to_string();
    match it.exported.as_ref() {
        Some(exported) => out.push(ModuleStatement::NamespaceReexport {
            exported: module_export_name_as_str(exported).to_string(),
            source,
        }),
        None => out.push(ModuleStatement::WildcardReexport { source }),
    }
}

fn collect_export_named(it: &ExportNamedDeclaration<'_>, out: &mut Vec<ModuleStatement>) {
    if it.declaration.is_some() {
        out.push(ModuleStatement::Other);
        return;
    }
    let source = it.source.as_ref().map(|lit| lit.value.to_string());
    it.specifiers.iter().for_each(|spec| {
        let local = module_export_name_as_str(&spec.local).to_string();
        let exported = module_export_name_as_str(&spec.exported).to_string();
        let statement = match &source {
            Some(source) => ModuleStatement::NamedReexport {
                exported,
                imported: local,
                source: source.clone(),
            },
            None => ModuleStatement::LocalExport { local, exported },
        };
        out.push(statement);
    });
}

pub(crate) fn module_export_name_as_str<'a>(name: &ModuleExportName<'a>) -> &'a str {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.as_str(),
        ModuleExportName::IdentifierReference(ident) => ident.name.as_str(),
        ModuleExportName::StringLiteral(lit) => lit.value.as_str(),
    }
}
