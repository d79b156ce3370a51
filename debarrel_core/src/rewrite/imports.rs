use oxc_allocator::Allocator;
use oxc_ast::ast::{ImportDeclaration, ImportDeclarationSpecifier, Statement};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use super::packages::BarrelPackages;
use crate::export_map::module_export_name_as_str;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SpecifierKind {
    Named { imported: String },
    Default,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportSpecifierInfo {
    pub kind: SpecifierKind,
    pub local: String,
    /// Inline `type` modifier, as in `import { type Props } from "pkg"`.
    pub type_only: bool,
    /// The specifier exactly as written, used when it stays on the barrel.
    pub text: String,
}

/// One top-level `import ... from "<barrel package>"` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BarrelImport {
    pub start: usize,
    pub end: usize,
    pub package: String,
    /// The source literal as written, quotes included.
    pub source_text: String,
    pub type_only: bool,
    pub specifiers: Vec<ImportSpecifierInfo>,
}

impl BarrelImport {
    pub fn quote(&self) -> char {
        match self.source_text.chars().next() {
            Some('\'') => '\'',
            _ => '"',
        }
    }
}

/// Parses a consumer module and returns its rewritable barrel imports.
pub(crate) fn collect_barrel_imports(
    source_text: &str,
    source_type: SourceType,
    packages: &BarrelPackages,
) -> Result<Vec<BarrelImport>, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source_text, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        return Err(format!("{} parse error(s)", parsed.errors.len().max(1)));
    }
    Ok(parsed
        .program
        .body
        .iter()
        .filter_map(|statement| match statement {
            Statement::ImportDeclaration(it) => Some(it),
            _ => None,
        })
        .filter(|it| packages.contains(it.source.value.as_str()))
        .filter_map(|it| barrel_import_of(it, source_text))
        .collect())
}

fn barrel_import_of(it: &ImportDeclaration<'_>, source_text: &str) -> Option<BarrelImport> {
    // Side-effect imports, deferred/source phase imports and imports with
    // attributes keep their meaning only against the original module.
    let specifiers = it.specifiers.as_ref().filter(|s| !s.is_empty())?;
    if it.with_clause.is_some() || it.phase.is_some() {
        return None;
    }
    let specifiers = specifiers
        .iter()
        .map(|specifier| {
            let span = specifier.span();
            let text = source_text[span.start as usize..span.end as usize].to_string();
            match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(s) => ImportSpecifierInfo {
                    kind: SpecifierKind::Named {
                        imported: module_export_name_as_str(&s.imported).to_string(),
                    },
                    local: s.local.name.as_str().to_string(),
                    type_only: s.import_kind.is_type(),
                    text,
                },
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => ImportSpecifierInfo {
                    kind: SpecifierKind::Default,
                    local: s.local.name.as_str().to_string(),
                    type_only: false,
                    text,
                },
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => ImportSpecifierInfo {
                    kind: SpecifierKind::Namespace,
                    local: s.local.name.as_str().to_string(),
                    type_only: false,
                    text,
                },
            }
        })
        .collect();
    let source_span = it.source.span;
    Some(BarrelImport {
        start: it.span.start as usize,
        end: it.span.end as usize,
        package: it.source.value.to_string(),
        source_text: source_text[source_span.start as usize..source_span.end as usize].to_string(),
        type_only: it.import_kind.is_type(),
        specifiers,
    })
}
