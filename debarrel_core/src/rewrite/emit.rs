use std::borrow::Cow;
use std::path::Path;

use oxc_syntax::identifier::is_identifier_name;

use super::imports::{BarrelImport, ImportSpecifierInfo, SpecifierKind};
use super::specifier::rebase_source;
use crate::export_map::{BindingKind, DEFAULT_EXPORT, ExportMap};

#[derive(Debug)]
enum OutputImport<'a> {
    Named {
        source: Cow<'a, str>,
        specifiers: Vec<String>,
    },
    Namespace {
        source: Cow<'a, str>,
        local: &'a str,
        type_only: bool,
    },
}

/// Renders the statements that replace `import`, or `None` when no specifier
/// of it can be redirected.
///
/// Specifiers without a map entry stay on the barrel in a trimmed copy of the
/// original statement, emitted first. Named specifiers pointing at the same
/// source share one statement. Sources relative to the barrel entry are
/// rewritten relative to `importer_dir`.
pub(crate) fn rewrite_import(
    import: &BarrelImport,
    map: &ExportMap,
    importer_dir: Option<&Path>,
) -> Option<String> {
    let mut outputs: Vec<OutputImport<'_>> = vec![];
    let mut kept: Vec<&ImportSpecifierInfo> = vec![];

    for spec in &import.specifiers {
        let lookup = match &spec.kind {
            SpecifierKind::Named { imported } => Some(imported.as_str()),
            SpecifierKind::Default => Some(DEFAULT_EXPORT),
            SpecifierKind::Namespace => None,
        };
        let Some(binding) = lookup.and_then(|name| map.get(name)) else {
            kept.push(spec);
            continue;
        };
        let source = rebase_source(&binding.source, map.entry_path(), importer_dir);
        match &binding.kind {
            BindingKind::Namespace => outputs.push(OutputImport::Namespace {
                source,
                local: spec.local.as_str(),
                type_only: spec.type_only,
            }),
            BindingKind::Named(original) => {
                let rendered = render_named_specifier(original, &spec.local, spec.type_only);
                let existing = outputs.iter_mut().find_map(|output| match output {
                    OutputImport::Named {
                        source: existing,
                        specifiers,
                    } if *existing == source => Some(specifiers),
                    _ => None,
                });
                match existing {
                    Some(specifiers) => specifiers.push(rendered),
                    None => outputs.push(OutputImport::Named {
                        source,
                        specifiers: vec![rendered],
                    }),
                }
            }
        }
    }

    if outputs.is_empty() {
        return None;
    }

    let quote = import.quote();
    let statement_type = if import.type_only { "type " } else { "" };
    let mut statements: Vec<String> = vec![];
    if !kept.is_empty() {
        statements.push(render_kept(import, &kept));
    }
    statements.extend(outputs.iter().map(|output| match output {
        OutputImport::Named { source, specifiers } => format!(
            "import {statement_type}{{ {} }} from {};",
            specifiers.join(", "),
            quote_specifier(source, quote)
        ),
        OutputImport::Namespace {
            source,
            local,
            type_only,
        } => {
            let type_keyword = if import.type_only || *type_only {
                "type "
            } else {
                ""
            };
            format!(
                "import {type_keyword}* as {local} from {};",
                quote_specifier(source, quote)
            )
        }
    }));
    Some(statements.join("\n"))
}

fn render_named_specifier(original: &str, local: &str, type_only: bool) -> String {
    let type_prefix = if type_only { "type " } else { "" };
    if original == local {
        return format!("{type_prefix}{local}");
    }
    let imported = if is_identifier_name(original) {
        original.to_string()
    } else {
        quote_specifier(original, '"')
    };
    format!("{type_prefix}{imported} as {local}")
}

fn render_kept(import: &BarrelImport, kept: &[&ImportSpecifierInfo]) -> String {
    let mut clauses: Vec<String> = kept
        .iter()
        .filter(|spec| !matches!(spec.kind, SpecifierKind::Named { .. }))
        .map(|spec| spec.text.clone())
        .collect();
    let named = kept
        .iter()
        .filter(|spec| matches!(spec.kind, SpecifierKind::Named { .. }))
        .map(|spec| spec.text.as_str())
        .collect::<Vec<_>>();
    if !named.is_empty() {
        clauses.push(format!("{{ {} }}", named.join(", ")));
    }
    let statement_type = if import.type_only { "type " } else { "" };
    format!(
        "import {statement_type}{} from {};",
        clauses.join(", "),
        import.source_text
    )
}

fn quote_specifier(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
