use std::fs;
use std::path::{Path, PathBuf};

use debarrel::args::{config_tokens, derive_args};
use debarrel::resolve::NodeEntryResolver;
use debarrel::run::{EXIT_OK, EXIT_USAGE, RunContext, run_cli, run_once};
use debarrel_core::ResolveEntry;
use debarrel_core::config::load_debarrel_config;
use oxc_resolver::{ResolveOptions, Resolver};

const APP_SOURCE: &str =
    "import { Button, Card, Spinner } from \"@acme/ui\";\nconsole.log(Button, Card, Spinner);\n";
const PLAIN_SOURCE: &str = "export const answer = 42;\n";

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn fixture_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "package.json",
        r#"{ "name": "app", "private": true, "debarrel": { "packages": ["@acme/ui"] } }"#,
    );
    write(
        root,
        "node_modules/@acme/ui/package.json",
        r#"{ "name": "@acme/ui", "version": "1.0.0", "module": "./index.mjs", "main": "./index.cjs" }"#,
    );
    write(
        root,
        "node_modules/@acme/ui/index.mjs",
        "export { Button } from \"./button\";\nexport { default as Card } from \"./card\";\nexport * from \"./spinner\";\n",
    );
    write(root, "node_modules/@acme/ui/index.cjs", "module.exports = {};\n");
    write(root, "node_modules/@acme/ui/button.mjs", "export const Button = 'button';\n");
    write(root, "node_modules/@acme/ui/card.mjs", "export default 'card';\n");
    write(root, "node_modules/@acme/ui/spinner.mjs", "export const Spinner = 'spinner';\n");
    write(root, "src/app.js", APP_SOURCE);
    write(root, "src/plain.js", PLAIN_SOURCE);
    dir
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap()
}

fn argv(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

const REWRITTEN_APP: &str = "import { Spinner } from \"@acme/ui\";\nimport { Button } from \"../node_modules/@acme/ui/button\";\nimport { default as Card } from \"../node_modules/@acme/ui/card\";\nconsole.log(Button, Card, Spinner);\n";
const MIRRORED_APP: &str = "import { Spinner } from \"@acme/ui\";\nimport { Button } from \"../../node_modules/@acme/ui/button\";\nimport { default as Card } from \"../../node_modules/@acme/ui/card\";\nconsole.log(Button, Card, Spinner);\n";

fn import_specifiers(code: &str) -> Vec<&str> {
    code.lines()
        .filter(|line| line.starts_with("import "))
        .filter_map(|line| line.split_once(" from \""))
        .filter_map(|(_, rest)| rest.split_once('"'))
        .map(|(specifier, _)| specifier)
        .collect()
}

/// Resolves every import of `file` from the directory it lives in.
fn resolve_imports_of(file: &Path) -> Vec<(String, PathBuf)> {
    let resolver = Resolver::new(ResolveOptions {
        extensions: vec![".mjs".to_string(), ".js".to_string()],
        condition_names: vec!["import".to_string()],
        main_fields: vec!["module".to_string()],
        ..Default::default()
    });
    let dir = file.parent().unwrap();
    let code = fs::read_to_string(file).unwrap();
    import_specifiers(&code)
        .into_iter()
        .map(|specifier| {
            let resolution = resolver
                .resolve(dir, specifier)
                .unwrap_or_else(|err| panic!("{specifier} from {}: {err}", dir.display()));
            (specifier.to_string(), canonical(&resolution.full_path()))
        })
        .collect()
}

#[test]
fn resolver_prefers_the_module_field() {
    let dir = fixture_project();
    let root = canonical(dir.path());
    let resolver = NodeEntryResolver::new(
        &root,
        &argv(&["import", "default"]),
        &argv(&["module", "main"]),
    );
    assert_eq!(
        resolver.resolve_entry("@acme/ui"),
        Some(root.join("node_modules/@acme/ui/index.mjs"))
    );
    assert_eq!(resolver.resolve_entry("@acme/missing"), None);
}

#[test]
fn write_mode_rewrites_files_in_place() {
    let dir = fixture_project();
    let root = dir.path();

    assert_eq!(run_cli(root, &argv(&["--write"])), EXIT_OK);
    similar_asserts::assert_eq!(fs::read_to_string(root.join("src/app.js")).unwrap(), REWRITTEN_APP);
    assert_eq!(
        fs::read_to_string(root.join("src/plain.js")).unwrap(),
        PLAIN_SOURCE
    );

    // already-direct imports are left alone on a second pass
    assert_eq!(run_cli(root, &argv(&["--write"])), EXIT_OK);
    assert_eq!(
        fs::read_to_string(root.join("src/app.js")).unwrap(),
        REWRITTEN_APP
    );
}

#[test]
fn out_dir_mirrors_the_tree_with_source_maps() {
    let dir = fixture_project();
    let root = dir.path();

    let code = run_cli(root, &argv(&["--out-dir", "out", "--source-map", "src"]));
    assert_eq!(code, EXIT_OK);

    let out_app = fs::read_to_string(root.join("out/src/app.js")).unwrap();
    assert_eq!(
        out_app,
        format!("{MIRRORED_APP}//# sourceMappingURL=app.js.map\n")
    );
    assert_eq!(
        fs::read_to_string(root.join("out/src/plain.js")).unwrap(),
        PLAIN_SOURCE
    );
    assert!(!root.join("out/src/plain.js.map").exists());

    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("out/src/app.js.map")).unwrap())
            .unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "app.js");
    assert_eq!(map["sources"][0], "../../src/app.js");
    assert_eq!(map["sourcesContent"][0], APP_SOURCE);

    assert_eq!(
        fs::read_to_string(root.join("src/app.js")).unwrap(),
        APP_SOURCE
    );
}

#[test]
fn dry_run_reports_without_touching_files() {
    let dir = fixture_project();
    let root = canonical(dir.path());
    let config = load_debarrel_config(&root).unwrap();
    let args = derive_args(&config_tokens(&config), &[]).unwrap();
    assert!(args.is_dry_run());

    let ctx = RunContext::new(&root, &root, &config, args).unwrap();
    let summary = run_once(&ctx);
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.rewritten, vec![root.join("src/app.js")]);
    assert!(summary.failed.is_empty());
    assert_eq!(
        fs::read_to_string(root.join("src/app.js")).unwrap(),
        APP_SOURCE
    );
    assert_eq!(
        ctx.rewriter.cache().cached_paths(),
        vec![root.join("node_modules/@acme/ui/index.mjs")]
    );
}

#[test]
fn missing_packages_and_conflicting_outputs_are_usage_errors() {
    let empty = tempfile::tempdir().unwrap();
    assert_eq!(run_cli(empty.path(), &[]), EXIT_USAGE);

    let dir = fixture_project();
    assert_eq!(
        run_cli(dir.path(), &argv(&["--write", "--out-dir", "out"])),
        EXIT_USAGE
    );
    assert_eq!(run_cli(dir.path(), &argv(&["--bogus"])), EXIT_USAGE);
}

#[test]
fn explain_prints_the_export_map() {
    let dir = fixture_project();
    assert_eq!(
        run_cli(dir.path(), &argv(&["--explain", "@acme/ui"])),
        EXIT_OK
    );
    assert_ne!(
        run_cli(dir.path(), &argv(&["--explain", "@acme/missing"])),
        EXIT_OK
    );
}

#[test]
fn rewritten_imports_resolve_to_the_barrel_modules() {
    let dir = fixture_project();
    let root = canonical(dir.path());
    let ui = root.join("node_modules/@acme/ui");

    assert_eq!(run_cli(&root, &argv(&["--out-dir", "out"])), EXIT_OK);
    assert_eq!(run_cli(&root, &argv(&["--write"])), EXIT_OK);

    for file in [root.join("src/app.js"), root.join("out/src/app.js")] {
        let resolved = resolve_imports_of(&file);
        assert_eq!(resolved.len(), 3, "{}", file.display());
        assert_eq!(resolved[0].1, ui.join("index.mjs"));
        assert_eq!(resolved[1].1, ui.join("button.mjs"));
        assert_eq!(resolved[2].1, ui.join("card.mjs"));
    }
}
