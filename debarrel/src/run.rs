use std::path::{Path, PathBuf};
use std::sync::Arc;

use debarrel_core::config::{DebarrelConfig, load_debarrel_config, load_debarrel_config_from_path};
use debarrel_core::error::DebarrelError;
use debarrel_core::sourcemap::SourceMap;
use debarrel_core::{BarrelPackages, BarrelRewriter, ExportMapCache, ReadSource, ResolveEntry};
use path_slash::PathExt;

use crate::args::{ParsedArgs, config_tokens, derive_args, prescan_flag};
use crate::discover::{SourceFilter, discover_source_files};
use crate::parallel_stride::map_parallel_stride;
use crate::profile;
use crate::resolve::{FsSourceReader, NodeEntryResolver};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Everything one run (or one watch iteration) needs, built once.
#[derive(Debug)]
pub struct RunContext {
    pub project_root: PathBuf,
    pub args: ParsedArgs,
    pub scan_roots: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub filter: SourceFilter,
    pub resolver: Arc<NodeEntryResolver>,
    pub rewriter: BarrelRewriter,
}

impl RunContext {
    pub fn new(
        cwd: &Path,
        project_root: &Path,
        config: &DebarrelConfig,
        args: ParsedArgs,
    ) -> Result<Self, DebarrelError> {
        let filter = SourceFilter::new(&args.include_globs, &args.exclude_globs)?;
        let scan_roots = if args.paths.is_empty() {
            let base = config
                .root_dir
                .as_deref()
                .map(|dir| project_root.join(dir))
                .unwrap_or_else(|| project_root.to_path_buf());
            vec![base]
        } else {
            args.paths.iter().map(|p| cwd.join(p)).collect()
        };
        let out_dir = args.out_dir.as_deref().map(|dir| project_root.join(dir));

        let packages = Arc::new(BarrelPackages::new(args.packages.iter().cloned()));
        let resolver = Arc::new(NodeEntryResolver::new(
            project_root,
            &args.condition_names,
            &args.main_fields,
        ));
        let rewriter = BarrelRewriter::from_shared(
            packages,
            Arc::clone(&resolver) as Arc<dyn ResolveEntry>,
            Arc::new(FsSourceReader) as Arc<dyn ReadSource>,
        )
        .with_cache(Arc::new(ExportMapCache::new()));

        Ok(Self {
            project_root: project_root.to_path_buf(),
            args,
            scan_roots,
            out_dir,
            filter,
            resolver,
            rewriter,
        })
    }

    /// Forgets what the resolver learned about the filesystem so packages
    /// installed or removed since the last run are seen. With
    /// `drop_export_maps` every cached barrel is rebuilt on next use too.
    pub fn reset_resolution(&self, drop_export_maps: bool) {
        self.resolver.clear_cache();
        if drop_export_maps {
            self.rewriter.cache().clear();
        }
    }

    pub fn discover(&self) -> Vec<PathBuf> {
        let _span = profile::span("discover");
        discover_source_files(
            &self.project_root,
            &self.scan_roots,
            &self.filter,
            self.out_dir.as_deref(),
        )
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.project_root).unwrap_or(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    Rewritten { code: String, map: SourceMap },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scanned: usize,
    pub rewritten: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        if self.failed.is_empty() {
            EXIT_OK
        } else {
            EXIT_FAILURE
        }
    }
}

/// Entry point behind `main`: parses flags, loads configuration, runs once or
/// keeps watching. Returns the process exit code.
pub fn run_cli(cwd: &Path, argv: &[String]) -> i32 {
    let cwd = dunce::canonicalize(cwd).unwrap_or_else(|_| cwd.to_path_buf());
    let cwd = cwd.as_path();
    let project_root = prescan_flag(argv, "--root")
        .map(|root| cwd.join(root))
        .unwrap_or_else(|| cwd.to_path_buf());
    let project_root = dunce::canonicalize(&project_root).unwrap_or(project_root);

    let config = match prescan_flag(argv, "--config") {
        Some(path) => load_debarrel_config_from_path(&cwd.join(path)),
        None => load_debarrel_config(&project_root),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("debarrel: {err}");
            return EXIT_USAGE;
        }
    };

    let args = match derive_args(&config_tokens(&config), argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("debarrel: {err}");
            return EXIT_USAGE;
        }
    };
    if args.write && args.out_dir.is_some() {
        eprintln!("debarrel: --write and --out-dir cannot be combined");
        return EXIT_USAGE;
    }

    let ctx = match RunContext::new(cwd, &project_root, &config, args) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("debarrel: {err}");
            return EXIT_USAGE;
        }
    };

    if let Some(package_name) = ctx.args.explain.as_deref() {
        return explain_package(&ctx, package_name);
    }
    if ctx.rewriter.packages().is_empty() {
        eprintln!("debarrel: no barrel packages configured (use --package or a config file)");
        return EXIT_USAGE;
    }
    if ctx.args.verbose {
        eprintln!(
            "debarrel: root={} packages={:?} jobs={} watch={}",
            ctx.project_root.to_string_lossy(),
            ctx.rewriter.packages().names(),
            ctx.args.jobs,
            ctx.args.watch
        );
    }

    let run_iteration = || -> i32 {
        let summary = run_once(&ctx);
        print_summary(&ctx, &summary);
        summary.exit_code()
    };
    if ctx.args.watch {
        crate::watch::run_polling_watch_loop(
            &ctx,
            std::time::Duration::from_millis(800),
            run_iteration,
        )
    } else {
        run_iteration()
    }
}

fn explain_package(ctx: &RunContext, package_name: &str) -> i32 {
    let Some(map) = ctx.rewriter.export_map(package_name) else {
        eprintln!("debarrel: cannot build an export map for {package_name}");
        return EXIT_FAILURE;
    };
    match serde_json::to_string_pretty(&*map) {
        Ok(json) => {
            println!("{json}");
            EXIT_OK
        }
        Err(err) => {
            eprintln!("debarrel: {err}");
            EXIT_FAILURE
        }
    }
}

/// Transforms every discovered file and writes whatever the flags ask for.
pub fn run_once(ctx: &RunContext) -> RunSummary {
    let files = ctx.discover();
    let reports = {
        let _span = profile::span("transform");
        map_parallel_stride(&files, ctx.args.jobs, |path, _index| {
            let outcome = match ctx.out_dir.as_deref() {
                Some(out_dir) => mirror_file(ctx, out_dir, path),
                None => rewrite_in_place(ctx, path),
            };
            FileReport {
                path: path.clone(),
                outcome: outcome.unwrap_or_else(|err| FileOutcome::Failed(err.to_string())),
            }
        })
    };
    if ctx.args.stdout {
        print_to_stdout(ctx, &reports);
    }

    let mut summary = RunSummary {
        scanned: files.len(),
        ..RunSummary::default()
    };
    for report in reports {
        match report.outcome {
            FileOutcome::Unchanged => {}
            FileOutcome::Rewritten { .. } => summary.rewritten.push(report.path),
            FileOutcome::Failed(message) => summary.failed.push((report.path, message)),
        }
    }
    summary
}

/// Transforms one file. `output_path` is where the result will live when it
/// is not written back to `path`.
pub fn transform_file(
    rewriter: &BarrelRewriter,
    path: &Path,
    output_path: Option<&Path>,
) -> FileOutcome {
    let source_text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => return FileOutcome::Failed(format!("cannot read: {err}")),
    };
    let module_path = path.to_string_lossy();
    let output = match output_path {
        Some(output_path) => {
            rewriter.transform_for_output(&source_text, &module_path, output_path)
        }
        None => rewriter.transform(&source_text, &module_path),
    };
    match output {
        Some(output) => FileOutcome::Rewritten {
            code: output.code,
            map: output.map,
        },
        None => FileOutcome::Unchanged,
    }
}

fn mirror_file(
    ctx: &RunContext,
    out_dir: &Path,
    path: &Path,
) -> Result<FileOutcome, DebarrelError> {
    let Ok(rel) = path.strip_prefix(&ctx.project_root) else {
        return Ok(FileOutcome::Failed(
            "outside the project root, not mirrored".to_string(),
        ));
    };
    let target = out_dir.join(rel);
    let outcome = transform_file(&ctx.rewriter, path, Some(&target));
    ensure_parent_dir(&target)?;
    match &outcome {
        FileOutcome::Rewritten { code, map } => {
            write_code(&target, code, map, ctx.args.source_map)?
        }
        FileOutcome::Unchanged => {
            std::fs::copy(path, &target).map_err(|source| DebarrelError::Io {
                path: target.clone(),
                source,
            })?;
        }
        FileOutcome::Failed(_) => {}
    }
    Ok(outcome)
}

fn rewrite_in_place(ctx: &RunContext, path: &Path) -> Result<FileOutcome, DebarrelError> {
    let outcome = transform_file(&ctx.rewriter, path, None);
    if ctx.args.write
        && let FileOutcome::Rewritten { code, map } = &outcome
    {
        write_code(path, code, map, ctx.args.source_map)?;
    }
    Ok(outcome)
}

fn ensure_parent_dir(target: &Path) -> Result<(), DebarrelError> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };
    std::fs::create_dir_all(parent).map_err(|source| DebarrelError::Io {
        path: parent.to_path_buf(),
        source,
    })
}

fn write_code(
    target: &Path,
    code: &str,
    map: &SourceMap,
    with_source_map: bool,
) -> Result<(), DebarrelError> {
    if !with_source_map {
        return write_file(target, code);
    }

    let map_path = map_path_for(target);
    write_file(&map_path, &relocate_sources(map, &map_path).to_json())?;

    let map_file_name = map_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    write_file(target, &append_source_mapping_url(code, &map_file_name))
}

fn write_file(path: &Path, contents: &str) -> Result<(), DebarrelError> {
    std::fs::write(path, contents).map_err(|source| DebarrelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn map_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".map");
    PathBuf::from(name)
}

/// Rewrites `sources` to be relative to the directory holding the map file.
fn relocate_sources(map: &SourceMap, map_path: &Path) -> SourceMap {
    let Some(map_dir) = map_path.parent() else {
        return map.clone();
    };
    let mut relocated = map.clone();
    relocated.sources = map
        .sources
        .iter()
        .map(|source| {
            pathdiff::diff_paths(source, map_dir)
                .map(|rel| rel.to_slash_lossy().to_string())
                .unwrap_or_else(|| source.clone())
        })
        .collect();
    relocated
}

pub fn append_source_mapping_url(code: &str, url: &str) -> String {
    let separator = if code.ends_with('\n') || code.is_empty() {
        ""
    } else {
        "\n"
    };
    format!("{code}{separator}//# sourceMappingURL={url}\n")
}

fn print_to_stdout(ctx: &RunContext, reports: &[FileReport]) {
    let rewritten = reports
        .iter()
        .filter_map(|report| match &report.outcome {
            FileOutcome::Rewritten { code, map } => Some((report.path.as_path(), code, map)),
            _ => None,
        })
        .collect::<Vec<_>>();
    let with_headers = rewritten.len() > 1;
    for (path, code, map) in rewritten {
        if with_headers {
            println!("// {}", ctx.relative(path).to_slash_lossy());
        }
        if ctx.args.source_map {
            print!("{}", append_source_mapping_url(code, &map.to_data_url()));
        } else {
            print!("{code}");
        }
    }
}

fn print_summary(ctx: &RunContext, summary: &RunSummary) {
    for (path, message) in &summary.failed {
        eprintln!("debarrel: {}: {message}", ctx.relative(path).to_slash_lossy());
    }
    if ctx.args.is_dry_run() {
        for path in &summary.rewritten {
            println!("{}", ctx.relative(path).to_slash_lossy());
        }
        println!(
            "{} of {} files would change",
            summary.rewritten.len(),
            summary.scanned
        );
        return;
    }
    if ctx.args.verbose || !ctx.args.stdout {
        eprintln!(
            "debarrel: rewrote {} of {} files ({} barrel entries cached)",
            summary.rewritten.len(),
            summary.scanned,
            ctx.rewriter.cache().len()
        );
    }
}
