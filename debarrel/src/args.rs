use clap::Parser;
use debarrel_core::config::DebarrelConfig;

#[derive(Debug, Clone, Parser, Default)]
#[command(
    name = "debarrel",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
struct DebarrelCli {
    #[arg(long = "config")]
    config: Option<String>,

    #[arg(long = "root")]
    root: Option<String>,

    #[arg(long = "package", alias = "pkg")]
    packages: Vec<String>,

    #[arg(long = "include")]
    include: Vec<String>,

    #[arg(long = "exclude")]
    exclude: Vec<String>,

    #[arg(
        long = "write",
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    write: bool,

    #[arg(long = "out-dir", alias = "outDir")]
    out_dir: Option<String>,

    #[arg(
        long = "source-map",
        alias = "sourceMap",
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    source_map: bool,

    #[arg(
        long = "stdout",
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    stdout: bool,

    #[arg(long = "explain")]
    explain: Option<String>,

    #[arg(long = "jobs", short = 'j')]
    jobs: Option<usize>,

    #[arg(long = "condition-name", alias = "conditionName")]
    condition_names: Vec<String>,

    #[arg(long = "main-field", alias = "mainField")]
    main_fields: Vec<String>,

    #[arg(
        long = "watch",
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    watch: bool,

    #[arg(
        long = "verbose",
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    verbose: bool,

    paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgs {
    pub paths: Vec<String>,
    pub config_path: Option<String>,
    pub root: Option<String>,
    pub packages: Vec<String>,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,

    pub write: bool,
    pub out_dir: Option<String>,
    pub source_map: bool,
    pub stdout: bool,
    pub explain: Option<String>,

    pub jobs: usize,
    pub condition_names: Vec<String>,
    pub main_fields: Vec<String>,

    pub watch: bool,
    pub verbose: bool,
}

impl ParsedArgs {
    /// True when the run only reports which files would change.
    pub fn is_dry_run(&self) -> bool {
        !self.write && self.out_dir.is_none() && !self.stdout
    }
}

pub const DEFAULT_CONDITION_NAMES: [&str; 4] = ["import", "module", "browser", "default"];
pub const DEFAULT_MAIN_FIELDS: [&str; 2] = ["module", "main"];

/// Parses configuration-derived tokens followed by the user's argv; argv
/// values win for single-valued flags and extend list flags.
pub fn derive_args(cfg_tokens: &[String], argv: &[String]) -> Result<ParsedArgs, clap::Error> {
    let mut clap_argv = vec!["debarrel".to_string()];
    clap_argv.extend(cfg_tokens.iter().cloned());
    clap_argv.extend(argv.iter().cloned());

    let parsed_cli = DebarrelCli::try_parse_from(&clap_argv)?;

    let condition_names = non_empty_or_default(parsed_cli.condition_names, &DEFAULT_CONDITION_NAMES);
    let main_fields = non_empty_or_default(parsed_cli.main_fields, &DEFAULT_MAIN_FIELDS);
    let jobs = parsed_cli
        .jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(default_jobs);

    Ok(ParsedArgs {
        paths: parsed_cli.paths,
        config_path: parsed_cli.config,
        root: parsed_cli.root,
        packages: dedupe_trimmed(parsed_cli.packages),
        include_globs: parsed_cli.include,
        exclude_globs: parsed_cli.exclude,
        write: parsed_cli.write,
        out_dir: parsed_cli.out_dir.filter(|dir| !dir.trim().is_empty()),
        source_map: parsed_cli.source_map,
        stdout: parsed_cli.stdout,
        explain: parsed_cli.explain,
        jobs,
        condition_names,
        main_fields,
        watch: parsed_cli.watch,
        verbose: parsed_cli.verbose,
    })
}

/// Renders a loaded configuration as leading flags for [`derive_args`].
pub fn config_tokens(cfg: &DebarrelConfig) -> Vec<String> {
    let mut tokens: Vec<String> = vec![];

    cfg.packages
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .for_each(|name| tokens.push(format!("--package={name}")));
    cfg.include
        .iter()
        .for_each(|glob| tokens.push(format!("--include={glob}")));
    cfg.exclude
        .iter()
        .for_each(|glob| tokens.push(format!("--exclude={glob}")));
    if let Some(enabled) = cfg.source_map {
        tokens.push(format!("--source-map={enabled}"));
    }
    if let Some(dir) = cfg
        .out_dir
        .as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        tokens.push(format!("--out-dir={dir}"));
    }
    cfg.condition_names
        .iter()
        .flatten()
        .for_each(|name| tokens.push(format!("--condition-name={name}")));
    cfg.main_fields
        .iter()
        .flatten()
        .for_each(|field| tokens.push(format!("--main-field={field}")));

    tokens
}

/// Finds `--root` (and `--config`) before the configuration is loaded.
pub fn prescan_flag(argv: &[String], flag: &str) -> Option<String> {
    let mut i = 0usize;
    while i < argv.len() {
        let tok = argv[i].as_str();
        if tok == "--" {
            return None;
        }
        if let Some((key, value)) = tok.split_once('=')
            && key == flag
        {
            return Some(value.to_string());
        }
        if tok == flag {
            return argv.get(i + 1).cloned();
        }
        i += 1;
    }
    None
}

fn non_empty_or_default(values: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        dedupe_trimmed(values)
    }
}

fn dedupe_trimmed(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .for_each(|value| {
            if !out.contains(&value) {
                out.push(value);
            }
        });
    out
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
