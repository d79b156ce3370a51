pub fn help_text() -> &'static str {
    r#"debarrel

Rewrites imports of barrel packages into direct imports of the modules that
define each binding.

Usage:
  debarrel [options] [paths...]

Flags:
  -h, --help                          Print help
  -V, --version                       Print version
  --config <file>                     Use this config file instead of discovery
  --root <dir>                        Project root (default: current directory)
  --package <name>                    Barrel package to rewrite (repeatable)
  --include <glob>                    Only transform files matching a glob (repeatable)
  --exclude <glob>                    Skip files matching a glob (repeatable)
  --write[=true|false]                Rewrite files in place
  --out-dir <dir>                     Mirror the transformed tree into <dir>
  --source-map[=true|false]           Emit source maps next to written files
  --stdout[=true|false]               Print rewritten code instead of writing
  --explain <package>                 Print a package's export map as JSON
  -j, --jobs <n>                      Files transformed concurrently
  --condition-name <name>             Package exports condition (repeatable)
  --main-field <field>                package.json main field (repeatable)
  --watch[=true|false]                Re-run when sources or barrel entries change
  --verbose[=true|false]              More diagnostics

Notes:
  Without --write, --out-dir or --stdout the run only lists files that would change.
  Config is read from debarrel.toml, debarrel.config.*, .debarrelrc* or the
  "debarrel" key of package.json. Flags extend or override it.
  DEBARREL_DEBUG=1 explains skipped packages and files; DEBARREL_PROFILE=1 times phases.
"#
}
