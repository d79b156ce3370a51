fn main() {
    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    if argv.iter().any(|t| t == "--help" || t == "-h") {
        println!("{}", debarrel::help::help_text());
        return;
    }
    if argv.iter().any(|t| t == "--version" || t == "-V") {
        println!("debarrel {}", env!("CARGO_PKG_VERSION"));
        return;
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let code = debarrel::run::run_cli(&cwd, &argv);
    std::process::exit(code);
}
