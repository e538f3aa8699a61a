use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use corvid::config::{ConfigError, VmConfig};
use corvid::diagnostic::{Diagnostic, ansi::AnsiRenderer, json, registry};
use corvid::{LoadError, Vm, lexer, parser};

#[derive(Parser)]
#[command(name = "corvid", version, about = "Run corvid scripts on the tagged-value stack VM")]
struct Cli {
    /// Script to run; reads standard input when neither a file nor -e is given
    file: Option<PathBuf>,

    /// Run this source text instead of a file
    #[arg(short = 'e', long = "eval", value_name = "SOURCE", conflicts_with = "file")]
    eval: Option<String>,

    /// Print an intermediate form instead of running
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Report errors as JSON
    #[arg(long)]
    json: bool,

    /// Explain an error code, e.g. CVD-V001
    #[arg(long, value_name = "CODE")]
    explain: Option<String>,

    /// JSON config file with stack_slots, heap_bytes and startup
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Operand stack capacity in slots
    #[arg(long)]
    stack_slots: Option<usize>,

    /// Heap size in bytes
    #[arg(long)]
    heap_bytes: Option<usize>,

    /// Skip the built-in startup script
    #[arg(long)]
    no_startup: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Emit {
    Ast,
    Ir,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

struct Reporter {
    json: bool,
    source: Option<String>,
}

impl Reporter {
    fn report(&self, d: Diagnostic) -> ExitCode {
        let d = match &self.source {
            Some(src) if d.label.is_some() && d.source.is_none() => d.with_source(src.clone()),
            _ => d,
        };
        if self.json {
            eprintln!("{}", json::render(&d));
        } else {
            let r = AnsiRenderer { use_color: std::io::stderr().is_terminal() };
            eprint!("{}", r.render(&d));
        }
        ExitCode::FAILURE
    }
}

fn resolve_config(cli: &Cli) -> Result<VmConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => VmConfig::from_file(path)?,
        None => VmConfig::default(),
    };
    if let Some(n) = cli.stack_slots {
        config.stack_slots = n;
    }
    if let Some(n) = cli.heap_bytes {
        config.heap_bytes = n;
    }
    if cli.no_startup {
        config.startup = false;
    }
    Ok(config)
}

fn read_source(cli: &Cli) -> Result<(String, String), LoadError> {
    if let Some(src) = &cli.eval {
        return Ok((src.clone(), "<eval>".to_string()));
    }
    match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .map(|s| (s, path.display().to_string()))
            .map_err(|source| LoadError::Io { path: path.display().to_string(), source }),
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .map_err(|source| LoadError::Io { path: "<stdin>".to_string(), source })?;
            Ok((s, "<stdin>".to_string()))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    let mut reporter = Reporter { json: cli.json, source: None };

    if let Some(code) = &cli.explain {
        return match registry::lookup(code) {
            Some(entry) => {
                print!("{}", entry.long);
                ExitCode::SUCCESS
            }
            None => reporter.report(
                Diagnostic::error(format!("unknown error code '{code}'"))
                    .with_suggestion("codes look like CVD-V001, CVD-P002 or CVD-L001"),
            ),
        };
    }

    let config = match resolve_config(&cli) {
        Ok(c) => c,
        Err(e) => return reporter.report((&e).into()),
    };
    let (source, name) = match read_source(&cli) {
        Ok(s) => s,
        Err(e) => return reporter.report((&e).into()),
    };
    reporter.source = Some(source.clone());

    if let Some(Emit::Ast) = cli.emit {
        let tokens = match lexer::lex(&source) {
            Ok(t) => t,
            Err(e) => return reporter.report((&e).into()),
        };
        let (program, errors) = parser::parse_all(tokens);
        if let Some(first) = errors.first() {
            for e in &errors[1..] {
                reporter.report(e.into());
            }
            return reporter.report(first.into());
        }
        return match serde_json::to_string_pretty(&program) {
            Ok(out) => {
                println!("{out}");
                ExitCode::SUCCESS
            }
            Err(e) => reporter.report(Diagnostic::error(format!("cannot serialize AST: {e}"))),
        };
    }

    let mut vm = match Vm::new(&config) {
        Ok(vm) => vm,
        Err(e) => return reporter.report((&e).into()),
    };

    let first_new = vm.functions().len();
    let unit = match vm.compile(&source, &name) {
        Ok(id) => id,
        Err(e) => return reporter.report((&e).into()),
    };

    if let Some(Emit::Ir) = cli.emit {
        for fun in &vm.functions()[first_new..] {
            print!("{fun}");
        }
        return ExitCode::SUCCESS;
    }

    let result = match vm.exec(unit) {
        Ok(v) => v,
        Err(e) => return reporter.report((&e).into()),
    };
    if !result.is_undef() {
        match vm.render(result) {
            Ok(text) => println!("{text}"),
            Err(e) => return reporter.report((&e).into()),
        }
    }
    ExitCode::SUCCESS
}
