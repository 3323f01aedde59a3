use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;
use std::sync::Once;

use anyhow::Context;

use treelox::ast_printer::stmt_to_string;
use treelox::{Lox, LoxError};

const EXIT_USAGE: i32 = 64;
const EXIT_STATIC_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;
const EXIT_IO_ERROR: i32 = 74;

static TRACING_INIT: Once = Once::new();

/// Logs go to stderr, and only when `RUST_LOG` is set (e.g. `RUST_LOG=treelox=trace`).
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    let print_ast = args.iter().any(|arg| arg == "--ast");
    let scripts: Vec<&String> = args.iter().filter(|arg| *arg != "--ast").collect();

    let code = match scripts.as_slice() {
        [] => run_prompt(print_ast),
        [path] => run_file(path, print_ast),
        _ => {
            eprintln!("Usage: treelox [--ast] [script]");
            Ok(EXIT_USAGE)
        }
    };
    match code {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            process::exit(EXIT_IO_ERROR);
        }
    }
}

fn run_file(path: &str, print_ast: bool) -> anyhow::Result<i32> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    let mut lox = Lox::new();
    let result = if print_ast {
        show_ast(&source)
    } else {
        lox.run(&source)
    };
    Ok(match result {
        Ok(()) => 0,
        Err(err) => report(&err),
    })
}

fn run_prompt(print_ast: bool) -> anyhow::Result<i32> {
    println!("Lox tree-walk interpreter");
    let stdin = io::stdin();
    let mut lox = Lox::new();
    lox.set_echo_expressions(true);
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().context("failed to flush stdout")?;
        line.clear();
        if stdin.read_line(&mut line).context("failed to read stdin")? == 0 {
            println!();
            break;
        }
        let result = if print_ast {
            show_ast(&line)
        } else {
            lox.run(&line)
        };
        if let Err(err) = result {
            report(&err);
        }
    }
    Ok(0)
}

fn show_ast(source: &str) -> Result<(), LoxError> {
    for stmt in Lox::parse(source).map_err(LoxError::Static)? {
        println!("{}", stmt_to_string(&stmt));
    }
    Ok(())
}

/// Prints the diagnostics of a failed run and picks the matching exit code.
fn report(err: &LoxError) -> i32 {
    eprintln!("{}", err);
    match err {
        LoxError::Static(_) => EXIT_STATIC_ERROR,
        LoxError::Runtime(_) => EXIT_RUNTIME_ERROR,
    }
}
