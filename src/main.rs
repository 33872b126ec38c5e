//! Atom CLI and REPL
//!
//! Usage:
//!   atom run <file.atom> [--ast] [--trace]   - Execute an Atom file
//!   atom repl [--trace]                      - Start interactive REPL
//!   atom help                                - Show help message
//!
//! Log output is filtered by the `ATOM_LOG` environment variable.

use std::env;
use std::fs;
use std::process;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use atom::diagnostic::StderrReporter;
use atom::{evaluate, Collector, Environment, Value, VERSION};

/// Options shared by every command
#[derive(Debug, Default)]
struct Options {
    print_ast: bool,
    trace: bool,
}

fn main() {
    let mut options = Options::default();
    let mut args = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--ast" => options.print_ast = true,
            "--trace" => options.trace = true,
            _ => args.push(arg),
        }
    }

    init_logging(&options);

    let Some(command) = args.first() else {
        print_help();
        return;
    };

    match command.as_str() {
        "run" => {
            let Some(path) = args.get(1) else {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: atom run <file.atom>");
                process::exit(1);
            };
            run_file(path, &options);
        }
        "repl" => run_repl(&options),
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => println!("Atom {}", VERSION),
        other if other.ends_with(".atom") => run_file(other, &options),
        other => {
            eprintln!("{}: unknown command '{}'", "error".red(), other);
            print_help();
            process::exit(1);
        }
    }
}

fn init_logging(options: &Options) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::new().filter_or("ATOM_LOG", "warn"));
    if options.trace {
        builder.filter_module("atom", log::LevelFilter::Trace);
    }
    builder.format_timestamp(None).init();
}

fn print_help() {
    println!("{}", "Atom".cyan().bold());
    println!("A small lexically-scoped scripting language");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  atom run <file.atom>     Execute an Atom file");
    println!("  atom repl                Start interactive REPL");
    println!("  atom help                Show this help message");
    println!("  atom version             Show version\n");
    println!("{}", "FLAGS:".yellow());
    println!("  --ast                    Print the parsed program before running it");
    println!("  --trace                  Log the result of every statement\n");
    println!("{}", "LANGUAGE FEATURES:".yellow());
    println!("  let x = 10               Mutable binding");
    println!("  const y = 0              Locked binding");
    println!("  let p = {{ a: 1, b: 2 }}   Object literal");
    println!("  p.a = 3; p[1]            Named and positional property access");
}

fn run_file(path: &str, options: &Options) {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            process::exit(1);
        }
    };

    let program = match atom::parse(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e.with_source(&source));
            process::exit(1);
        }
    };

    if options.print_ast {
        println!("{:#?}", program);
    }

    let reporter = StderrReporter::new(source.as_str());
    let value = {
        let env = Environment::new(&reporter);
        evaluate(&program, &env)
    };

    if !value.is_null() {
        println!("{} {}", "=>".dimmed(), format!("{}", value).cyan());
    }
    if reporter.reported() > 0 {
        process::exit(1);
    }
}

fn run_repl(options: &Options) {
    println!("{} {} - {}",
        "Atom".cyan().bold(),
        VERSION.cyan(),
        "lexically-scoped scripting".dimmed()
    );
    println!("Type {} to exit, {} for help\n",
        "exit".yellow(),
        "help".yellow()
    );

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("{}: cannot start REPL: {}", "error".red(), e);
            process::exit(1);
        }
    };

    // Declarations persist across lines
    let collector = Collector::new();
    let mut env = Environment::new(&collector);

    loop {
        match rl.readline(&format!("{} ", "atom>".green().bold())) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" => {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }
                    "help" => {
                        print_repl_help();
                        continue;
                    }
                    "clear" => {
                        env = Environment::new(&collector);
                        println!("{}", "Scope cleared.".dimmed());
                        continue;
                    }
                    "vars" => {
                        for name in env.names() {
                            let marker = if env.is_locked(&name) { "const" } else { "let" };
                            println!("  {} {}", marker.dimmed(), name);
                        }
                        continue;
                    }
                    _ => {}
                }

                let program = match atom::parse(line) {
                    Ok(p) => p,
                    Err(e) => {
                        eprintln!("{}", format!("{}", e.with_source(line)).red());
                        continue;
                    }
                };

                if options.print_ast {
                    println!("{:#?}", program);
                }

                let value = evaluate(&program, &env);
                let diagnostics = collector.drain();
                for diagnostic in &diagnostics {
                    eprintln!("{}", diagnostic.render(line).red());
                }

                if diagnostics.is_empty() && !matches!(value, Value::Null) {
                    println!("{} {}", "=>".dimmed(), format!("{}", value).cyan());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  exit, quit   Exit the REPL");
    println!("  clear        Start over with an empty scope");
    println!("  vars         List declared variables");
    println!("  help         Show this help\n");
    println!("{}", "Language Examples:".yellow());
    println!("  let x = 10");
    println!("  const limit = 3");
    println!("  x = x + limit");
    println!("  let p = {{ name: \"atom\", size: 1 }}");
    println!("  p.size = 2; p[0]");
}
