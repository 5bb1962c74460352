//! bitscript calistirici: dosya veya tek satirlik REPL.
//!
//! Kullanim:
//!   cargo run -- <dosya.cfs>
//!   cargo run --              # REPL (tek satir)

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};

use bitscript::Environment;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    if let Some(path) = args.next() {
        let source = fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("cannot read {}: {}", path, e);
            std::process::exit(1);
        });

        let mut environment = Environment::new();
        run(&mut environment, "main", &source);
        return;
    }

    println!("[ repl mode on ]\nfor quitting repl mode use \";q\" command");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut environment = Environment::new();
    let mut line_number = 0u32;

    loop {
        print!("> ");
        let _ = stdout.flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim_end();

        if line.is_empty() {
            continue;
        } else if line.starts_with(";q") {
            println!("quitting repl mode");
            break;
        }
        line_number += 1;
        run(&mut environment, &format!("repl-{}", line_number), line);
    }
}

fn run(environment: &mut Environment, name: &str, source: &str) {
    if environment.load(name, source).is_err() {
        if let Some(message) = environment.error_message() {
            eprintln!("{}", message);
        }
    }
}
