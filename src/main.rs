use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::PathBuf;
use std::process;

use glox as lox;

use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lox::interpreter::Interpreter;

const EX_USAGE: i32 = 64;
const EX_DATA_ERR: i32 = 65;
const EX_SW_ERR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "A tree-walking interpreter for the Lox language", long_about = None)]
pub struct Cli {
    /// Script to execute; starts the interactive prompt when omitted
    script: Vec<PathBuf>,

    /// Parse only and dump the AST
    #[arg(long)]
    parse_only: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::parse();

    match args.script.len() {
        0 => run_prompt(args.parse_only)?,

        1 => run_file(&args.script[0], args.parse_only)?,

        _ => {
            println!("Usage: glox [--parse-only] [script]");
            process::exit(EX_USAGE);
        }
    }

    Ok(())
}

/// Runs the interpreter on a script file, then exits with the phase that
/// failed: 65 for compile errors, 70 for runtime errors.
fn run_file(filename: &PathBuf, parse_only: bool) -> anyhow::Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    let mut reader: BufReader<File> = match File::open(filename) {
        Ok(file) => BufReader::new(file),
        Err(_) => {
            println!("unable to read {}", filename.display());
            process::exit(EX_DATA_ERR);
        }
    };
    reader.read_to_end(&mut buf)?;

    let source = String::from_utf8(buf)?;

    let mut interpreter = Interpreter::new();
    if parse_only {
        interpreter.run_parse_only(&source);
    } else {
        interpreter.run(&source);
    }

    if interpreter.had_compile_error() {
        process::exit(EX_DATA_ERR);
    }
    if interpreter.had_runtime_error() {
        process::exit(EX_SW_ERR);
    }

    Ok(())
}

/// Runs the interpreter interactively, one line per statement.  Globals
/// persist across lines; error flags reset with every new line.
fn run_prompt(parse_only: bool) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;

    let mut interpreter = Interpreter::new();
    interpreter.set_repl(true);

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let _ = editor.add_history_entry(line.as_str());

                if parse_only {
                    interpreter.run_parse_only(&line);
                } else {
                    interpreter.run(&line);
                }
            }

            Err(ReadlineError::Interrupted) => {
                continue;
            }

            Err(ReadlineError::Eof) => {
                println!();
                break;
            }

            Err(err) => {
                eprintln!("error while reading {:?}", err);
                process::exit(EX_DATA_ERR);
            }
        }
    }

    Ok(())
}
