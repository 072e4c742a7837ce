use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rlox as lox;

use lox::ast_printer::AstPrinter;
use lox::error::LoxError;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);

    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rlox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rlox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

/// Scan the whole buffer, printing any lexical diagnostics to stderr.
/// Returns the tokens plus whether the scan was clean.
fn scan_all<'a>(buf: &'a [u8]) -> (Vec<Token<'a>>, bool) {
    let mut tokens = Vec::new();
    let mut clean = true;

    for token in Scanner::new(buf) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                tokens.push(token);
            }

            Err(e) => {
                clean = false;

                debug!("Tokenization debug: {}", e);

                eprintln!("{}", e);
            }
        }
    }

    (tokens, clean)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");

                let buf = read_file(filename)?;
                let mut tokenized = true;

                for token in Scanner::new(&buf) {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            println!("{}", token);
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization debug: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");

                let buf = read_file(filename)?;
                let (tokens, clean) = scan_all(&buf);

                if !clean {
                    std::process::exit(65);
                }

                let mut parser = Parser::new(&tokens);

                match parser.parse_expression() {
                    Ok(expr) => {
                        let ast_str = AstPrinter::print(&expr);

                        debug!("AST: {}", ast_str);
                        println!("{}", ast_str);
                    }

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");

                let buf = read_file(filename)?;
                let (tokens, clean) = scan_all(&buf);

                if !clean {
                    std::process::exit(65);
                }

                let mut parser = Parser::new(&tokens);

                let expr = match parser.parse_expression() {
                    Ok(expr) => expr,

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                let mut interpreter = Interpreter::new();

                match interpreter.evaluate(&expr) {
                    Ok(value) => {
                        debug!("Evaluated to: {}", value);
                        println!("{}", value);
                    }

                    Err(unwind) => {
                        let e = LoxError::from(unwind);

                        debug!("Evaluation debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }

                info!("Evaluate subcommand completed");
            }

            None => {
                info!("No filepath provided for Evaluate");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");

                let buf = read_file(filename)?;
                let (tokens, scan_clean) = scan_all(&buf);

                let mut parser = Parser::new(&tokens);
                let (statements, parse_errors) = parser.parse();

                for e in &parse_errors {
                    debug!("Parse debug: {}", e);

                    eprintln!("{}", e);
                }

                if !scan_clean || !parse_errors.is_empty() {
                    std::process::exit(65);
                }

                info!("Parsed {} statements", statements.len());

                let mut interpreter = Interpreter::new();

                if let Err(e) = Resolver::new(&mut interpreter).resolve(&statements) {
                    debug!("Resolve debug: {}", e);

                    eprintln!("{}", e);
                    std::process::exit(65);
                }

                match interpreter.interpret(&statements) {
                    Ok(()) => {
                        info!("Program executed successfully");
                    }

                    Err(e) => {
                        debug!("Runtime debug: {}", e);

                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },
    }

    Ok(())
}
