use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::report::{Reporter, StderrReporter};
use rox::scanner::Scanner;
use rox::{Lox, RunStatus};

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints its syntax tree
    Parse {
        filename: PathBuf,

        /// Print the tree as JSON instead of s-expressions
        #[arg(long)]
        json: bool,
    },

    /// Runs a file, or starts a REPL when no file is given
    Run { filename: Option<PathBuf> },
}

fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // RUST_LOG overrides below
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let (tokens, errors) = Scanner::new(&source).scan_tokens();

    let mut reporter = StderrReporter;
    for e in &errors {
        reporter.report(e);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    Ok(if errors.is_empty() { 0 } else { 65 })
}

fn parse(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let (tokens, scan_errors) = Scanner::new(&source).scan_tokens();

    let mut parser = Parser::new(tokens);
    let statements = parser.parse();

    let mut reporter = StderrReporter;
    for e in scan_errors.iter().chain(parser.errors()) {
        reporter.report(e);
    }

    if !scan_errors.is_empty() || parser.had_error() {
        return Ok(65);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        println!("{}", AstPrinter::print_program(&statements));
    }

    Ok(0)
}

fn run_file(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    debug!("Provided input:\n{}", source);

    let status = Lox::new().run(&source);
    info!("Run finished with {:?}", status);

    Ok(status.exit_code())
}

fn run_prompt() -> Result<i32> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        line.clear();
        if stdin.lock().read_line(&mut line).context("Failed to read line")? == 0 {
            println!();
            break;
        }

        // Errors were already reported; the prompt keeps going.
        if lox.run(&line) != RunStatus::Success {
            debug!("REPL line failed: {:?}", line.trim_end());
        }
    }

    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json)?,
        Commands::Parse { filename, json } => parse(filename, *json)?,
        Commands::Run {
            filename: Some(filename),
        } => run_file(filename)?,
        Commands::Run { filename: None } => run_prompt()?,
    };

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
