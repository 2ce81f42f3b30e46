//! Print the tokens of a source file, one per line:
//!
//! ```ignore
//! linelex -f input.src
//! Type=2, Value=hello
//! Type=2, Value=world
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` (e.g. `RUST_LOG=linelex=debug`) to see them.

use std::error::Error;
use std::ffi::OsString;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use linelex::{write_tokens, Lexer};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "linelex")]
#[command(about = "Split a source file into whitespace-delimited tokens")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// Source file to tokenize
    #[arg(short = 'f', value_name = "PATH", allow_hyphen_values = true)]
    file: PathBuf,
}

/// Parse a command line of exactly `<program> -f <PATH>`.
///
/// The flag and the path must be separate arguments; `-fPATH` and `-f=PATH`
/// are usage errors.
fn parse_args<I, T>(argv: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    if argv.len() != 3 {
        return Err(Args::command().error(
            ErrorKind::WrongNumberOfValues,
            format!("expected `-f <PATH>`, got {} arguments", argv.len().saturating_sub(1)),
        ));
    }
    Args::try_parse_from(argv)
}

fn main() -> ExitCode {
    // Usage errors exit here, before anything touches the filesystem.
    let args = parse_args(std::env::args_os()).unwrap_or_else(|err| err.exit());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut lexer = Lexer::open(&args.file)?;
    let result = lexer.tokenize();

    // Whatever was read before a failure still gets printed.
    let mut stdout = BufWriter::new(std::io::stdout().lock());
    write_tokens(&lexer, &mut stdout)?;
    stdout.flush()?;

    result?;
    Ok(())
}
