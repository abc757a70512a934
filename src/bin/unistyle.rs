//! Command-line front end for unistyle.
//!
//! Usage:
//!   unistyle [--input FILE] <COMMAND> [ARGS...]
//!
//! Reads text from stdin (or `--input`), writes the result to stdout.
//! Set `RUST_LOG=debug` to see which paste path was taken.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use unistyle::{
    apply_style, detect_style, normalize, transcode_html, transcode_markdown,
    transcode_pasted_content, Style,
};

const USAGE_EXIT: u8 = 2;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Apply(Style),
    Normalize,
    Markdown,
    Html,
    Paste {
        html: Option<PathBuf>,
        text: Option<PathBuf>,
    },
    Detect,
    Styles,
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Help,
    Run {
        command: Command,
        input: Option<PathBuf>,
    },
}

fn usage() {
    eprintln!("Usage: unistyle [--input FILE] <COMMAND> [ARGS...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  apply <STYLE>                    Restyle input text");
    eprintln!("  normalize                        Strip styling back to plain text");
    eprintln!("  markdown                         Convert Markdown emphasis");
    eprintln!("  html                             Convert an HTML fragment");
    eprintln!("  paste [--html FILE] [--text FILE]  Dispatch a clipboard pair");
    eprintln!("  detect                           Print the uniform style of the input");
    eprintln!("  styles                           List style names");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --input <FILE>                   Read input from FILE instead of stdin");
    eprintln!("  -h, --help                       Show this message");
}

fn usage_error(msg: &str) -> ExitCode {
    eprintln!("{msg}");
    usage();
    ExitCode::from(USAGE_EXIT)
}

fn read_input(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn read(path: Option<&PathBuf>) -> Result<String, String> {
    read_input(path).map_err(|e| match path {
        Some(p) => format!("read {}: {}", p.display(), e),
        None => format!("read stdin: {e}"),
    })
}

fn run(command: Command, input: Option<PathBuf>) -> Result<String, String> {
    let out = match command {
        Command::Apply(style) => apply_style(&read(input.as_ref())?, style),
        Command::Normalize => normalize(&read(input.as_ref())?),
        Command::Markdown => transcode_markdown(&read(input.as_ref())?),
        Command::Html => transcode_html(&read(input.as_ref())?).map_err(|e| e.to_string())?,
        Command::Paste { html, text } => {
            let html = match html {
                Some(path) => read(Some(&path))?,
                None => String::new(),
            };
            let plain = match plain_source(text, input, html.is_empty()) {
                PlainSource::File(path) => read(Some(&path))?,
                PlainSource::Input(path) => read(path.as_ref())?,
                PlainSource::Empty => String::new(),
            };
            transcode_pasted_content(&html, &plain)
        }
        Command::Detect => match detect_style(&read(input.as_ref())?) {
            Some(style) => format!("{style}\n"),
            None => "none\n".to_string(),
        },
        Command::Styles => {
            let mut names = String::new();
            for style in Style::ALL {
                names.push_str(style.name());
                names.push('\n');
            }
            names
        }
    };
    Ok(out)
}

/// Where `paste` reads its plain-text payload from.
#[derive(Debug, PartialEq, Eq)]
enum PlainSource {
    File(PathBuf),
    /// `--input`, or stdin when that is absent.
    Input(Option<PathBuf>),
    Empty,
}

/// `--text` wins. Without it the plain text comes from `--input`, or from
/// stdin when there is no HTML payload either.
fn plain_source(text: Option<PathBuf>, input: Option<PathBuf>, html_empty: bool) -> PlainSource {
    match text {
        Some(path) => PlainSource::File(path),
        None if input.is_some() || html_empty => PlainSource::Input(input),
        None => PlainSource::Empty,
    }
}

fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let mut input: Option<PathBuf> = None;
    let mut html: Option<PathBuf> = None;
    let mut text: Option<PathBuf> = None;
    let mut positional: Vec<&str> = Vec::with_capacity(2);
    let mut i = 0;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--input" | "--html" | "--text" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err(format!("{flag} expects a file path"));
                };
                let slot = match flag {
                    "--input" => &mut input,
                    "--html" => &mut html,
                    _ => &mut text,
                };
                *slot = Some(PathBuf::from(value));
            }
            "--help" | "-h" => return Ok(Invocation::Help),
            other => positional.push(other),
        }
        i += 1;
    }

    let Some((&name, rest)) = positional.split_first() else {
        return Err("Missing command".to_string());
    };
    let command = match (name, rest) {
        ("apply", [style]) => Command::Apply(style.parse::<Style>().map_err(|e| e.to_string())?),
        ("apply", _) => return Err("apply expects exactly one style name".to_string()),
        ("normalize", []) => Command::Normalize,
        ("markdown", []) => Command::Markdown,
        ("html", []) => Command::Html,
        ("paste", []) => Command::Paste {
            html: html.take(),
            text: text.take(),
        },
        ("detect", []) => Command::Detect,
        ("styles", []) => Command::Styles,
        (other, []) => return Err(format!("Unknown command: {other}")),
        (other, _) => return Err(format!("Unexpected arguments for {other}")),
    };
    if html.is_some() || text.is_some() {
        return Err("--html and --text only apply to paste".to_string());
    }
    Ok(Invocation::Run { command, input })
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, input) = match parse_args(&args) {
        Ok(Invocation::Help) => {
            usage();
            return ExitCode::SUCCESS;
        }
        Ok(Invocation::Run { command, input }) => (command, input),
        Err(msg) => return usage_error(&msg),
    };

    match run(command, input) {
        Ok(out) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(out.as_bytes()).and_then(|_| stdout.flush()) {
                eprintln!("write stdout: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(msg) => {
            eprintln!("unistyle: {msg}");
            ExitCode::FAILURE
        }
    }
}
