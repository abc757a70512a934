//! DHAT heap profiler for unistyle.
//!
//! Profiles allocation patterns of the paste pipeline:
//! detect -> html | markdown -> normalize.
//!
//! Usage:
//!   cargo run -p unistyle-heap-profile --release -- [OPTIONS] [FIXTURES...]
//!
//! Outputs dhat-<phase>.json files in the output directory (default: target/memory).
//! Open in https://nnethercote.github.io/dh_view/dh_view.html

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::{Path, PathBuf};
use std::process::Command;

use unistyle::{
    normalize, style_tables, transcode_html, transcode_markdown, transcode_pasted_content,
};

const DEFAULT_FIXTURES: &[&str] = &[
    "tests/fixtures/google-docs.html",
    "tests/fixtures/word.html",
    "tests/fixtures/chatgpt.md",
];

/// Inputs are repeated so steady-state buffers dominate the profile.
const REPEAT: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Markdown,
    Html,
    Paste,
    Normalize,
}

impl Phase {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "markdown" | "md" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            "paste" => Some(Self::Paste),
            "normalize" => Some(Self::Normalize),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Paste => "paste",
            Self::Normalize => "normalize",
        }
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn profile_file(path: &Path, phase: Phase) {
    let path_str = path.to_string_lossy();
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {}", path_str, e))
        .repeat(REPEAT);
    let html_input = is_html(path);

    match phase {
        Phase::Markdown => {
            let _out = transcode_markdown(&content);
        }
        Phase::Html => {
            if !html_input {
                eprintln!("    skipping {}: not an html fixture", path_str);
                return;
            }
            let _out = transcode_html(&content)
                .unwrap_or_else(|e| panic!("transcode {}: {}", path_str, e));
        }
        Phase::Paste => {
            let _out = if html_input {
                transcode_pasted_content(&content, "")
            } else {
                transcode_pasted_content("", &content)
            };
        }
        Phase::Normalize => {
            let styled = if html_input {
                transcode_pasted_content(&content, "")
            } else {
                transcode_markdown(&content)
            };
            for _ in 0..4 {
                let _plain = normalize(&styled);
            }
        }
    }
}

/// Extract a short name from a file path for use in output filenames.
fn short_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn usage() {
    eprintln!("Usage: heap-profile [OPTIONS] [FIXTURES...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!(
        "  --phase <markdown|html|paste|normalize>  Pipeline phase to profile (default: paste)"
    );
    eprintln!("  --out-dir <DIR>                      Output directory for dhat JSON (default: target/memory)");
    eprintln!(
        "  --aggregate                          Single profile for all files (default: per-file)"
    );
    eprintln!();
    eprintln!("By default, each fixture gets its own clean DHAT profile (separate process).");
    eprintln!("If no fixtures are given, profiles the clipboard fixtures under tests/fixtures.");
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut phase = Phase::Paste;
    let mut out_dir = PathBuf::from("target/memory");
    let mut files: Vec<PathBuf> = Vec::with_capacity(4);
    let mut aggregate = false;
    // Internal flag: set in the child process that profiles one file.
    let mut single_file_mode = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--phase" => {
                i += 1;
                phase = args
                    .get(i)
                    .and_then(|s| Phase::from_str(s))
                    .unwrap_or_else(|| {
                        eprintln!("Unknown phase: {}", args.get(i).map_or("", String::as_str));
                        usage();
                        std::process::exit(1);
                    });
            }
            "--out-dir" => {
                i += 1;
                let Some(dir) = args.get(i) else {
                    usage();
                    std::process::exit(1);
                };
                out_dir = PathBuf::from(dir);
            }
            "--aggregate" => aggregate = true,
            "--single-file" => single_file_mode = true,
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => files.push(PathBuf::from(other)),
        }
        i += 1;
    }

    if files.is_empty() {
        files.extend(
            DEFAULT_FIXTURES
                .iter()
                .map(PathBuf::from)
                .filter(|p| p.exists()),
        );
    }

    if files.is_empty() {
        eprintln!("No fixtures found. Provide paths or run from the repository root.");
        std::process::exit(1);
    }

    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir {}: {}", out_dir.display(), e);
        std::process::exit(1);
    });

    // Keep the lazy table build out of every profile.
    let _ = style_tables();
    let phase_name = phase.name();

    if single_file_mode {
        assert!(files.len() == 1, "--single-file expects exactly one file");
        let file = &files[0];
        let name = short_name(file);
        let json_path = out_dir.join(format!("dhat-{phase_name}-{name}.json"));

        let _profiler = dhat::Profiler::builder().file_name(json_path).build();
        profile_file(file, phase);
        return;
    }

    if aggregate {
        let json_path = out_dir.join(format!("dhat-{phase_name}.json"));
        eprintln!(
            "heap-profile: phase={}, files={} (aggregate), out={}",
            phase_name,
            files.len(),
            out_dir.display()
        );

        let _profiler = dhat::Profiler::builder()
            .file_name(json_path.clone())
            .build();
        for file in &files {
            eprintln!("  profiling: {}", file.display());
            profile_file(file, phase);
        }
        eprintln!(
            "Done. Open {} in https://nnethercote.github.io/dh_view/dh_view.html",
            json_path.display()
        );
        return;
    }

    let self_exe = std::env::current_exe().unwrap_or_else(|e| {
        eprintln!("Failed to determine own executable path: {}", e);
        std::process::exit(1);
    });

    eprintln!(
        "heap-profile: phase={}, files={} (per-file), out={}",
        phase_name,
        files.len(),
        out_dir.display()
    );

    let mut any_failed = false;
    for file in &files {
        let name = short_name(file);
        eprintln!(
            "  profiling: {} -> dhat-{}-{}.json",
            file.display(),
            phase_name,
            name
        );

        let status = Command::new(&self_exe)
            .arg("--single-file")
            .arg("--phase")
            .arg(phase_name)
            .arg("--out-dir")
            .arg(&out_dir)
            .arg(file)
            .status();

        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                eprintln!("    FAILED (exit {})", s.code().unwrap_or(-1));
                any_failed = true;
            }
            Err(e) => {
                eprintln!("    FAILED to spawn: {}", e);
                any_failed = true;
            }
        }
    }

    eprintln!();
    eprintln!("Profiles saved to {}:", out_dir.display());
    for file in &files {
        let json_path = out_dir.join(format!("dhat-{phase_name}-{}.json", short_name(file)));
        if json_path.exists() {
            eprintln!("  {}", json_path.display());
        }
    }

    if any_failed {
        std::process::exit(1);
    }
}
