use std::fs;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::data::{load_dataset, Dataset};
use crate::plot::svg::{render_svg, DEFAULT_WIDTH};
use crate::plot::build_plot;
use crate::selection::on_select;
use crate::server;

const USAGE: &str = "usage: co2-explorer <serve|plot|show|summary>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Plot,
    Show,
    Summary,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("plot") => Some(Command::Plot),
        Some("show") => Some(Command::Show),
        Some("summary") => Some(Command::Summary),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    match parse_command(args) {
        Some(Command::Serve) => handle_serve(config),
        Some(Command::Plot) => handle_plot(args, &config),
        Some(Command::Show) => handle_show(args, &config),
        Some(Command::Summary) => handle_summary(args, &config),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_serve(config: AppConfig) -> i32 {
    match server::run_server(config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

/// Load `path` (or the configured file), printing the user-facing error on failure.
fn load_or_report(path: Option<&String>, config: &AppConfig) -> Option<Dataset> {
    let path = path.map(PathBuf::from).unwrap_or_else(|| config.data_path.clone());
    match load_dataset(&path) {
        Ok(dataset) => Some(dataset),
        Err(err) => {
            eprintln!("{}", err.user_message());
            None
        }
    }
}

/// Positional arguments after the subcommand, with `--flag value` pairs removed.
fn positionals(args: &[String]) -> Vec<&String> {
    let mut out = Vec::new();
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            out.push(arg);
        }
    }
    out
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
}

fn handle_plot(args: &[String], config: &AppConfig) -> i32 {
    let positional = positionals(args);
    let Some(dataset) = load_or_report(positional.first().copied(), config) else {
        return 1;
    };
    let spec = build_plot(&dataset);

    if args.iter().any(|arg| arg == "--svg") {
        let Some(out) = flag_value(args, "--svg") else {
            eprintln!("usage: co2-explorer plot [path] [--svg <out.svg>]");
            return 2;
        };
        let svg = match render_svg(&spec, DEFAULT_WIDTH, spec.height) {
            Ok(svg) => svg,
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        };
        if let Err(err) = fs::write(out, svg) {
            eprintln!("failed to write {out}: {err}");
            return 1;
        }
        println!("wrote {} point(s) to {out}", spec.points.len());
        return 0;
    }

    match serde_json::to_string_pretty(&spec) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize plot: {err}");
            1
        }
    }
}

fn handle_show(args: &[String], config: &AppConfig) -> i32 {
    let positional = positionals(args);
    let Some(raw) = positional.first() else {
        eprintln!("usage: co2-explorer show <position> [path]");
        return 2;
    };
    let Ok(position) = raw.parse::<usize>() else {
        eprintln!("invalid position '{raw}'");
        return 2;
    };
    let Some(dataset) = load_or_report(positional.get(1).copied(), config) else {
        return 1;
    };

    match on_select(&dataset, position) {
        Ok(payload) => {
            print!("{}", payload.to_markdown());
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn handle_summary(args: &[String], config: &AppConfig) -> i32 {
    let positional = positionals(args);
    let Some(dataset) = load_or_report(positional.first().copied(), config) else {
        return 1;
    };

    println!("source\t{}", dataset.source().display());
    println!("records\t{}", dataset.len());
    if let Some((lo, hi)) = dataset.capacity_range() {
        println!("capacity\t{lo}..{hi}");
    }
    println!("columns\t{}", dataset.columns().join(","));
    0
}
