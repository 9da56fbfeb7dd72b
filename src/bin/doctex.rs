//! Doctex CLI - serialize JSON document bundles to LaTeX

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};

#[cfg(feature = "cli")]
use doctex::{
    doc::{Document, DocumentGraph},
    format_diagnostics, render_document, route_log, RenderOptions, RenderOutput,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "doctex")]
#[command(version)]
#[command(about = "Doctex - document tree to LaTeX serializer", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input document JSON (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Preview mode: substitute placeholders for uncodable characters
    #[arg(long)]
    dry_run: bool,

    /// Write the row map JSON to this path
    #[arg(long)]
    rowmap_log: Option<String>,

    /// Print the preamble requirements of the generated body
    #[arg(long)]
    hints: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Serialize a document bundle (default action)
    Convert {
        /// Input document JSON
        input: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: Option<String>,

        /// Preview mode
        #[arg(long)]
        dry_run: bool,

        /// Write the row map JSON to this path
        #[arg(long)]
        rowmap_log: Option<String>,

        /// Print the preamble requirements of the generated body
        #[arg(long)]
        hints: bool,
    },

    /// Route a LaTeX compiler log back to document positions
    Route {
        /// Input document JSON
        input: Option<String>,

        /// The LaTeX log file to route
        #[arg(short, long)]
        log: String,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output(path: Option<&str>, content: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, content),
        None => {
            io::stdout().write_all(content.as_bytes())?;
            Ok(())
        }
    }
}

/// Accept either a whole bundle or a bare document.
#[cfg(feature = "cli")]
fn load_graph(input: &str) -> Result<DocumentGraph, String> {
    if let Ok(graph) = serde_json::from_str::<DocumentGraph>(input) {
        return Ok(graph);
    }
    serde_json::from_str::<Document>(input)
        .map(|document| DocumentGraph::single("main", document))
        .map_err(|err| format!("input is neither a document bundle nor a document: {}", err))
}

#[cfg(feature = "cli")]
fn render(input: Option<&str>, dry_run: bool) -> Result<RenderOutput, String> {
    let content = read_input(input).map_err(|err| err.to_string())?;
    let graph = load_graph(&content)?;
    let options = if dry_run {
        RenderOptions::preview()
    } else {
        RenderOptions::default()
    };
    render_document(&graph, &options).map_err(|err| err.to_string())
}

#[cfg(feature = "cli")]
fn run_convert(
    input: Option<&str>,
    output: Option<&str>,
    dry_run: bool,
    rowmap_log: Option<&str>,
    hints: bool,
) -> Result<(), String> {
    let result = render(input, dry_run)?;
    write_output(output, &result.content).map_err(|err| err.to_string())?;
    if let Some(path) = rowmap_log {
        let json =
            serde_json::to_string_pretty(&result.rows).map_err(|err| err.to_string())?;
        fs::write(path, json).map_err(|err| err.to_string())?;
    }
    if hints {
        for line in result.hints.usepackage_lines() {
            eprintln!("{}", line);
        }
    }
    for warning in &result.warnings {
        eprintln!("{}", warning);
    }
    for uncodable in &result.uncodable {
        eprintln!("uncodable character: {}", uncodable);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn run_route(input: Option<&str>, log_path: &str, color: bool) -> Result<(), String> {
    let result = render(input, false)?;
    let log = fs::read_to_string(log_path).map_err(|err| err.to_string())?;
    let diagnostics = route_log(&log, &result.rows);
    print!("{}", format_diagnostics(&diagnostics, color));
    Ok(())
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            dry_run,
            rowmap_log,
            hints,
        }) => run_convert(
            input.as_deref(),
            output.as_deref(),
            dry_run,
            rowmap_log.as_deref(),
            hints,
        ),
        Some(Commands::Route {
            input,
            log,
            no_color,
        }) => run_route(input.as_deref(), &log, !no_color),
        None => run_convert(
            cli.input_file.as_deref(),
            cli.output.as_deref(),
            cli.dry_run,
            cli.rowmap_log.as_deref(),
            cli.hints,
        ),
    };
    if let Err(message) = result {
        eprintln!("error: {}", message);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("doctex was built without the `cli` feature");
}
