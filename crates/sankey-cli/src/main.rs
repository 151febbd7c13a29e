use sankey_core::{FlowDataProcessor, ProcessedGraph, ProcessorOptions, Severity};
use sankey_layout::{Dimensions, LayoutConfig, SankeyLayout};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(sankey_core::Error),
    Layout(sankey_layout::Error),
    Json(serde_json::Error),
    CheckFailed,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{}", sankey_core::generate_error_report(err)),
            CliError::Layout(sankey_layout::Error::Core(err)) => {
                write!(f, "{}", sankey_core::generate_error_report(err))
            }
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::CheckFailed => write!(f, "flow graph check failed"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<sankey_core::Error> for CliError {
    fn from(value: sankey_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<sankey_layout::Error> for CliError {
    fn from(value: sankey_layout::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Process,
    Check,
    Report,
    Layout,
    Import,
}

#[derive(Debug)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    csv: bool,
    pretty: bool,
    width: f64,
    height: f64,
    options: ProcessorOptions,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            command: Command::Process,
            input: None,
            config: None,
            csv: false,
            pretty: false,
            width: 800.0,
            height: 600.0,
            options: ProcessorOptions::default(),
        }
    }
}

fn usage() -> &'static str {
    "sankey-cli\n\
\n\
USAGE:\n\
  sankey-cli [process] [--pretty] [--csv] [--no-conservation] [--allow-negative] [--tolerance <n>] [<path>|-]\n\
  sankey-cli check [--csv] [--tolerance <n>] [<path>|-]\n\
  sankey-cli report [--pretty] [--csv] [--tolerance <n>] [<path>|-]\n\
  sankey-cli layout [--pretty] [--csv] [--config <file.json>] [--width <w>] [--height <h>] [<path>|-]\n\
  sankey-cli import [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is a {nodes, links} JSON document; --csv reads a source,target,value flow list instead.\n\
  - import converts a flow list into a {nodes, links} JSON document.\n\
  - check prints a diagnostic report and exits with status 1 when the graph is invalid or unbalanced.\n\
"
}

fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    let Some(raw) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !v.is_finite() {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "process" => args.command = Command::Process,
            "check" => args.command = Command::Check,
            "report" => args.command = Command::Report,
            "layout" => args.command = Command::Layout,
            "import" => args.command = Command::Import,
            "--pretty" => args.pretty = true,
            "--csv" => args.csv = true,
            "--no-conservation" => args.options.validate_flow_conservation = false,
            "--allow-negative" => args.options.allow_negative_values = true,
            "--tolerance" => {
                args.options.tolerance = next_f64(&mut it)?;
                if args.options.tolerance < 0.0 {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--width" => args.width = next_f64(&mut it)?,
            "--height" => args.height = next_f64(&mut it)?,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn raw_graph(text: &str, csv: bool) -> Result<Value, CliError> {
    if csv {
        Ok(sankey_core::parse_flow_list(text)?)
    } else {
        Ok(serde_json::from_str(text)?)
    }
}

fn load_config(path: Option<&str>) -> Result<LayoutConfig, CliError> {
    match path {
        None => Ok(LayoutConfig::default()),
        Some(path) => {
            let raw: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Ok(LayoutConfig::from_json(&raw)?)
        }
    }
}

/// Conservation problems never fail processing; they are surfaced on stderr instead.
fn warn_conservation(graph: &ProcessedGraph) {
    if let Some(report) = &graph.report.conservation {
        for message in &report.errors {
            eprintln!("warning: {message}");
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let processor = FlowDataProcessor::new(args.options.clone());

    match args.command {
        Command::Import => {
            let raw = sankey_core::parse_flow_list(&text)?;
            write_json(&raw, args.pretty)
        }
        Command::Process => {
            let graph = processor.process(&raw_graph(&text, args.csv)?)?;
            warn_conservation(&graph);
            write_json(&graph, args.pretty)
        }
        Command::Check => {
            let raw = raw_graph(&text, args.csv)?;
            let report = match processor.process(&raw) {
                Ok(graph) => sankey_core::generate_flow_report(&graph, args.options.tolerance),
                Err(err) => {
                    print!("{}", sankey_core::generate_error_report(&err));
                    return Err(CliError::CheckFailed);
                }
            };
            print!("{report}");
            if !report.conservation.valid {
                return Err(CliError::CheckFailed);
            }
            Ok(())
        }
        Command::Report => {
            let graph = processor.process(&raw_graph(&text, args.csv)?)?;
            let report = sankey_core::generate_flow_report(&graph, args.options.tolerance);
            let warnings = report
                .diagnostics
                .with_severity(Severity::Warning)
                .count();
            if warnings > 0 {
                eprintln!("{warnings} warning(s)");
            }
            write_json(&report, args.pretty)
        }
        Command::Layout => {
            let config = load_config(args.config.as_deref())?;
            let graph = processor.process(&raw_graph(&text, args.csv)?)?;
            warn_conservation(&graph);
            let result = SankeyLayout::new(config)
                .layout_graph(&graph, Dimensions::new(args.width, args.height))?;
            write_json(&result, args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
