use futures::executor::block_on;
use odagraph_core::{ODataVersion, detect_version, metadata_url, resolve_metadata};
use odagraph_render::{
    Direction, DockingStrategy, GraphOptions, PortPlacement, RowLayout, Session, VisualDirective,
};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(odagraph_core::Error),
    Json(serde_json::Error),
    NoEntities,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NoEntities => write!(f, "No entity types found in metadata"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<odagraph_core::Error> for CliError {
    fn from(value: odagraph_core::Error) -> Self {
        Self::Core(value)
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
    Resolve,
    Detect,
    Graph,
    Endpoint,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    free_ports: bool,
    docking: DockingStrategy,
    direction: Direction,
    node_spacing: Option<f64>,
    layer_spacing: Option<f64>,
    row_width: Option<f64>,
    focus: Option<String>,
}

#[derive(Serialize)]
struct GraphOut<'a> {
    version: ODataVersion,
    namespace: &'a str,
    graph: &'a odagraph_render::Graph,
    #[serde(skip_serializing_if = "Option::is_none")]
    focus: Option<&'a VisualDirective>,
}

fn usage() -> &'static str {
    "odagraph-cli\n\
\n\
USAGE:\n\
  odagraph-cli [resolve] [--pretty] [<path>|-]\n\
  odagraph-cli detect [<path>|-]\n\
  odagraph-cli graph [--pretty] [--free-ports] [--docking horizontal|vertical] [--direction right|down|left|up] [--node-spacing <n>] [--layer-spacing <n>] [--row-width <n>] [--focus <entity>] [<path>|-]\n\
  odagraph-cli endpoint <service-url>\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the metadata document is read from stdin.\n\
  - resolve prints the normalized entity schema as JSON.\n\
  - detect prints the OData protocol version found in the document body.\n\
  - graph runs the full pipeline with the built-in row layout and prints the\n\
    placed graph; --focus additionally emits the visual directive for one\n\
    focused entity.\n\
  - endpoint derives the $metadata URL for a service root.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "resolve" => args.command = Command::Resolve,
            "detect" => args.command = Command::Detect,
            "graph" => args.command = Command::Graph,
            "endpoint" => args.command = Command::Endpoint,
            "--pretty" => args.pretty = true,
            "--free-ports" => args.free_ports = true,
            "--docking" => {
                let Some(strategy) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.docking = match strategy.as_str() {
                    "horizontal" => DockingStrategy::Horizontal,
                    "vertical" => DockingStrategy::Vertical,
                    _ => return Err(CliError::Usage(usage())),
                };
            }
            "--direction" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.direction = match dir.as_str() {
                    "right" => Direction::Right,
                    "down" => Direction::Down,
                    "left" => Direction::Left,
                    "up" => Direction::Up,
                    _ => return Err(CliError::Usage(usage())),
                };
            }
            "--node-spacing" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.node_spacing = Some(parse_spacing(n)?);
            }
            "--layer-spacing" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.layer_spacing = Some(parse_spacing(n)?);
            }
            "--row-width" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.row_width = Some(parse_spacing(n)?);
            }
            "--focus" => {
                let Some(entity) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.focus = Some(entity.clone());
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

fn parse_spacing(text: &str) -> Result<f64, CliError> {
    let value = text.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CliError::Usage(usage()))
    }
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
    Ok(())
}

fn graph_options(args: &Args) -> GraphOptions {
    let mut options = GraphOptions::default();
    options.directives.direction = args.direction;
    if let Some(n) = args.node_spacing {
        options.directives.node_spacing = n;
    }
    if let Some(n) = args.layer_spacing {
        options.directives.layer_spacing = n;
    }
    options.ports = if args.free_ports {
        PortPlacement::FreePorts
    } else {
        PortPlacement::Docked(args.docking)
    };
    options
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Endpoint => {
            let Some(input) = args.input.as_deref() else {
                return Err(CliError::Usage(usage()));
            };
            println!("{}", metadata_url(input)?);
            Ok(())
        }
        Command::Detect => {
            let text = read_input(args.input.as_deref())?;
            println!("{}", detect_version(&text));
            Ok(())
        }
        Command::Resolve => {
            let text = read_input(args.input.as_deref())?;
            let schema = resolve_metadata(&text);
            if schema.is_empty() {
                return Err(CliError::NoEntities);
            }
            write_json(&schema, args.pretty)?;
            Ok(())
        }
        Command::Graph => {
            let text = read_input(args.input.as_deref())?;
            let version = detect_version(&text);
            let schema = resolve_metadata(&text);
            let options = graph_options(&args);
            let engine = RowLayout {
                max_row_width: args.row_width.unwrap_or(RowLayout::default().max_row_width),
            };

            let mut session = Session::new();
            let ticket = session.begin_load();
            block_on(session.load_schema(ticket, &schema, &engine, &options));

            let directive = args
                .focus
                .as_deref()
                .and_then(|entity| session.focus_node(entity));
            let Some(graph) = session.graph() else {
                return Err(CliError::NoEntities);
            };

            let out = GraphOut {
                version,
                namespace: &schema.namespace,
                graph,
                focus: directive.as_ref(),
            };
            write_json(&out, args.pretty)?;
            Ok(())
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
        Err(CliError::NoEntities) => {
            eprintln!("{}", CliError::NoEntities);
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
