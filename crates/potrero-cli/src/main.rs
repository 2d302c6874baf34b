use potrero::export::{KmlOptions, PaletteStrategy, analysis_script, feature_collection};
use potrero::export::{kml_document, kmz_archive};
use potrero::{NoDetailFetch, Processor, RegistryItem, parse_polygon_text};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Potrero(potrero::Error),
    Export(potrero::export::ExportError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Potrero(err) => write!(f, "{err}"),
            CliError::Export(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<potrero::Error> for CliError {
    fn from(value: potrero::Error) -> Self {
        Self::Potrero(value)
    }
}

impl From<potrero::export::ExportError> for CliError {
    fn from(value: potrero::export::ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    Normalize,
    Parse,
    #[default]
    Export,
}

#[derive(Debug, Clone, Copy, Default)]
enum ExportFormat {
    #[default]
    GeoJson,
    Kml,
    Kmz,
    Ee,
}

impl FromStr for ExportFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geojson" => Ok(Self::GeoJson),
            "kml" => Ok(Self::Kml),
            "kmz" => Ok(Self::Kmz),
            "ee" | "earth-engine" => Ok(Self::Ee),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    cuit: Option<String>,
    renspa: Option<String>,
    format: ExportFormat,
    pretty: bool,
    only_active: bool,
    per_cuit_colors: bool,
    document_name: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "potrero-cli\n\
\n\
USAGE:\n\
  potrero-cli normalize (--cuit <id> | --renspa <id>)\n\
  potrero-cli parse [<path>|-]\n\
  potrero-cli export [--format geojson|kml|kmz|ee] [--pretty] [--only-active]\n\
                     [--per-cuit-colors] [--name <document name>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - parse reads the registry's raw polygon text and prints the closed ring as\n\
    JSON ([lon, lat] pairs), or null when the text has no usable geometry.\n\
  - export reads a JSON array of raw registry items (the upstream API\n\
    response, captured to a file) and writes the chosen artifact to stdout;\n\
    the batch summary goes to stderr.\n\
  - KMZ output is binary: it defaults to writing next to the input file\n\
    (or ./out.kmz for stdin) unless --out is given.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut rest = argv.iter().peekable();

    match rest.peek().map(|s| s.as_str()) {
        Some("normalize") => {
            args.command = Command::Normalize;
            rest.next();
        }
        Some("parse") => {
            args.command = Command::Parse;
            rest.next();
        }
        Some("export") => {
            args.command = Command::Export;
            rest.next();
        }
        _ => {}
    }

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--help" | "-h" => return Err(CliError::Usage("")),
            "--cuit" => {
                args.cuit = Some(
                    rest.next()
                        .ok_or(CliError::Usage("--cuit requires a value"))?
                        .clone(),
                );
            }
            "--renspa" => {
                args.renspa = Some(
                    rest.next()
                        .ok_or(CliError::Usage("--renspa requires a value"))?
                        .clone(),
                );
            }
            "--format" => {
                let value = rest
                    .next()
                    .ok_or(CliError::Usage("--format requires a value"))?;
                args.format = value
                    .parse()
                    .map_err(|()| CliError::Usage("--format must be geojson, kml, kmz or ee"))?;
            }
            "--pretty" => args.pretty = true,
            "--only-active" => args.only_active = true,
            "--per-cuit-colors" => args.per_cuit_colors = true,
            "--name" => {
                args.document_name = Some(
                    rest.next()
                        .ok_or(CliError::Usage("--name requires a value"))?
                        .clone(),
                );
            }
            "--out" => {
                args.out = Some(
                    rest.next()
                        .ok_or(CliError::Usage("--out requires a value"))?
                        .clone(),
                );
            }
            other => {
                if other.starts_with("--") {
                    return Err(CliError::Usage("unknown flag"));
                }
                if args.input.is_some() {
                    return Err(CliError::Usage("more than one input path"));
                }
                args.input = Some(other.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_output(out: Option<&str>, text: &str) -> Result<(), CliError> {
    match out {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => Ok(std::fs::write(path, text)?),
    }
}

fn default_kmz_path(input: Option<&str>) -> PathBuf {
    match input {
        None | Some("-") => PathBuf::from("out.kmz"),
        Some(path) => Path::new(path).with_extension("kmz"),
    }
}

fn run_normalize(args: &Args) -> Result<(), CliError> {
    match (&args.cuit, &args.renspa) {
        (Some(cuit), None) => {
            println!("{}", potrero::Cuit::parse(cuit)?);
            Ok(())
        }
        (None, Some(renspa)) => {
            println!("{}", potrero::Renspa::parse(renspa)?);
            Ok(())
        }
        _ => Err(CliError::Usage(
            "normalize takes exactly one of --cuit or --renspa",
        )),
    }
}

fn run_parse(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let ring = parse_polygon_text(Some(&text));
    println!("{}", serde_json::to_string(&ring)?);
    Ok(())
}

fn run_export(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let items: Vec<RegistryItem> = serde_json::from_str(&text)?;

    let processor = Processor::new().with_only_active(args.only_active);
    let outcome = processor.process_batch(&items, &NoDetailFetch);
    eprintln!("{}", outcome.summary());
    if !outcome.failed.is_empty() {
        eprintln!("without geometry: {}", outcome.failed.join(", "));
    }

    let mut kml_options = KmlOptions::default();
    if let Some(name) = &args.document_name {
        kml_options = kml_options.with_document_name(name.clone());
    }
    if args.per_cuit_colors {
        kml_options = kml_options.with_per_cuit_colors(PaletteStrategy);
    }

    match args.format {
        ExportFormat::GeoJson => {
            let value = feature_collection(&outcome.records);
            let text = if args.pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            write_output(args.out.as_deref(), &text)
        }
        ExportFormat::Kml => {
            write_output(args.out.as_deref(), &kml_document(&outcome.records, &kml_options))
        }
        ExportFormat::Kmz => {
            let bytes = kmz_archive(&outcome.records, &kml_options)?;
            let path = args
                .out
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| default_kmz_path(args.input.as_deref()));
            std::fs::write(&path, bytes)?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        ExportFormat::Ee => {
            write_output(
                args.out.as_deref(),
                &analysis_script(&feature_collection(&outcome.records)),
            )
        }
    }
}

fn run() -> Result<(), CliError> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&argv)?;
    match args.command {
        Command::Normalize => run_normalize(&args),
        Command::Parse => run_parse(&args),
        Command::Export => run_export(&args),
    }
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            if !msg.is_empty() {
                eprintln!("{msg}\n");
            }
            eprintln!("{}", usage());
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
