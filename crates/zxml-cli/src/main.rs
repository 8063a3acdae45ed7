use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use zxml::{
    Decoder, DecoderConfig, RendererConfig, SoapRenderer, SoapSchema, Value, XmlRenderer,
};

#[derive(Debug, Parser)]
#[command(
    name = "zxml",
    version,
    about = "Convert between XML and JSON value trees"
)]
struct Args {
    /// Log decoding and rendering steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode an XML document into JSON
    Decode {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Character encoding of the input
        #[arg(short, long, default_value = zxml::DEFAULT_ENCODING)]
        encoding: String,
        /// Fail when repeated tags among distinct siblings would be dropped
        #[arg(long)]
        strict: bool,
        /// Convert leaf text to datetimes, integers and decimals
        #[arg(long)]
        typed: bool,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Render a JSON document as XML
    Encode {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Root element name
        #[arg(long, default_value = zxml::DEFAULT_ROOT_TAG)]
        root: String,
        /// Element name for sequence items
        #[arg(long, default_value = zxml::DEFAULT_ITEM_TAG)]
        item_tag: String,
        /// Name sequence items after their parent minus its last character
        #[arg(long)]
        override_item_tag: bool,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Render a JSON document inside a SOAP envelope
    Soap {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Envelope namespace prefix
        #[arg(long, default_value = zxml::soap::DEFAULT_SOAP_TAG)]
        soap_tag: String,
        /// Service namespace URI
        #[arg(long, default_value = zxml::soap::DEFAULT_SERVICE_ENDPOINT)]
        endpoint: String,
        /// Service namespace prefix
        #[arg(long, default_value = zxml::soap::DEFAULT_SERVICE_NAME)]
        service: String,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Decode {
            input,
            encoding,
            strict,
            typed,
            output,
        } => {
            let data = read_input(&input)?;
            let decoder = Decoder::with_config(DecoderConfig::default().strict(strict));
            let mut value = decoder
                .decode(data.as_slice(), &encoding)
                .context("failed to decode xml")?;
            if typed {
                value = value.type_converted();
            }
            let mut json = serde_json::to_string_pretty(&value).context("failed to write json")?;
            json.push('\n');
            write_output(&output, json.as_bytes())
        }
        Command::Encode {
            input,
            root,
            item_tag,
            override_item_tag,
            output,
        } => {
            let value = read_json(&input)?;
            let config = RendererConfig::default()
                .with_root_tag_name(root)
                .with_item_tag_name(item_tag)
                .override_item_tag_name(override_item_tag);
            let xml = XmlRenderer::with_config(config)
                .render(&value)
                .context("failed to render xml")?;
            write_output(&output, xml.as_bytes())
        }
        Command::Soap {
            input,
            soap_tag,
            endpoint,
            service,
            output,
        } => {
            let value = read_json(&input)?;
            let renderer = SoapRenderer::with_schema(SoapSchema::new(soap_tag, endpoint, service));
            let xml = renderer
                .render(&value)
                .context("failed to render soap envelope")?;
            write_output(&output, xml.as_bytes())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn read_json(path: &Option<PathBuf>) -> Result<Value> {
    let data = read_input(path)?;
    let value = serde_json::from_slice(&data).context("failed to parse json input")?;
    debug!(bytes = data.len(), "read json input");
    Ok(value)
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.iter().all(u8::is_ascii_whitespace) {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
