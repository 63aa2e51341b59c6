//! Command-line interface for the decoder.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;

use crate::config::{parse_action_policy, ActionPolicy, DecoderConfig};
use crate::error::{DecodeError, Result};
use crate::registry::{create_command_registry, DecodedElement};
use crate::xml::XmlStream;

/// Decode XMPP ad-hoc command elements from XML.
#[derive(Parser)]
#[command(name = "adhoc-decode")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a `<command/>` or command-specific error element.
    Decode {
        /// XML file to read, or `-` for stdin
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// Treatment of unknown action literals: `strict` fails, `lenient` maps them to `unknown`
        #[arg(long, value_parser = parse_action_policy, default_value = "strict")]
        action_policy: ActionPolicy,
    },
}

/// Rendering of the decoded element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            format,
            action_policy,
        } => decode_input(&input, format, action_policy),
    }
}

/// Execute the decode command.
fn decode_input(input: &Path, format: OutputFormat, policy: ActionPolicy) -> Result<()> {
    let reader = open_input(input)?;

    tracing::debug!(input = %input.display(), policy = policy.as_str(), "Decoding");
    let registry = create_command_registry(DecoderConfig::new().with_action_policy(policy));

    let mut stream = XmlStream::new(reader);
    let decoded = registry.decode(&mut stream)?;

    eprintln!("{} {}", style("Decoded").bold(), describe(&decoded));

    let rendered = render(&decoded, format)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        writeln!(stdout)?;
    }

    Ok(())
}

/// Open the input file, or stdin for `-`.
fn open_input(input: &Path) -> Result<Box<dyn BufRead>> {
    if input.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    if !input.is_file() {
        return Err(DecodeError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Input file does not exist: {}", input.display()),
        )));
    }

    Ok(Box::new(BufReader::new(File::open(input)?)))
}

/// One-line summary of a decoded element.
fn describe(decoded: &DecodedElement) -> String {
    match decoded {
        DecodedElement::Command(result) => {
            let node = result.node.as_deref().unwrap_or("(no node)");
            let status = result
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unset".to_string());
            format!(
                "command {} (status {})",
                style(node).cyan(),
                style(status).green()
            )
        }
        DecodedElement::SpecificError(error) => {
            format!("specific error {}", style(error.condition).yellow())
        }
    }
}

/// Serialize a decoded element in the requested format.
pub fn render(decoded: &DecodedElement, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(decoded)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(decoded)?),
    }
}
