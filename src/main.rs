//! Main binary entry point for swh-deposit.

use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use swh_deposit::errors::DepositError;
use swh_deposit::summary::DepositSummary;
use swh_deposit::xml_validator;
use swh_deposit::{
    Archive, AtomEntry, ClientConfig, DepositClient, DepositResponse, MetadataNode,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,

    #[arg(long, env = "SWH_DEPOSIT_URL", global = true, help = "Deposit service base URL")]
    url: Option<String>,

    #[arg(long, env = "SWH_DEPOSIT_USERNAME", global = true)]
    username: Option<String>,

    #[arg(long, env = "SWH_DEPOSIT_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[arg(long, global = true, help = "Print deposit responses as JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a codemeta.json file into an Atom deposit entry
    Metadata {
        #[arg(long, value_name = "FILE")]
        codemeta: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long, help = "Derive missing author names from given/family names")]
        fill_missing: bool,
    },

    /// Check that a file is an Atom entry the deposit service accepts
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Create a new deposit from metadata, an archive, or both
    Create {
        collection: String,

        #[command(flatten)]
        atom: AtomArgs,

        #[arg(long, value_name = "FILE", help = "Source archive (.zip or .tar)")]
        archive: Option<PathBuf>,

        #[arg(long = "final", help = "Mark the deposit as complete")]
        is_final: bool,
    },

    /// Add metadata to a partial deposit
    UpdateMetadata {
        collection: String,
        deposit_id: String,

        #[command(flatten)]
        atom: AtomArgs,

        #[arg(long = "final")]
        is_final: bool,

        #[arg(long, help = "Replace the existing metadata instead of adding to it")]
        replace: bool,
    },

    /// Add an archive to a partial deposit
    UpdateContent {
        collection: String,
        deposit_id: String,

        #[arg(long, value_name = "FILE")]
        archive: PathBuf,

        #[arg(long = "final")]
        is_final: bool,

        #[arg(long, help = "Replace the existing content instead of adding to it")]
        replace: bool,
    },

    /// Show the status of a deposit
    Status {
        collection: String,
        deposit_id: String,
    },

    /// Show the content description of a deposit
    Content {
        collection: String,
        deposit_id: String,
    },
}

#[derive(Args, Debug)]
struct AtomArgs {
    #[arg(long, value_name = "FILE", conflicts_with = "codemeta", help = "Atom entry XML file")]
    atom: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "codemeta.json file converted to an Atom entry")]
    codemeta: Option<PathBuf>,

    #[arg(
        long,
        requires = "codemeta",
        help = "Derive missing author names from given/family names"
    )]
    fill_missing: bool,
}

/// Atom entry read from the command line arguments.
enum LoadedAtom {
    Metadata(MetadataNode),
    Xml(String),
}

impl LoadedAtom {
    fn entry(&self) -> AtomEntry<'_> {
        match self {
            LoadedAtom::Metadata(metadata) => AtomEntry::Metadata(metadata),
            LoadedAtom::Xml(xml) => AtomEntry::Xml(xml),
        }
    }
}

fn setup_logging(verbose: bool, debug: bool) {
    let filter_level = if debug {
        log::LevelFilter::Debug
    } else if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter(None, filter_level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn read_file(path: &Path, what: &str) -> Result<String, DepositError> {
    fs::read_to_string(path)
        .map_err(|e| DepositError::Io(e, format!("Failed to read {}: {}", what, path.display())))
}

fn load_codemeta(path: &Path, fill_missing: bool) -> Result<MetadataNode, DepositError> {
    let json = read_file(path, "CodeMeta file")?;
    let mut metadata = MetadataNode::from_codemeta_str(&json)?;
    if fill_missing {
        metadata.fill_missing_metadata()?;
    }
    Ok(metadata)
}

fn load_atom(args: &AtomArgs) -> Result<Option<LoadedAtom>, DepositError> {
    if let Some(path) = &args.atom {
        let xml = read_file(path, "Atom entry")?;
        match xml_validator::validate_entry_string(&xml) {
            Ok(result) => {
                for message in result.messages {
                    warn!("{}: {}", path.display(), message);
                }
            }
            Err(e) => warn!("{}: {}", path.display(), e),
        }
        return Ok(Some(LoadedAtom::Xml(xml)));
    }
    match &args.codemeta {
        Some(path) => Ok(Some(LoadedAtom::Metadata(load_codemeta(
            path,
            args.fill_missing,
        )?))),
        None => Ok(None),
    }
}

fn require_atom(args: &AtomArgs) -> Result<LoadedAtom, DepositError> {
    load_atom(args)?.ok_or_else(|| {
        DepositError::InvalidInput("one of --atom or --codemeta is required".to_string())
    })
}

fn client_config(cli: &Cli) -> Result<ClientConfig, DepositError> {
    let missing = |what: &str| {
        DepositError::Config(format!(
            "missing {} (use --{} or SWH_DEPOSIT_{})",
            what,
            what,
            what.to_uppercase()
        ))
    };
    Ok(ClientConfig::new(
        cli.url.clone().ok_or_else(|| missing("url"))?,
        cli.username.clone().ok_or_else(|| missing("username"))?,
        cli.password.clone().ok_or_else(|| missing("password"))?,
    ))
}

fn print_response(response: &DepositResponse, json: bool) -> Result<(), DepositError> {
    let summary = DepositSummary::from_response(response);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.format_colored());
    }
    Ok(())
}

fn run_app() -> Result<(), DepositError> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.debug);

    let response = match &cli.command {
        Command::Metadata {
            codemeta,
            output,
            fill_missing,
        } => {
            let metadata = load_codemeta(codemeta, *fill_missing)?;
            let xml = metadata.serialize_to_xml_document()?;
            match output {
                Some(path) => {
                    fs::write(path, xml).map_err(|e| {
                        DepositError::Io(e, format!("Failed to write {}", path.display()))
                    })?;
                    info!("Atom entry written to {}", path.display());
                }
                None => print!("{}", xml),
            }
            return Ok(());
        }
        Command::Validate { file } => {
            let result = xml_validator::validate_entry_file(file)
                .map_err(|e| DepositError::InvalidInput(e.to_string()))?;
            if result.valid {
                println!("{} is a valid Atom entry", file.display());
                return Ok(());
            }
            for message in &result.messages {
                eprintln!("{}", message);
            }
            return Err(DepositError::InvalidInput(format!(
                "{} failed validation with {} issue(s)",
                file.display(),
                result.messages.len()
            )));
        }
        command => {
            let client = DepositClient::new(&client_config(&cli)?)?;
            run_remote(&client, command)
        }
    };

    match response {
        Ok(response) => print_response(&response, cli.json),
        Err(DepositError::Rejected { status, response }) => {
            print_response(&response, cli.json)?;
            if !response.has_document() && !response.body().is_empty() {
                eprintln!("{}", response.body());
            }
            Err(DepositError::Rejected { status, response })
        }
        Err(e) => Err(e),
    }
}

fn run_remote(client: &DepositClient, command: &Command) -> Result<DepositResponse, DepositError> {
    match command {
        Command::Create {
            collection,
            atom,
            archive,
            is_final,
        } => {
            let atom = load_atom(atom)?;
            let archive = archive.as_deref().map(Archive::from_file).transpose()?;
            client.create_deposit(
                collection,
                *is_final,
                atom.as_ref().map(LoadedAtom::entry),
                archive,
            )
        }
        Command::UpdateMetadata {
            collection,
            deposit_id,
            atom,
            is_final,
            replace,
        } => {
            let atom = require_atom(atom)?;
            client.update_deposit_metadata(collection, deposit_id, *is_final, atom.entry(), *replace)
        }
        Command::UpdateContent {
            collection,
            deposit_id,
            archive,
            is_final,
            replace,
        } => {
            let archive = Archive::from_file(archive)?;
            client.update_deposit_content(collection, deposit_id, *is_final, archive, *replace)
        }
        Command::Status {
            collection,
            deposit_id,
        } => client.get_status(collection, deposit_id),
        Command::Content {
            collection,
            deposit_id,
        } => client.get_content(collection, deposit_id),
        Command::Metadata { .. } | Command::Validate { .. } => Err(DepositError::InvalidInput(
            "command does not talk to the deposit service".to_string(),
        )),
    }
}

fn main() -> ExitCode {
    match run_app() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("A fatal error occurred:");
            log::error!("{}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(s) = source {
                log::error!("  Caused by: {}", s);
                source = std::error::Error::source(s);
            }
            ExitCode::FAILURE
        }
    }
}
