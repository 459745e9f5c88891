use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lcsave")]
#[command(about = "Inspect and convert Liberty City save files")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Identify which platform produced a save file
    Detect {
        /// Save files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the contents of a save file
    Info {
        file: PathBuf,

        /// Parse with this profile instead of detecting one
        #[arg(short, long, env = "LCSAVE_PROFILE")]
        profile: Option<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Load even when the checksum does not match
        #[arg(long)]
        ignore_checksum: bool,
    },

    /// Load a save and write it back, optionally for another platform
    Resave {
        input: PathBuf,

        output: PathBuf,

        /// Target profile (defaults to the detected one)
        #[arg(short, long, env = "LCSAVE_PROFILE")]
        to: Option<String>,

        /// Load even when the checksum does not match
        #[arg(long)]
        ignore_checksum: bool,
    },

    /// Dump raw bytes of a save file
    Hexdump {
        file: PathBuf,

        /// Start offset (hex, with or without 0x)
        #[arg(short, long, default_value = "0")]
        offset: String,

        /// Number of bytes
        #[arg(short, long, default_value_t = 256)]
        size: usize,

        /// Dump the payload of this outer block instead (offset is relative)
        #[arg(short, long)]
        block: Option<usize>,

        /// Hide the ASCII column
        #[arg(long)]
        no_ascii: bool,
    },

    /// List the supported platform profiles
    Profiles {
        /// Print the registry as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "lcsave=debug"
    } else {
        "lcsave=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    match cli.command {
        Command::Detect { files } => commands::detect::run(&files),
        Command::Info {
            file,
            profile,
            json,
            ignore_checksum,
        } => commands::info::run(&file, profile.as_deref(), json, ignore_checksum),
        Command::Resave {
            input,
            output,
            to,
            ignore_checksum,
        } => commands::resave::run(&input, &output, to.as_deref(), ignore_checksum),
        Command::Hexdump {
            file,
            offset,
            size,
            block,
            no_ascii,
        } => {
            let offset = commands::hex_utils::parse_hex_offset(&offset)?;
            commands::hexdump::run(&file, offset, size, block, !no_ascii)
        }
        Command::Profiles { json } => commands::profiles::run(json),
    }
}
