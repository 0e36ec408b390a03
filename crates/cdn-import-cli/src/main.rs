#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use cdn_import_core::RunMode;
use clap::Parser;
use commands::{HostCommand, Project};
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cdn-import")]
#[command(author, version, about = "Load npm dependencies from a CDN instead of bundling them", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Config file to load instead of the default lookup
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run mode; `development` enables dev logging and dev externals
    #[arg(long, global = true, env = "NODE_ENV", value_name = "ENV")]
    node_env: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve configured modules and print their CDN URLs
    Resolve,

    /// Print the import name -> global variable map
    Externals,

    /// Inject CDN tags into an HTML entry
    Html {
        /// HTML file to transform
        #[arg(default_value = "index.html")]
        input: PathBuf,

        /// Host command to emulate
        #[arg(long, value_enum, default_value_t = HostCommand::Build)]
        command: HostCommand,

        /// Write the result here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rewrite externalized imports in a source file
    Transform {
        /// JavaScript/TypeScript file to transform
        file: PathBuf,

        /// Host command to emulate
        #[arg(long, value_enum, default_value_t = HostCommand::Build)]
        command: HostCommand,

        /// Write the result here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List built-in module shortcuts
    Shortcuts,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    logging::init(cli.verbose, cli.json);

    let project = Project {
        cwd,
        config: cli.config,
        mode: RunMode::from_node_env(cli.node_env.as_deref()),
        json: cli.json,
    };

    match cli.command {
        None | Some(Commands::Version) => commands::version::run(cli.json),
        Some(Commands::Resolve) => commands::resolve::run(&project),
        Some(Commands::Externals) => commands::externals::run(&project),
        Some(Commands::Html {
            input,
            command,
            output,
        }) => commands::html::run(&project, &input, command, output.as_deref()),
        Some(Commands::Transform {
            file,
            command,
            output,
        }) => commands::transform::run(&project, &file, command, output.as_deref()),
        Some(Commands::Shortcuts) => commands::shortcuts::run(cli.json),
    }
}
