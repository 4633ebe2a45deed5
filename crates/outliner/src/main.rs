use crate::prelude::*;
use clap::Parser;

mod batch;
mod error;
mod extract;
mod heuristics;
mod inspect;
mod prelude;
mod source;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract a document title and an H1/H2/H3 heading outline from PDF files"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// TOML file overriding the built-in heuristic tables
    #[clap(long, env = "OUTLINER_HEURISTICS", global = true)]
    heuristics: Option<std::path::PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "OUTLINER_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Extract the outline of a single PDF
    Extract(crate::extract::App),

    /// Extract outlines for every PDF in a directory
    Batch(crate::batch::App),

    /// Show the typography profile and detected language of a PDF
    Inspect(crate::inspect::App),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let app = App::parse();
    init_logging(app.global.verbose);

    match app.command {
        SubCommands::Extract(sub_app) => crate::extract::run(sub_app, app.global).await,
        SubCommands::Batch(sub_app) => crate::batch::run(sub_app, app.global).await,
        SubCommands::Inspect(sub_app) => crate::inspect::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
