use clap::{Parser, Subcommand};

mod commands;
mod report;

#[derive(Parser)]
#[command(
    name = "spotgrid",
    about = "SpotGrid — pick cloud instances for a fleet of services",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Advise instances for every service, per region.
    ///
    /// Services and weights come from spotgrid.toml unless --request
    /// points at a separate TOML or JSON request file. Each region in the
    /// catalog is advised independently and the lowest-scoring region is
    /// reported as the choice.
    Advise {
        /// Path to spotgrid.toml
        #[arg(short, long, default_value = "spotgrid.toml")]
        config: String,
        /// Services and weights to advise, overriding the config file
        #[arg(short, long)]
        request: Option<String>,
        /// Catalog JSON file, overriding [catalog].path
        #[arg(long)]
        catalog: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Generate a spotgrid.toml scaffold
    Init {
        /// Directory to write spotgrid.toml into
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Catalog path recorded in the scaffold
        #[arg(long, default_value = "catalog.json")]
        catalog: String,
    },
    /// Inspect an offering catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Per-region offering counts and price ranges
    Summary {
        /// Catalog JSON file
        #[arg(short, long, default_value = "catalog.json")]
        path: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spotgrid=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Advise { config, request, catalog, format } => {
            commands::advise::advise(&config, request.as_deref(), catalog.as_deref(), &format).await
        }
        Commands::Init { path, catalog } => commands::init::init(&path, &catalog),
        Commands::Catalog { action } => match action {
            CatalogAction::Summary { path, format } => {
                commands::catalog::summary(&path, &format)
            }
        },
    }
}
