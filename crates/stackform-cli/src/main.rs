use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "stackform",
    about = "Stackform — turn workload manifests into infrastructure template options",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a manifest into the options the template renderer consumes.
    ///
    /// The deploy identity (app, environment, account, region) is read from
    /// stackform.toml. Overrides for the environment are applied before
    /// conversion.
    Render {
        /// Path to the workload manifest
        #[arg(short, long)]
        manifest: String,
        /// Environment whose overrides to apply (default: [env].name)
        #[arg(short, long)]
        env: Option<String>,
        /// Path to stackform.toml
        #[arg(short, long, default_value = "stackform.toml")]
        config: String,
        /// Output format: json or yaml
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Print the task definition override rules that survive filtering
    Overrides {
        /// Path to the workload manifest
        #[arg(short, long)]
        manifest: String,
        /// Environment whose overrides to apply
        #[arg(short, long)]
        env: Option<String>,
    },
    /// Generate a stackform.toml scaffold
    Init {
        /// Directory to write stackform.toml into
        #[arg(short, long, default_value = ".")]
        path: String,
        #[arg(long)]
        app: String,
        #[arg(long, default_value = "test")]
        env: String,
        #[arg(long, default_value = "us-east-1")]
        region: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stackform=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { manifest, env, config, format } => {
            commands::render::render(&manifest, env.as_deref(), &config, &format)
        }
        Commands::Overrides { manifest, env } => {
            commands::overrides::overrides(&manifest, env.as_deref())
        }
        Commands::Init { path, app, env, region } => {
            commands::init::init(&path, &app, &env, &region)
        }
    }
}
