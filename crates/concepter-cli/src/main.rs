use anyhow::Result;
use clap::{Parser, Subcommand};

mod bootstrap;
mod commands;

#[derive(Parser)]
#[command(name = "concepter")]
#[command(about = "Concepter CLI - sign in and browse event concepts", long_about = None)]
struct Cli {
    /// Override the configured API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep the session in memory instead of the local storage file
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// End the session
    Logout,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Show whether a valid session is stored
    Status,
    /// Fetch the signed-in user's profile
    Whoami,
    /// List concepts
    Concepts,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.api_url.as_deref())?;
    bootstrap::init_tracing(&config.log_filter);
    let context = bootstrap::build_context(&config, cli.ephemeral)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&context, &email, &password).await?
        }
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            commands::session::register(&context, email, password, first_name, last_name).await?
        }
        Commands::Logout => commands::session::logout(&context).await,
        Commands::Refresh => commands::session::refresh(&context).await?,
        Commands::Status => commands::session::status(&context),
        Commands::Whoami => commands::session::whoami(&context).await?,
        Commands::Concepts => commands::concepts::list(&context).await?,
    }

    Ok(())
}
