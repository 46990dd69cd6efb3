use clap::{CommandFactory, FromArgMatches};
use color_eyre::{Result, eyre::eyre};

use dynaview::aws::{self, Profile};
use dynaview::dynamodb::{DynamoBackend, RetrievalClient};

mod app;
mod help;
mod keys;
mod logging;
mod subcommands;
mod util;
mod widgets;

#[derive(clap::Parser)]
#[command(
    name = "dynaview",
    version,
    about = "Browse DynamoDB tables, queries and items from the terminal",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v, -vv, etc.)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// AWS profile to use
    #[arg(long, value_enum, default_value_t = Profile::Dev, global = true)]
    profile: Profile,

    /// AWS region; defaults to the environment or profile, then us-east-1
    #[arg(long, global = true)]
    region: Option<String>,

    /// Endpoint URL for the DynamoDB service
    #[arg(long, global = true)]
    endpoint_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print every table, largest first
    ListTables {
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| eyre!("failed to install the aws-lc-rs crypto provider"))?;

    color_eyre::install()?;
    let matches = Cli::command()
        .after_help(help::shortcuts_text())
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    logging::init(cli.verbose)?;

    let client = aws::new_client(
        cli.profile,
        cli.region.as_deref(),
        cli.endpoint_url.as_deref(),
    )
    .await;
    aws::validate_connection(&client).await?;
    let client = RetrievalClient::new(DynamoBackend::new(client));

    match cli.command {
        Some(Commands::ListTables { json }) => {
            let options = subcommands::list_tables::Options { json };
            subcommands::list_tables::command(&client, options).await
        }
        None => {
            let context = match cli.region.as_deref() {
                Some(region) => format!("{} · {region}", cli.profile.name()),
                None => cli.profile.name().to_string(),
            };
            let export_dir = std::env::current_dir()?;
            app::App::new(client, context, export_dir).run_tui().await
        }
    }
}
