use std::time::Duration;

use clap::{Parser, Subcommand};
use sentiment_proxy::client::{ABOUT, SubmissionForm, SubmitOutcome, TerminalView};

#[derive(Parser)]
#[command(name = "sentiment-cli")]
#[command(about = "Sentiment analysis of a web page through the sentiment proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    server: String,

    /// Timeout of the analyze request, in milliseconds
    #[arg(short, long, default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the page at URL
    Analyze {
        url: String,
        /// Use the canned test endpoint instead of the real analysis
        #[arg(long)]
        test: bool,
    },
    /// Show information about this tool
    About,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::About => {
            println!("{}", ABOUT);
        }
        Commands::Analyze { url, test } => {
            let path = if test { "test/analyze-sentiment" } else { "analyze-sentiment" };
            let endpoint = format!("{}/{}", cli.server.trim_end_matches('/'), path);
            let form = SubmissionForm::new(endpoint)?.timeout(Duration::from_millis(cli.timeout_ms));

            match form.submit(&TerminalView::new(url)).await {
                SubmitOutcome::Succeeded(_) => {}
                _ => std::process::exit(1),
            }
        }
    }

    Ok(())
}
