use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use mycourses_cli::{commands, prompt::TerminalPrompt, Opt};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::parse();

    match commands::run(&opt, &mut TerminalPrompt).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            for line in e.guidance() {
                eprintln!("{line}");
            }
            ExitCode::FAILURE
        }
    }
}
