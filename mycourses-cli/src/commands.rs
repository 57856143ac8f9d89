//! The subcommands. Each returns the summary to print; progress notes go
//! straight to stdout.

use std::time::Duration;

use mycourses::{
    calendar,
    credentials::{Origin, Population, Prompt},
    page::CoursePage,
    report, Client, Summary,
};
use tracing::info;

use crate::{
    error::AppResult,
    ollama::{self, OllamaConfig, TEST_PROMPT},
    Command, Opt, Settings,
};

/// Run the selected subcommand once and print its summary.
///
/// # Errors
///
/// Whatever the subcommand failed with; nothing is retried.
pub async fn run(opt: &Opt, prompt: &mut dyn Prompt) -> AppResult<()> {
    let summary = match &opt.command {
        Command::Calendar => calendar(&opt.settings).await?,
        Command::Scrape { no_prompt } => {
            let population = if *no_prompt {
                Population::LoadFromFile
            } else {
                Population::PromptOperator(prompt)
            };
            scrape(&opt.settings, population).await?
        }
        Command::Ollama { timeout } => {
            ollama(&opt.settings, Duration::from_secs(*timeout)).await?
        }
    };

    report::print(&summary);
    println!("\n✨ Done!");

    Ok(())
}

/// Fetch the calendar export and list its events by start time.
///
/// # Errors
///
/// A missing or bad URL file, network errors and unparseable feeds.
pub async fn calendar(settings: &Settings) -> AppResult<Summary> {
    let url = calendar::read_feed_url(&settings.feed_url_file)?;

    println!("📡 Fetching calendar from MyCourses...");

    let client = Client::new(settings.timeout())?;
    let ics = client.fetch_feed(&url).await?;
    let events = calendar::extract_events(&ics, settings.timezone, &settings.debug_file)?;

    info!(count = events.len(), "calendar fetched");

    Ok(calendar::summarize(&events, settings.timezone))
}

/// Fetch the course page with the session cookie and list what is on it.
///
/// # Errors
///
/// No usable token, network errors, and a rejected session (which also
/// removes the token from the store).
pub async fn scrape(settings: &Settings, population: Population<'_>) -> AppResult<Summary> {
    let store = settings.store();
    let session = store.session(&settings.cookie_name, population)?;

    match session.origin() {
        Origin::Stored => println!(
            "Using stored {} cookie from {}",
            session.key(),
            store.path().display()
        ),
        Origin::Prompted => println!("Configuration saved to {}", store.path().display()),
    }

    println!("\nFetching: {}", settings.course_url);

    let client = Client::new(settings.timeout())?;
    let html = client
        .fetch(&settings.course_url, &session, &store, &settings.login_marker)
        .await?;

    Ok(CoursePage::extract(&html).summarize())
}

/// Ask the configured Ollama model a fixed question and time the answer.
///
/// # Errors
///
/// Configuration problems, connection failures, timeouts and error
/// responses.
pub async fn ollama(settings: &Settings, timeout: Duration) -> AppResult<Summary> {
    let config = OllamaConfig::load(&settings.config)?;

    println!("Testing connection to Ollama");
    println!("Endpoint: {}", config.url);
    println!("Model: {}", config.model);
    println!("Timeout: {}s", timeout.as_secs());
    println!();
    println!("Sending test prompt...");
    println!("Prompt: \"{TEST_PROMPT}\"");

    let report = ollama::check(&config, timeout).await?;

    Ok(report.summarize())
}
