use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookscan::config::Config;
use bookscan::domain::{DomainError, TableStorage};
use bookscan::infrastructure::open_catalog;
use bookscan::services::{CatalogService, LookupQuery, ScanOutcome};

type InputLines = Lines<BufReader<Stdin>>;

fn prompt(text: &str) {
    print!("{}", text);
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!("Failed to flush prompt: {}", e);
    }
}

async fn read_line(lines: &mut InputLines) -> Result<Option<String>, DomainError> {
    lines
        .next_line()
        .await
        .map(|line| line.map(|l| l.trim().to_string()))
        .map_err(|e| DomainError::Internal(format!("Failed to read input: {}", e)))
}

fn report(outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::AlreadyStored(book) => println!("Book already in database:\n\n{}\n", book),
        ScanOutcome::Added(book) => println!("Added:\n\n{}\n", book),
        ScanOutcome::Updated(book) => println!("Updated:\n\n{}\n", book),
        ScanOutcome::NotFound => println!("Book not found.\n"),
        ScanOutcome::NeedsAuthor(_) => {}
    }
}

/// Ask for a title and author, and look them up. Blank title skips.
async fn manual_entry<S: TableStorage>(
    service: &mut CatalogService<S>,
    lines: &mut InputLines,
    title: Option<String>,
) -> Result<ScanOutcome, DomainError> {
    let title = match title {
        Some(title) => title,
        None => {
            prompt("Enter title to search manually (blank to skip): ");
            match read_line(lines).await? {
                Some(t) if !t.is_empty() => t,
                _ => return Ok(ScanOutcome::NotFound),
            }
        }
    };
    prompt(&format!("Author of '{}': ", title));
    let author = read_line(lines).await?.unwrap_or_default();

    service
        .lookup(LookupQuery::title_author(title.clone(), author), &title)
        .await
}

async fn session<S: TableStorage>(service: &mut CatalogService<S>) -> Result<(), DomainError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt("Scan or enter an ISBN, or a title ('q' to quit): ");
        let Some(raw) = read_line(&mut lines).await? else {
            break;
        };
        if raw.is_empty() {
            continue;
        }
        if raw.eq_ignore_ascii_case("q") {
            break;
        }

        let outcome = match service.scan(&raw).await? {
            ScanOutcome::NeedsAuthor(title) => {
                manual_entry(service, &mut lines, Some(title)).await?
            }
            ScanOutcome::NotFound => {
                report(&ScanOutcome::NotFound);
                manual_entry(service, &mut lines, None).await?
            }
            other => other,
        };
        report(&outcome);
    }

    tracing::info!("Session ended with {} records", service.table().len());
    Ok(())
}

async fn run(args: &[String]) -> Result<(), DomainError> {
    let mut config = Config::from_env();
    if let Some(pos) = args.iter().position(|arg| arg == "--csv") {
        if let Some(val) = args.get(pos + 1) {
            config.csv_path = val.into();
        }
    }

    let mut service = open_catalog(&config)?;
    tracing::info!(
        "Using {} with {} records",
        service.table().storage().path().display(),
        service.table().len()
    );

    if args.iter().any(|arg| arg == "--list") {
        for book in service.table().all_records_sorted() {
            println!("{}\n", book);
        }
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--refresh") {
        let report = service.refresh().await?;
        println!(
            "Refreshed {} of {} records with identifiers",
            report.updated, report.examined
        );
        return Ok(());
    }

    session(&mut service).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookscan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            if e.is_fatal() {
                eprintln!("Fatal: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
