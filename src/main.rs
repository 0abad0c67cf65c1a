use clap::Parser;
use skysearch::utils::{logger, validation::Validate};
use skysearch::{
    Airline, CliConfig, CompletionKind, EndpointsConfig, FileAuditSink, LogAlert, SearchEngine,
    SearchError, SourceFetcher, VietJetFetcher, VietnamAirlinesFetcher,
};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting skysearch CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let endpoints = EndpointsConfig::from_file(Path::new(&config.endpoints_file))?;
    let permitted = config.permitted_sources()?;

    let mut fetchers: Vec<Arc<dyn SourceFetcher>> = Vec::new();
    if permitted.contains(&Airline::VJ) {
        fetchers.push(Arc::new(VietJetFetcher::new(
            endpoints.for_airline(Airline::VJ),
        )));
    }
    if permitted.contains(&Airline::VNA) {
        fetchers.push(Arc::new(VietnamAirlinesFetcher::new(
            endpoints.for_airline(Airline::VNA),
        )));
    }

    let engine = SearchEngine::new(
        Arc::new(LogAlert),
        Arc::new(FileAuditSink::new(config.audit_log.clone().into())),
    );

    let mut session = match engine.search("cli", config.to_request(), fetchers, config.sort_by()?)
    {
        Ok(session) => session,
        Err(SearchError::NoSourcesAuthorized) => {
            eprintln!("❌ You are not authorized to search any flight source.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    while let Some(update) = session.next_update().await {
        tracing::info!(
            "📡 {} flights shown, {} source(s) unavailable",
            update.results.len(),
            update.errors.len()
        );

        if !update.done {
            continue;
        }

        for flight in &update.results {
            println!(
                "{}  {}  {}  {} VND  {} stops  {} seats",
                flight.id,
                flight.airline,
                flight.departure.time,
                flight.price,
                flight.departure.stops,
                flight.available_seats
            );
        }

        for (airline, reason) in &update.errors {
            println!("⚠️  {} is unavailable right now: {}", airline, reason);
        }

        match update.completion {
            Some(CompletionKind::TotalFailure) => {
                println!("⚠️  No sources responded. Please try again later.");
            }
            Some(CompletionKind::Success) if update.results.is_empty() => {
                println!("No flights match this search.");
            }
            _ => {}
        }

        if update.more_available {
            println!("💡 More results are available: relax the filters to see them.");
        }
        break;
    }

    Ok(())
}
