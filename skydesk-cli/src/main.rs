//! skydesk - airline customer support assistant
//!
//! Usage:
//!   skydesk                      Interactive chat (same as `skydesk chat`)
//!   skydesk ask "question"       Answer one question and exit
//!   skydesk demo                 Run the sample customer questions
//!   skydesk flights              List the sample flight schedule

mod args;
mod chat;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use skydesk_agent::{Session, TurnReport};
use skydesk_flights::FlightStore;
use skydesk_llm::OpenAiCompatibleClient;
use tracing_subscriber::EnvFilter;

use args::{Cli, Command};

const DEMO_QUESTIONS: &[&str] = &[
    "What's the status of flight AA123?",
    "Can you find flights from New York to Los Angeles?",
    "What flights do you have available today?",
    "What's your baggage policy?",
    "Is flight DL456 delayed?",
    "Show me flights from San Francisco to Seattle",
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // stderr keeps log lines out of the conversation on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let store = Arc::new(FlightStore::sample());

    match cli.command() {
        Command::Flights => {
            print_flights(&store);
            Ok(())
        }
        Command::Ask { question } => {
            let mut session = open_session(&cli, store)?;
            let report = session.process_turn(&question).await;
            print_answer(&report, cli.verbose)
        }
        Command::Demo => {
            let mut session = open_session(&cli, store)?;
            run_demo(&mut session, cli.verbose).await
        }
        Command::Chat => {
            let session = open_session(&cli, store)?;
            chat::run(session, cli.verbose).await
        }
    }
}

fn open_session(cli: &Cli, store: Arc<FlightStore>) -> Result<Session> {
    let config = cli.llm.to_config().context("invalid LLM settings")?;
    tracing::info!(?config, "connecting to model provider");
    let client = OpenAiCompatibleClient::new(config).context("could not build LLM client")?;
    let session = Session::new(Arc::new(client), store).with_config(cli.session_config());
    tracing::info!(
        session_id = %session.id(),
        max_tool_rounds = session.config().max_tool_rounds,
        "session ready"
    );
    Ok(session)
}

fn print_flights(store: &FlightStore) {
    println!("Available flights ({}):", store.len());
    for flight in store.list_all() {
        println!(
            "• {}: {} → {} ({})",
            flight.flight_number, flight.departure_city, flight.arrival_city, flight.status
        );
    }
}

pub(crate) fn print_answer(report: &TurnReport, verbose: bool) -> Result<()> {
    println!("Support: {}", report.answer);
    if verbose {
        let details = serde_json::to_string_pretty(report).context("could not encode turn report")?;
        eprintln!("{details}");
    }
    Ok(())
}

async fn run_demo(session: &mut Session, verbose: bool) -> Result<()> {
    println!("Customer service simulation with tool calling");
    println!("{}", "=".repeat(60));

    for (index, question) in DEMO_QUESTIONS.iter().enumerate() {
        println!("\nCustomer {}: {question}", index + 1);
        let report = session.process_turn(question).await;
        print_answer(&report, verbose)?;
        println!("{}", "-".repeat(50));
    }

    println!("\nTools available to the assistant:");
    for tool in session.catalog().describe_tools() {
        println!("• {}: {}", tool.name, tool.description);
    }
    println!();
    print_flights(session.flights());
    Ok(())
}
