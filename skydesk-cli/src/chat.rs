use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use skydesk_agent::Session;

use crate::print_answer;

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Help,
    Clear,
    Skip,
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => Input::Skip,
        "quit" | "exit" | "bye" => Input::Quit,
        "help" => Input::Help,
        "clear" => Input::Clear,
        _ => Input::Message(trimmed),
    }
}

pub async fn run(mut session: Session, verbose: bool) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    println!("Welcome to skydesk airline support.");
    println!("I can help with flight information, bookings and general travel questions.");
    println!("Type 'quit', 'exit' or 'bye' to leave, 'help' for sample flights, 'clear' to start over.");

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        match classify(&line) {
            Input::Skip => continue,
            Input::Quit => break,
            Input::Help => print_help(&session),
            Input::Clear => {
                session.reset_conversation();
                println!("Conversation history cleared.");
            }
            Input::Message(message) => {
                let _ = editor.add_history_entry(message);
                let report = session.process_turn(message).await;
                print_answer(&report, verbose)?;
            }
        }
    }

    println!("Thank you for contacting skydesk support. Safe travels!");
    Ok(())
}

fn print_help(session: &Session) {
    println!("Sample flights you can ask about:");
    for flight in session.flights().list_all() {
        println!(
            "• {}: {} → {}",
            flight.flight_number, flight.departure_city, flight.arrival_city
        );
    }
    println!("Try asking:");
    println!("• 'What's the status of flight AA123?'");
    println!("• 'Find flights from Chicago to Miami'");
    println!("• 'Can you help me with baggage allowance?'");
    println!("• Type 'clear' to reset conversation history");
}
