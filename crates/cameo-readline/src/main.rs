//! Cameo terminal client.
//!
//! Browse the persona catalog one card at a time, pick a persona, then
//! chat with it. The discovery deck keeps the next few cards buffered and
//! their profiles enriched in the background, so browsing never waits on
//! the catalog.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cameo_application::{ChatSession, DiscoveryDeck};
use cameo_core::config;
use cameo_core::conversation::ChatBackend;
use cameo_core::persona::{Enrichment, PersonaCatalog, PersonaSummary};
use cameo_interaction::PersonaApiClient;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

/// What the user did with the card on screen.
enum Gesture {
    /// Discard the card and show the next one.
    Reject,
    /// Pick this persona and start chatting.
    Accept,
    /// Leave without picking.
    Quit,
}

fn parse_gesture(input: &str) -> Gesture {
    match input {
        "y" | "yes" | "pick" => Gesture::Accept,
        "q" | "quit" | "exit" => Gesture::Quit,
        _ => Gesture::Reject,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config()?;
    let client = Arc::new(PersonaApiClient::from_config(&config));

    let catalog: Arc<dyn PersonaCatalog> = client.clone();
    let mut deck = DiscoveryDeck::new(catalog);
    if let Some(lookahead) = config.lookahead {
        deck = deck.with_lookahead(lookahead);
    }
    deck.ensure_lookahead().await;

    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== Cameo ===".bright_magenta().bold());
    println!(
        "{}",
        "Browse personas: [Enter/n] next, [y] chat, [q] quit.".bright_black()
    );
    println!();

    let Some(persona) = run_selection(&mut rl, &deck).await? else {
        println!("{}", "Goodbye!".bright_green());
        return Ok(());
    };

    // The deck's lifetime ends with the selection; late fetch results for
    // it are discarded. Grab the chosen card's enrichment first.
    let enrichment = deck.enrichment_of(&persona.id).await;
    deck.close().await;

    run_chat(&mut rl, client, persona, enrichment).await
}

/// Card-browsing loop. Returns the chosen persona, or `None` on quit.
async fn run_selection(
    rl: &mut DefaultEditor,
    deck: &DiscoveryDeck,
) -> Result<Option<PersonaSummary>> {
    loop {
        let current = deck.current().await;
        match &current {
            Some(persona) => render_card(deck, persona).await,
            None if deck.is_exhausted().await => {
                println!("{}", "No more personas.".yellow());
            }
            None => {
                // Empty but not exhausted: the buffer is filling, or the
                // last fetch failed. Another gesture retries it.
                println!("{}", "Loading personas...".bright_black());
            }
        }

        match rl.readline(">> ") {
            Ok(line) => match parse_gesture(line.trim()) {
                Gesture::Accept => {
                    if let Some(persona) = current {
                        return Ok(Some(persona));
                    }
                    println!("{}", "Nothing to pick yet.".bright_black());
                }
                Gesture::Reject => deck.advance().await,
                Gesture::Quit => return Ok(None),
            },
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'q' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
}

async fn render_card(deck: &DiscoveryDeck, persona: &PersonaSummary) {
    println!();
    println!("{}", persona.name.bright_magenta().bold());
    match deck.enrichment_of(&persona.id).await {
        Some(entry) => {
            match &entry.description {
                Some(description) => println!("{}", description.bright_blue()),
                None => println!("{}", "No description available.".bright_black()),
            }
            match &entry.image {
                Some(image) => println!(
                    "{}",
                    format!("[portrait: {} bytes]", image.byte_len()).bright_black()
                ),
                None => println!("{}", "[no portrait]".bright_black()),
            }
        }
        None => println!("{}", "Fetching profile...".bright_black()),
    }
    if let Some(next) = deck.peek_next().await {
        println!("{}", format!("Up next: {}", next.name).bright_black());
    }
}

/// Conversation loop with the chosen persona.
async fn run_chat(
    rl: &mut DefaultEditor,
    client: Arc<PersonaApiClient>,
    persona: PersonaSummary,
    enrichment: Option<Enrichment>,
) -> Result<()> {
    println!();
    println!(
        "{}",
        format!("=== Chatting with {} ===", persona.name)
            .bright_magenta()
            .bold()
    );

    // Reuse the portrait the deck already joined; if the user browsed past
    // this card too fast for enrichment to land, fetch it once here.
    let portrait = match enrichment.and_then(|entry| entry.image) {
        Some(image) => Some(image),
        None => client.fetch_image(&persona.id).await.ok(),
    };
    if let Some(image) = &portrait {
        println!(
            "{}",
            format!("[portrait: {} bytes]", image.byte_len()).bright_black()
        );
    }
    println!("{}", "Type a message, or 'quit' to leave.".bright_black());
    println!();

    let backend: Arc<dyn ChatBackend> = client;
    let session = ChatSession::new(backend, persona.id.clone());

    loop {
        match rl.readline("you >> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match send_with_typing_indicator(&session, trimmed).await {
                    Ok(reply) => {
                        println!("{}", format!("[{}]", persona.name).bright_magenta());
                        for line in reply.lines() {
                            println!("{}", line.bright_blue());
                        }
                        println!();
                    }
                    Err(err) => {
                        println!("{}", format!("Error: {}", err).red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Sends the prompt while animating a `Typing ...` line in place, redrawn
/// every 300 ms until the reply lands.
async fn send_with_typing_indicator(
    session: &ChatSession,
    prompt: &str,
) -> cameo_core::Result<String> {
    let send = session.send(prompt);
    tokio::pin!(send);

    let mut interval = tokio::time::interval(Duration::from_millis(300));
    let mut dots = 0usize;
    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            _ = interval.tick() => {
                dots = (dots % 3) + 1;
                print!("\r{}{}   ", "Typing ".bright_black(), ".".repeat(dots));
                let _ = std::io::stdout().flush();
            }
        }
    };

    // Clear the indicator line before printing the reply.
    print!("\r{}\r", " ".repeat(12));
    let _ = std::io::stdout().flush();
    result
}
