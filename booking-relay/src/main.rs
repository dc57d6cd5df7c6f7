/// Booking relay CLI
/// Runs each stdin line through the same orchestrator the HTTP server uses
/// and prints the outcome as JSON.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use booking_relay::{init_tracing, BookingOrchestrator, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenv::dotenv();
    init_tracing();

    let config = RelayConfig::from_env()?;
    let relay = BookingOrchestrator::from_config(&config)?;

    println!("Booking relay (assistant {})", config.assistant_id);
    println!("Type a booking message, or 'exit' to quit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut reader = stdin.lock();

    loop {
        print!("\nYou: ");
        stdout.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let outcome = relay.handle(input).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    Ok(())
}
