//! Interactive APDU shell

use std::io::{self, BufRead, Write};

use apdu_core::CardTransport;

use crate::utils;

pub(crate) fn run<T>(transport: &mut T) -> Result<(), Box<dyn std::error::Error>>
where
    T: CardTransport,
    T::Error: std::error::Error + 'static,
{
    println!("APDU Shell - Enter commands in hex format or 'help' for assistance");
    println!("Examples:");
    println!("  00A40004023F00");
    println!("  00 A4 00 04 02 3F 00");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(Ok(input)) => input,
            _ => break,
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" | "q" => break,

            "help" | "?" => {
                println!("Commands:");
                println!("  <hex>     - Send APDU command (e.g., '00A40004023F00')");
                println!("  reset     - Close and reopen the modem channel");
                println!("  help      - Show this help");
                println!("  exit      - Exit the shell");
            }

            "reset" => match transport.reset() {
                Ok(()) => println!("Channel reset successfully"),
                Err(e) => println!("Error resetting channel: {e}"),
            },

            _ => {
                if let Err(e) = utils::send_command(transport, input) {
                    println!("Error: {e}");
                }
            }
        }
    }

    Ok(())
}
