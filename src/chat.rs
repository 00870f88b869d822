use crate::error::{AgriWeatherError, Result};
use crate::logic::ConversationEngine;
use crate::models::InboundEvent;
use dialoguer::Input;

#[derive(Debug, PartialEq)]
enum ChatInput {
    Quit,
    Message(InboundEvent),
}

fn parse_line(sender: &str, line: &str) -> ChatInput {
    let line = line.trim();
    if line == "/quit" {
        return ChatInput::Quit;
    }

    match line.strip_prefix("/loc") {
        Some(rest) => {
            let (lat, lon) = rest.split_once(',').unwrap_or((rest, ""));
            ChatInput::Message(
                InboundEvent::text(sender, "").with_location(lat.trim(), lon.trim()),
            )
        }
        None => ChatInput::Message(InboundEvent::text(sender, line)),
    }
}

/// Drive a conversation from the terminal, one prompt per inbound message.
pub async fn run(engine: &ConversationEngine, sender: &str) -> Result<()> {
    println!();
    println!("Chatting as '{}'. Type `hi` to begin.", sender);
    println!("  /loc <lat>,<lon>  share a location");
    println!("  /quit             exit");
    println!();

    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AgriWeatherError::Config(format!("Input error: {}", e)))?;

        match parse_line(sender, &line) {
            ChatInput::Quit => break,
            ChatInput::Message(event) => {
                let reply = engine.handle(&event).await;
                println!();
                println!("{}", reply);
                println!();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quit_and_text() {
        assert_eq!(parse_line("me", " /quit "), ChatInput::Quit);
        assert_eq!(
            parse_line("me", "rice, s"),
            ChatInput::Message(InboundEvent::text("me", "rice, s"))
        );
    }

    #[test]
    fn parses_location_share() {
        assert_eq!(
            parse_line("me", "/loc 26.4499, 80.3319"),
            ChatInput::Message(InboundEvent::text("me", "").with_location("26.4499", "80.3319"))
        );
        assert_eq!(
            parse_line("me", "/loc nowhere"),
            ChatInput::Message(InboundEvent::text("me", "").with_location("nowhere", ""))
        );
    }
}
