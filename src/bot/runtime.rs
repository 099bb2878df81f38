//! Bot runtime - console runner.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::console::{parse_line, quoted};
use super::dispatcher::Dispatcher;
use super::message::{IncomingMessage, Reply, Segment};
use crate::config::Config;

/// Read messages from stdin until EOF or Ctrl-C and print the bot's replies.
pub async fn run(config: &Config, dispatcher: Dispatcher) -> anyhow::Result<()> {
    info!("Starting console runtime, type a message (Ctrl-D to quit)...");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_quote: Option<Vec<Segment>> = None;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
        };

        if let Some(rest) = quoted(&line) {
            pending_quote = Some(parse_line(rest));
            continue;
        }

        let mut segments = parse_line(&line);
        if segments.is_empty() {
            continue;
        }
        if let Some(quote) = pending_quote.take() {
            segments.insert(0, Segment::Reply(quote));
        }

        let msg = IncomingMessage {
            sender_id: config.console_user_id.clone(),
            sender_name: config.console_user_name.clone(),
            self_id: config.self_id.clone(),
            segments,
        };

        match dispatcher.handle(&msg).await {
            Some(Reply::Text(text)) => println!("{}", text),
            Some(Reply::Image(bytes)) => {
                println!("<image, {} bytes>", bytes.len());
                println!("{}", String::from_utf8_lossy(&bytes));
            }
            None => debug!("No reply"),
        }
    }

    let stats = dispatcher.state().avatars.stats();
    info!(
        "Avatar cache: {} hits, {} misses, {} evictions",
        stats.hits, stats.misses, stats.evictions
    );
    info!("Shutting down");
    Ok(())
}
