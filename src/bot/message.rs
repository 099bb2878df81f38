//! Platform-neutral message model.

use std::sync::Arc;

/// One piece of an incoming message.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Plain(String),
    Image { url: String },
    At { user_id: String },
    /// The message being replied to, already broken into segments.
    Reply(Vec<Segment>),
}

/// A message as handed over by the platform adapter.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub sender_id: String,
    pub sender_name: String,
    /// The bot's own user id on this platform.
    pub self_id: String,
    pub segments: Vec<Segment>,
}

impl IncomingMessage {
    /// Plain text of the message itself (quoted content excluded).
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|seg| match seg {
                Segment::Plain(text) => Some(text.trim()),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Segments of the quoted message, if any.
    pub fn reply_segments(&self) -> Option<&[Segment]> {
        self.segments.iter().find_map(|seg| match seg {
            Segment::Reply(chain) if !chain.is_empty() => Some(chain.as_slice()),
            _ => None,
        })
    }
}

/// What the bot answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Image(Vec<u8>),
}

/// An input image for the engine, labelled with whose picture it is.
#[derive(Debug, Clone)]
pub struct MemeImage {
    pub name: String,
    pub data: Arc<[u8]>,
}

impl MemeImage {
    pub fn new(name: impl Into<String>, data: Arc<[u8]>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_skips_quote_and_media() {
        let msg = IncomingMessage {
            sender_id: "1".into(),
            sender_name: "alice".into(),
            self_id: "0".into(),
            segments: vec![
                Segment::Reply(vec![Segment::Plain("quoted".into())]),
                Segment::Plain(" say ".into()),
                Segment::At { user_id: "2".into() },
                Segment::Plain("hi".into()),
            ],
        };
        assert_eq!(msg.text(), "say hi");
        assert_eq!(msg.reply_segments().map(|s| s.len()), Some(1));
    }
}
