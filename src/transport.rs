//! Boundary with the chat transport
//!
//! The core never formats chat markup. Views build a [`Reply`] (one
//! content item plus rows of labelled buttons carrying navigation tokens)
//! and hand it to a [`ReplyChannel`]. Inbound interactions arrive as an
//! [`Event`].

use crate::cache::Payload;
use crate::error::MushafResult;
use crate::nav::NavigationToken;
use async_trait::async_trait;
use console::style;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Identifier of the user behind an event
pub type UserId = i64;

/// A labelled button that navigates with `token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: NavigationToken,
}

impl Button {
    pub fn new(label: impl Into<String>, token: NavigationToken) -> Self {
        Self {
            label: label.into(),
            token,
        }
    }
}

/// What a reply shows
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Image { payload: Payload, caption: String },
    Audio {
        url: String,
        title: String,
        performer: String,
    },
}

/// One outbound message
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: Content,
    /// Button rows, top to bottom
    pub buttons: Vec<Vec<Button>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Content::Text(text.into()),
            buttons: Vec::new(),
        }
    }

    pub fn image(payload: Payload, caption: impl Into<String>) -> Self {
        Self {
            content: Content::Image {
                payload,
                caption: caption.into(),
            },
            buttons: Vec::new(),
        }
    }

    pub fn audio(
        url: impl Into<String>,
        title: impl Into<String>,
        performer: impl Into<String>,
    ) -> Self {
        Self {
            content: Content::Audio {
                url: url.into(),
                title: title.into(),
                performer: performer.into(),
            },
            buttons: Vec::new(),
        }
    }

    /// Append a row of buttons; empty rows are skipped
    pub fn row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.buttons.push(row);
        }
        self
    }

    pub fn button(self, button: Button) -> Self {
        self.row(vec![button])
    }

    /// Text of a text reply, or the caption or title of the others
    pub fn summary(&self) -> &str {
        match &self.content {
            Content::Text(text) => text,
            Content::Image { caption, .. } => caption,
            Content::Audio { title, .. } => title,
        }
    }

    pub fn all_buttons(&self) -> impl Iterator<Item = &Button> {
        self.buttons.iter().flatten()
    }
}

/// Outbound side of the chat transport
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    async fn send(&self, reply: Reply) -> MushafResult<()>;
}

/// External yes/no check of a user's channel subscription
#[async_trait]
pub trait SubscriptionCheck: Send + Sync {
    async fn is_subscribed(&self, user: UserId) -> bool;
}

/// Subscription check used when no channel is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl SubscriptionCheck for AllowAll {
    async fn is_subscribed(&self, _user: UserId) -> bool {
        true
    }
}

/// What the user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Button press carrying a raw token
    Button(String),
    /// Free text
    Text(String),
    /// Slash command such as `/start`
    Command(String),
}

/// One inbound interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub user: UserId,
    pub kind: EventKind,
}

impl Event {
    pub fn button(user: UserId, token: impl Into<String>) -> Self {
        Self {
            user,
            kind: EventKind::Button(token.into()),
        }
    }

    pub fn text(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn command(user: UserId, command: impl Into<String>) -> Self {
        Self {
            user,
            kind: EventKind::Command(command.into()),
        }
    }

    /// Parse a console line: `/cmd`, `#token` for a button press, else text
    pub fn from_line(user: UserId, line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(token) = line.strip_prefix('#') {
            return Some(Self::button(user, token.trim()));
        }
        if line.starts_with('/') {
            return Some(Self::command(user, line));
        }
        Some(Self::text(user, line))
    }
}

/// Reply channel that prints to the terminal and remembers the last buttons
#[derive(Debug, Default)]
pub struct ConsoleChannel {
    last_buttons: Mutex<Vec<Button>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buttons of the most recent reply, in display order
    pub fn last_buttons(&self) -> Vec<Button> {
        lock(&self.last_buttons).clone()
    }

    /// Token of the `n`th (1-based) button of the most recent reply
    pub fn button_token(&self, n: usize) -> Option<NavigationToken> {
        let buttons = lock(&self.last_buttons);
        n.checked_sub(1)
            .and_then(|i| buttons.get(i))
            .map(|b| b.token.clone())
    }

    fn render(reply: &Reply) -> String {
        let mut out = String::new();
        match &reply.content {
            Content::Text(text) => out.push_str(text),
            Content::Image { payload, caption } => {
                out.push_str(&format!(
                    "{} {} bytes\n{}",
                    style("[image]").magenta(),
                    payload.len(),
                    caption
                ));
            }
            Content::Audio {
                url,
                title,
                performer,
            } => {
                out.push_str(&format!(
                    "{} {} - {}\n{}",
                    style("[audio]").magenta(),
                    title,
                    performer,
                    style(url).dim()
                ));
            }
        }
        out.push('\n');

        let mut n = 0;
        for row in &reply.buttons {
            let cells: Vec<String> = row
                .iter()
                .map(|button| {
                    n += 1;
                    format!("{} {}", style(format!("[{n}]")).cyan(), button.label)
                })
                .collect();
            out.push_str(&format!("  {}\n", cells.join("   ")));
        }
        out
    }
}

#[async_trait]
impl ReplyChannel for ConsoleChannel {
    async fn send(&self, reply: Reply) -> MushafResult<()> {
        let rendered = Self::render(&reply);
        *lock(&self.last_buttons) = reply.all_buttons().cloned().collect();

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{rendered}")
            .and_then(|_| stdout.flush())
            .map_err(|e| crate::error::MushafError::io("writing reply", e))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Channel that records every reply
    #[derive(Default)]
    pub struct RecordingChannel {
        replies: Mutex<Vec<Reply>>,
    }

    impl RecordingChannel {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn replies(&self) -> Vec<Reply> {
            lock(&self.replies).clone()
        }

        pub fn last(&self) -> Reply {
            lock(&self.replies)
                .last()
                .cloned()
                .expect("no reply was sent")
        }
    }

    #[async_trait]
    impl ReplyChannel for RecordingChannel {
        async fn send(&self, reply: Reply) -> MushafResult<()> {
            lock(&self.replies).push(reply);
            Ok(())
        }
    }

    /// Subscription check with a fixed answer
    pub struct FixedSubscription(pub bool);

    #[async_trait]
    impl SubscriptionCheck for FixedSubscription {
        async fn is_subscribed(&self, _user: UserId) -> bool {
            self.0
        }
    }
}
