//! Console command - drive the bot from a terminal
//!
//! Each stdin line becomes one event: a bare number presses that button of
//! the last reply, `#token` presses a raw token, `/cmd` is a command and
//! anything else is free text.

use crate::app::AppContext;
use crate::cli::args::ConsoleArgs;
use crate::config::Config;
use crate::error::{MushafError, MushafResult};
use crate::transport::{ConsoleChannel, Event, UserId};
use crate::ui::{self, UiContext};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// What one input line asks for
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Skip,
    Event(Event),
}

pub async fn execute(args: ConsoleArgs, config: &Config) -> MushafResult<()> {
    let ui = UiContext::detect();
    let ctx = Arc::new(AppContext::from_config(config.clone())?);
    let sweeper = ctx.spawn_sweeper();
    let channel = ConsoleChannel::new();

    ui::intro(&ui, "Mushaf console");
    if !ctx.search().is_enabled() {
        ui::step_warn_hint(&ui, "Search is disabled", "Set MUSHAF_SEARCH_API_KEY to enable it");
    }
    ui::remark(&ui, "Press a button by number, #token for a raw token, text to search, q to quit");

    ctx.handle_event(Event::command(args.user, "/start"), &channel)
        .await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|e| MushafError::io("reading stdin", e))?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match parse_line(&channel, args.user, &line) {
            Input::Quit => break,
            Input::Skip => continue,
            Input::Event(event) => {
                let outcome = ctx.handle_event(event, &channel).await;
                debug!(?outcome, "Event handled");
            }
        }
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }
    ui::outro_success(&ui, "Goodbye");
    Ok(())
}

fn parse_line(channel: &ConsoleChannel, user: UserId, line: &str) -> Input {
    let line = line.trim();
    if matches!(line, "q" | "quit" | "exit") {
        return Input::Quit;
    }

    if let Ok(n) = line.parse::<usize>() {
        return match channel.button_token(n) {
            Some(token) => Input::Event(Event::button(user, token.into_string())),
            None => {
                warn!(n, "No such button on the last reply");
                Input::Skip
            }
        };
    }

    Event::from_line(user, line).map_or(Input::Skip, Input::Event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{NavigationCodec, NavigationIntent};
    use crate::transport::{Button, Reply, ReplyChannel};

    #[test]
    fn quit_and_blank_lines() {
        let channel = ConsoleChannel::new();
        assert_eq!(parse_line(&channel, 1, " quit "), Input::Quit);
        assert_eq!(parse_line(&channel, 1, "   "), Input::Skip);
    }

    #[tokio::test]
    async fn numbers_press_buttons_of_last_reply() {
        let channel = ConsoleChannel::new();
        let token = NavigationCodec::new(64)
            .encode(&NavigationIntent::surah(2))
            .unwrap();
        channel
            .send(Reply::text("pick").button(Button::new("Al-Baqara", token)))
            .await
            .unwrap();

        assert_eq!(parse_line(&channel, 7, "1"), Input::Event(Event::button(7, "sura:2")));
        assert_eq!(parse_line(&channel, 7, "2"), Input::Skip);
    }

    #[test]
    fn other_lines_become_events() {
        let channel = ConsoleChannel::new();
        assert_eq!(parse_line(&channel, 1, "/menu"), Input::Event(Event::command(1, "/menu")));
        assert_eq!(parse_line(&channel, 1, "#idx:3"), Input::Event(Event::button(1, "idx:3")));
        assert_eq!(parse_line(&channel, 1, "mercy"), Input::Event(Event::text(1, "mercy")));
    }
}
