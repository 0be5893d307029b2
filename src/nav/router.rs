//! Dispatch of navigation tokens to view handlers

use super::{NavigationCodec, NavigationIntent, ViewKind};
use crate::app::AppContext;
use crate::error::{MushafError, MushafResult, Notice};
use crate::transport::{Button, Reply, ReplyChannel, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, field, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Renders one view from its intent
#[async_trait]
pub trait ViewHandler: Send + Sync {
    async fn render(
        &self,
        intent: &NavigationIntent,
        user: UserId,
        ctx: &AppContext,
    ) -> MushafResult<Reply>;
}

/// How an event ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The view rendered and its reply was handed to the channel
    Handled(ViewKind),
    /// A short notice was sent instead
    Fallback(Notice),
}

/// Tag based router from tokens to handlers
#[derive(Clone)]
pub struct Router {
    codec: NavigationCodec,
    handlers: HashMap<ViewKind, Arc<dyn ViewHandler>>,
}

impl Router {
    pub fn new(codec: NavigationCodec) -> Self {
        Self {
            codec,
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `view`, replacing any previous one
    pub fn register(mut self, view: ViewKind, handler: impl ViewHandler + 'static) -> Self {
        self.handlers.insert(view, Arc::new(handler));
        self
    }

    pub fn codec(&self) -> &NavigationCodec {
        &self.codec
    }

    /// Views with a registered handler
    pub fn registered(&self) -> Vec<ViewKind> {
        let mut views: Vec<ViewKind> = self.handlers.keys().copied().collect();
        views.sort();
        views
    }

    /// Whether a raw token names a view this router can render
    pub fn recognizes(&self, raw: &str) -> bool {
        self.codec
            .decode(raw)
            .map(|intent| self.handlers.contains_key(&intent.view))
            .unwrap_or(false)
    }

    /// Decode `raw` and render its view, falling back to a notice on any failure
    pub async fn dispatch(
        &self,
        raw: &str,
        user: UserId,
        ctx: &AppContext,
        channel: &dyn ReplyChannel,
    ) -> Dispatch {
        let span = info_span!("event", event_id = %Uuid::new_v4(), user, view = field::Empty);

        async {
            match self.codec.decode(raw) {
                Ok(intent) => self.render_and_send(&intent, user, ctx, channel).await,
                Err(err) => {
                    warn!(error = %err, "Undecodable navigation token");
                    self.fallback(&err, channel).await
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Render an already decoded intent
    pub async fn dispatch_intent(
        &self,
        intent: &NavigationIntent,
        user: UserId,
        ctx: &AppContext,
        channel: &dyn ReplyChannel,
    ) -> Dispatch {
        let span = info_span!("event", event_id = %Uuid::new_v4(), user, view = field::Empty);
        self.render_and_send(intent, user, ctx, channel)
            .instrument(span)
            .await
    }

    async fn render_and_send(
        &self,
        intent: &NavigationIntent,
        user: UserId,
        ctx: &AppContext,
        channel: &dyn ReplyChannel,
    ) -> Dispatch {
        Span::current().record("view", intent.view.tag());

        let Some(handler) = self.handlers.get(&intent.view) else {
            let err = MushafError::UnknownView(intent.view.tag().to_string());
            warn!(error = %err, "No handler for view");
            return self.fallback(&err, channel).await;
        };

        match handler.render(intent, user, ctx).await {
            Ok(reply) => match channel.send(reply).await {
                Ok(()) => {
                    debug!("View rendered");
                    Dispatch::Handled(intent.view)
                }
                Err(err) => {
                    warn!(error = %err, "Sending reply failed");
                    Dispatch::Fallback(err.notice())
                }
            },
            Err(err) => {
                warn!(error = %err, "View failed");
                self.fallback(&err, channel).await
            }
        }
    }

    /// Send the notice for `err` with a way back to the main menu
    pub async fn fallback(&self, err: &MushafError, channel: &dyn ReplyChannel) -> Dispatch {
        let notice = err.notice();
        self.send_notice(notice, channel).await;
        Dispatch::Fallback(notice)
    }

    pub async fn send_notice(&self, notice: Notice, channel: &dyn ReplyChannel) {
        let mut reply = Reply::text(notice.message());
        if let Ok(home) = self.codec.encode(&NavigationIntent::main_menu()) {
            reply = reply.button(Button::new("Main menu", home));
        }
        if let Err(err) = channel.send(reply).await {
            warn!(error = %err, "Sending notice failed");
        }
    }
}
