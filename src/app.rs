use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use crate::config::Config;
use crate::error::ChatError;
use crate::orchestrator;
use crate::recipes::RecipeService;
use crate::spoonacular::SpoonacularClient;
use crate::state::SessionState;

pub struct App {
    pub should_quit: bool,
    pub session: SessionState,
    pub has_api_key: bool,

    // In-flight search+details sequence, at most one
    pub query_task: Option<JoinHandle<String>>,
    service: Arc<dyn RecipeService>,
    transcript_updates: watch::Receiver<usize>,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, set during render
    pub chat_width: u16,  // inner width of the chat area, set during render

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing indicator dots
}

impl App {
    pub fn new(config: &Config) -> Self {
        let client = SpoonacularClient::new(config.base_url(), config.api_key());
        Self::with_service(Arc::new(client), config.has_api_key())
    }

    pub fn with_service(service: Arc<dyn RecipeService>, has_api_key: bool) -> Self {
        let session = SessionState::new();
        let transcript_updates = session.subscribe();

        Self {
            should_quit: false,
            session,
            has_api_key,
            query_task: None,
            service,
            transcript_updates,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.session.is_waiting()
    }

    /// Submit whatever is in the input box
    pub fn submit(&mut self) {
        let raw_text = self.session.pending_input.clone();
        let Some(query) = orchestrator::submit_query(&mut self.session, &raw_text) else {
            return;
        };

        info!(query = %query.trim(), "submitting recipe query");
        let service = Arc::clone(&self.service);
        self.query_task = Some(tokio::spawn(async move {
            orchestrator::run_sequence(service.as_ref(), &query).await
        }));
    }

    pub fn query_in_flight(&self) -> bool {
        self.query_task.is_some()
    }

    /// Resolves when the in-flight sequence finishes. Pending forever if none.
    pub async fn wait_for_reply(&mut self) -> Result<String, JoinError> {
        match self.query_task.as_mut() {
            Some(task) => task.await,
            None => std::future::pending().await,
        }
    }

    /// Hand the sequence result back to the session. A task that panicked or
    /// was cancelled still leaves the session idle.
    pub fn finish_query(&mut self, joined: Result<String, JoinError>) {
        self.query_task = None;
        let reply = match joined {
            Ok(reply) => reply,
            Err(e) => {
                error!("query task did not complete: {e}");
                ChatError::Transport(e.into()).to_string()
            }
        };
        orchestrator::complete(&mut self.session, reply);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Jump to the bottom whenever something was appended since the last check
    pub fn follow_transcript(&mut self) {
        if self.transcript_updates.has_changed().unwrap_or(false) {
            self.transcript_updates.borrow_and_update();
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(self.max_scroll());
    }

    pub fn scroll_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.visible_height() / 2);
    }

    pub fn scroll_page_down(&mut self) {
        let half = self.visible_height() / 2;
        self.chat_scroll = self.chat_scroll.saturating_add(half).min(self.max_scroll());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    fn max_scroll(&self) -> u16 {
        self.total_chat_lines().saturating_sub(self.visible_height())
    }

    /// Rendered line count of the transcript, including wrapping
    fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.transcript() {
            total_lines = total_lines.saturating_add(1); // "You:" / "Bot:"
            for line in msg.text.lines() {
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 {
                    1
                } else {
                    char_count.div_ceil(wrap_width)
                };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // blank line after message
        }

        if self.is_waiting() {
            total_lines = total_lines.saturating_add(1); // typing indicator
        }

        total_lines
    }
}
