//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ChatClient for the conversation
//! - DisplayState for rendering
//!
//! # Screen layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │                lolGPT                │  header
//! │   Ask your questions about ...       │
//! │──────────────────────────────────────│
//! │ You: Who counters Yasuo?             │  transcript
//! │ lolGPT: Malph|                       │
//! │──────────────────────────────────────│
//! │ > _                                  │  input
//! │ Typing... | Enter send | Esc quit    │  status
//! └──────────────────────────────────────┘
//! ```

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::Terminal;
use unicode_width::UnicodeWidthStr;

use lolgpt_core::{AnswerBackend, ChatState, HttpAnswerBackend, SubmitError};

use crate::chat_client::ChatClient;
use crate::display::{DisplayState, LineKind};
use crate::theme::{DIM_GRAY, ERROR_RED, HEXTECH_BLUE, LOLGPT_GOLD, STATUS_GRAY, USER_GREEN};

/// Header height (title, description, separator)
const HEADER_HEIGHT: u16 = 3;

/// Input box height (separator + text lines)
const INPUT_HEIGHT: u16 = 5;

/// Status bar height
const STATUS_HEIGHT: u16 = 1;

/// Redraw at least this often, even when nothing happens
const FRAME_INTERVAL: Duration = Duration::from_millis(250);

/// Product name shown in the header
pub const TITLE: &str = "lolGPT";

/// One-line description shown under the title
pub const DESCRIPTION: &str = "Ask your questions about patch notes, builds, or game mechanics. \
lolGPT helps you improve with a League of Legends specialized AI.";

/// Shown in the input box while it is empty
pub const PLACEHOLDER: &str = "Ask a question about League of Legends...";

/// Lines scrolled per mouse wheel step
const WHEEL_LINES: usize = 3;

/// Main application state
pub struct App<B: AnswerBackend = HttpAnswerBackend> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Chat Integration ===
    /// Client for the embedded controller
    client: ChatClient<B>,
    /// Display state derived from ChatMessages
    display: DisplayState,

    // === View State ===
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,
    /// Why the last submission was refused, until the next key press
    notice: Option<String>,
    /// Terminal size
    size: (u16, u16),
}

impl<B: AnswerBackend + 'static> App<B> {
    /// Create a new App instance
    pub fn new(client: ChatClient<B>, size: (u16, u16)) -> Self {
        Self {
            running: true,
            client,
            display: DisplayState::new(),
            scroll_offset: 0,
            total_lines: 0,
            notice: None,
            size,
        }
    }

    /// Whether the event loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Embedded client
    pub fn client(&self) -> &ChatClient<B> {
        &self.client
    }

    /// Embedded client, mutably
    pub fn client_mut(&mut self) -> &mut ChatClient<B> {
        &mut self.client
    }

    /// Lines scrolled up from the newest content
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Refusal notice for the last submission, if any
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Main event loop
    pub async fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();
        let mut frame_tick = tokio::time::interval(FRAME_INTERVAL);

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                        None => self.quit(),
                    }
                }

                // Answer arrived, reveal ticked, ...
                () = self.client.wait() => {}

                _ = frame_tick.tick() => {}
            }

            self.sync();
            self.render(terminal)?;
        }

        Ok(())
    }

    /// Apply pending background events and controller messages
    pub fn sync(&mut self) {
        self.client.poll();

        for msg in self.client.recv_all() {
            // Follow the newest content
            if self.display.apply_message(msg) {
                self.scroll_offset = 0;
            }
        }
    }

    /// Handle one terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.scroll_up(WHEEL_LINES),
                MouseEventKind::ScrollDown => self.scroll_down(WHEEL_LINES),
                _ => {}
            },
            Event::Resize(w, h) => self.size = (w, h),
            Event::Paste(text) => self.client.input_mut().insert_str(&text),
            _ => {}
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        self.notice = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            // Quit
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if ctrl => self.quit(),

            // New conversation
            KeyCode::Char('l') if ctrl => {
                self.client.reset();
                self.scroll_offset = 0;
            }

            // Newline in the question
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.client.input_mut().insert('\n');
            }

            // Submit message
            KeyCode::Enter => match self.client.submit_input() {
                Ok(_) => self.scroll_offset = 0,
                // Nothing typed, nothing to say
                Err(SubmitError::EmptyInput) => {}
                Err(reason) => self.notice = Some(reason.to_string()),
            },

            // Typing
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.client.input_mut().insert(c);
            }
            KeyCode::Backspace => {
                self.client.input_mut().backspace();
            }

            // Conversation scrolling
            KeyCode::PageUp => self.scroll_up(self.page_size()),
            KeyCode::PageDown => self.scroll_down(self.page_size()),
            KeyCode::Home if ctrl => self.scroll_offset = self.total_lines.saturating_sub(1),
            KeyCode::End if ctrl => self.scroll_offset = 0,

            _ => {}
        }
    }

    fn quit(&mut self) {
        self.client.shutdown();
        self.running = false;
    }

    fn transcript_height(&self) -> u16 {
        self.size
            .1
            .saturating_sub(HEADER_HEIGHT + INPUT_HEIGHT + STATUS_HEIGHT)
    }

    fn page_size(&self) -> usize {
        usize::from(self.transcript_height() / 2).max(1)
    }

    fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max_scroll);
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Render the UI
    pub fn render<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            self.size = (area.width, area.height);
            let buf = frame.buffer_mut();

            self.render_header(buf, area);
            self.render_conversation(buf, area);
            self.render_input(buf, area);
            self.render_status(buf, area);
        })?;

        Ok(())
    }

    /// Render title and description
    fn render_header(&self, buf: &mut Buffer, area: Rect) {
        if area.height < HEADER_HEIGHT {
            return;
        }

        let centered = |text: &str| {
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            area.x + area.width.saturating_sub(width) / 2
        };

        buf.set_string(
            centered(TITLE),
            area.y,
            TITLE,
            Style::default().fg(LOLGPT_GOLD).add_modifier(Modifier::BOLD),
        );
        buf.set_stringn(
            centered(DESCRIPTION),
            area.y + 1,
            DESCRIPTION,
            usize::from(area.width),
            Style::default().fg(DIM_GRAY),
        );

        let separator = "─".repeat(usize::from(area.width));
        buf.set_string(area.x, area.y + 2, &separator, Style::default().fg(DIM_GRAY));
    }

    /// Render the transcript and typing bubble
    fn render_conversation(&mut self, buf: &mut Buffer, area: Rect) {
        let height = usize::from(self.transcript_height());
        let width = usize::from(area.width.saturating_sub(2));

        if width < 10 || height < 1 {
            return;
        }

        let lines = self.display.transcript_lines(width);
        self.total_lines = lines.len();

        // Clamp scroll offset
        let max_scroll = self.total_lines.saturating_sub(height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        // Calculate visible range
        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        let top = area.y + HEADER_HEIGHT;
        for (i, line) in lines[visible_start..visible_end].iter().enumerate() {
            let style = match line.kind {
                LineKind::User => Style::default().fg(USER_GREEN),
                LineKind::Assistant => Style::default().fg(LOLGPT_GOLD),
                LineKind::Typing => Style::default()
                    .fg(LOLGPT_GOLD)
                    .add_modifier(Modifier::ITALIC),
                LineKind::Spacer => Style::default(),
            };
            let y = top + u16::try_from(i).unwrap_or(u16::MAX);
            buf.set_stringn(area.x + 1, y, &line.text, width, style);
        }

        if self.scroll_offset > 0 {
            let marker = format!(" ↓ {} more ", self.scroll_offset);
            let x = area.x + area.width.saturating_sub(u16::try_from(marker.width()).unwrap_or(0) + 1);
            let y = top + self.transcript_height().saturating_sub(1);
            buf.set_string(x, y, &marker, Style::default().fg(HEXTECH_BLUE));
        }
    }

    /// Render input box
    fn render_input(&self, buf: &mut Buffer, area: Rect) {
        let top = area
            .y
            .saturating_add(area.height.saturating_sub(INPUT_HEIGHT + STATUS_HEIGHT));
        let text_height = usize::from(INPUT_HEIGHT - 1);
        let text_width = usize::from(area.width.saturating_sub(2));

        if text_width < 5 || area.height < INPUT_HEIGHT + STATUS_HEIGHT {
            return;
        }

        let separator = "─".repeat(usize::from(area.width));
        buf.set_string(area.x, top, &separator, Style::default().fg(DIM_GRAY));

        let buffer = self.client.input().buffer();
        if buffer.is_empty() {
            buf.set_stringn(
                area.x + 1,
                top + 1,
                format!("> {PLACEHOLDER}"),
                text_width,
                Style::default().fg(DIM_GRAY),
            );
            return;
        }

        let full_input = format!("> {buffer}_");
        let wrapped = textwrap::wrap(&full_input, text_width);
        let skip = wrapped.len().saturating_sub(text_height);

        for (i, line) in wrapped.iter().skip(skip).enumerate() {
            let y = top + 1 + u16::try_from(i).unwrap_or(u16::MAX);
            buf.set_stringn(area.x + 1, y, line, text_width, Style::default().fg(USER_GREEN));
        }

        if skip > 0 {
            buf.set_string(
                area.x + area.width.saturating_sub(3),
                top,
                "^",
                Style::default().fg(HEXTECH_BLUE),
            );
        }
    }

    /// Render status bar
    fn render_status(&self, buf: &mut Buffer, area: Rect) {
        if area.height == 0 {
            return;
        }
        let y = area.y + area.height - 1;
        let width = usize::from(area.width);

        let state = self.display.chat_state;
        let state_style = match state {
            ChatState::AwaitingAnswer | ChatState::Revealing => Style::default().fg(LOLGPT_GOLD),
            _ => Style::default().fg(STATUS_GRAY),
        };

        let head = format!(" {} ", state.description());
        buf.set_stringn(area.x, y, &head, width, state_style);

        let (tail, tail_style) = if let Some(ref notice) = self.notice {
            (format!("| {notice}"), Style::default().fg(HEXTECH_BLUE))
        } else if let Some(ref error) = self.display.last_error {
            (format!("| Error: {error}"), Style::default().fg(ERROR_RED))
        } else {
            (
                "| Enter send | Ctrl-L new chat | PgUp/PgDn scroll | Esc quit".to_string(),
                Style::default().fg(DIM_GRAY),
            )
        };

        let x = area.x + u16::try_from(head.width()).unwrap_or(u16::MAX);
        buf.set_stringn(x, y, &tail, width.saturating_sub(head.width()), tail_style);
    }
}
