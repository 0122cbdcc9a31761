use ratatui::layout::Rect;
use substance_sense_core::{ChatSession, PredictError, PredictionClient, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation
    pub session: ChatSession,
    pub client: PredictionClient,

    // Composer buffer
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Transcript view
    pub scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16,      // Inner height of the chat area
    pub chat_total_lines: u16, // Wrapped line count from the last render
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(client: PredictionClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            session: ChatSession::new(),
            client,

            input: String::new(),
            cursor: 0,

            scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            chat_total_lines: 0,
            chat_area: None,

            animation_frame: 0,
        }
    }

    // Composer editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Hand the composer text to the session. Returns the text to send when a
    /// request should go out; the buffer is only cleared in that case.
    pub fn submit_input(&mut self) -> Option<String> {
        match self.session.submit(&self.input) {
            Submission::Dispatched(text) => {
                self.input.clear();
                self.cursor = 0;
                self.animation_frame = 0;
                self.follow_bottom = true;
                Some(text)
            }
            Submission::Empty | Submission::Busy => None,
        }
    }

    pub fn apply_prediction(&mut self, outcome: Result<String, PredictError>) {
        self.session.complete(outcome);
        self.follow_bottom = true;
    }

    // Transcript scrolling
    pub fn max_scroll(&self) -> u16 {
        self.chat_total_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.scroll = self.scroll.min(self.max_scroll()).saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
        self.follow_bottom = self.scroll >= self.max_scroll();
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_bottom = false;
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.scroll = self.max_scroll();
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(PredictionClient::new("http://localhost:8080"))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.insert_char(c);
        }
    }

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut app = app();
        type_str(&mut app, "niño");
        app.cursor_left();
        app.backspace();
        assert_eq!(app.input, "nio");

        app.cursor_home();
        app.insert_char('é');
        assert_eq!(app.input, "énio");

        app.cursor_end();
        app.cursor_right();
        assert_eq!(app.cursor, 4);

        app.cursor_home();
        app.delete();
        assert_eq!(app.input, "nio");
    }

    #[test]
    fn test_blank_submit_keeps_buffer() {
        let mut app = app();
        type_str(&mut app, "   ");

        assert_eq!(app.submit_input(), None);
        assert_eq!(app.input, "   ");
        assert!(app.session.transcript().is_empty());
    }

    #[test]
    fn test_dispatch_clears_buffer() {
        let mut app = app();
        type_str(&mut app, " overdose risk in Tuxedo? ");

        assert_eq!(app.submit_input().as_deref(), Some("overdose risk in Tuxedo?"));
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
        assert!(app.session.is_pending());
    }

    #[test]
    fn test_busy_submit_keeps_buffer() {
        let mut app = app();
        type_str(&mut app, "first");
        app.submit_input();
        type_str(&mut app, "second");

        assert_eq!(app.submit_input(), None);
        assert_eq!(app.input, "second");
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[test]
    fn test_scrolling_clamps_and_tracks_follow() {
        let mut app = app();
        app.chat_total_lines = 30;
        app.chat_height = 10;
        app.scroll_to_bottom();
        assert_eq!(app.scroll, 20);

        app.scroll_up(5);
        assert_eq!(app.scroll, 15);
        assert!(!app.follow_bottom);

        app.scroll_down(50);
        assert_eq!(app.scroll, 20);
        assert!(app.follow_bottom);

        app.scroll_to_top();
        app.scroll_up(3);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_animation_only_runs_while_pending() {
        let mut app = app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        type_str(&mut app, "q");
        app.submit_input();
        app.tick_animation();
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
    }

    #[test]
    fn test_prediction_returns_to_following() {
        let mut app = app();
        type_str(&mut app, "q");
        app.submit_input();
        app.follow_bottom = false;

        app.apply_prediction(Ok("**A**".to_string()));
        assert!(app.follow_bottom);
        assert!(!app.session.is_pending());
        assert_eq!(app.session.transcript().len(), 2);
    }
}
