use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, ToSpan},
    widgets::{Block, Clear},
};

/// Controlled container: visibility is owned by the caller and only ever
/// changed through the setter handed to [`Modal::handle_key`].
pub struct Modal<'a> {
    is_open: bool,
    title: &'a str,
    height: u16,
}

impl<'a> Modal<'a> {
    pub fn new(is_open: bool, title: &'a str) -> Self {
        Modal {
            is_open,
            title,
            height: 10,
        }
    }

    pub fn height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    /// Draws the container over `area` and hands its inner area to `content`.
    /// When closed nothing is drawn and `content` is never called.
    pub fn render<F>(&self, frame: &mut Frame, area: Rect, content: F)
    where
        F: FnOnce(&mut Frame, Rect),
    {
        if !self.is_open {
            return;
        }

        let [popup] = Layout::horizontal([Constraint::Percentage(60)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::vertical([Constraint::Length(self.height)])
            .flex(Flex::Center)
            .areas(popup);

        let close_hint = Line::from_iter(["Esc".bold().yellow(), " close".to_span()]);
        let block = Block::bordered()
            .title(self.title)
            .title_bottom(close_hint.right_aligned())
            .border_set(border::THICK)
            .border_style(Style::new().cyan());
        let inner = block.inner(popup);

        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);
        content(frame, inner);
    }

    /// Close affordance. Returns whether the key was consumed.
    pub fn handle_key<S>(&self, key: &KeyEvent, set_open: S) -> bool
    where
        S: FnOnce(bool),
    {
        if self.is_open && key.code == KeyCode::Esc {
            set_open(false);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use ratatui::{Terminal, backend::TestBackend, widgets::Paragraph};

    use super::*;

    fn render(modal: &Modal) -> (String, bool) {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut content_drawn = false;
        terminal
            .draw(|frame| {
                let area = frame.area();
                modal.render(frame, area, |frame, inner| {
                    content_drawn = true;
                    frame.render_widget(Paragraph::new("child content"), inner);
                })
            })
            .unwrap();

        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        (text, content_drawn)
    }

    #[test]
    fn closed_modal_renders_nothing() {
        let (text, content_drawn) = render(&Modal::new(false, "Add Notes"));

        assert!(!content_drawn);
        assert!(text.trim().is_empty());
    }

    #[test]
    fn open_modal_renders_title_and_children() {
        let (text, content_drawn) = render(&Modal::new(true, "Add Notes").height(5));

        assert!(content_drawn);
        assert!(text.contains("Add Notes"));
        assert!(text.contains("child content"));
    }

    #[test]
    fn escape_invokes_setter_with_false() {
        let mut is_open = true;
        let modal = Modal::new(is_open, "Add Notes");

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);

        let consumed = modal.handle_key(&esc, |open| is_open = open);

        assert!(consumed);
        assert!(!is_open);
    }

    #[test]
    fn other_keys_and_closed_modal_are_ignored() {
        let mut calls = 0;
        let open = Modal::new(true, "Add Notes");
        let closed = Modal::new(false, "Add Notes");

        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);

        assert!(!open.handle_key(&x, |_| calls += 1));
        assert!(!closed.handle_key(&esc, |_| calls += 1));
        assert_eq!(calls, 0);
    }
}
