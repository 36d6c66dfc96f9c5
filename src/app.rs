use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use flume::{Receiver, Sender};
use futures::StreamExt;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span, ToSpan},
    widgets::{Block, List, ListItem, Paragraph},
};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    api::{ApiResult, NotesApi},
    modal::Modal,
    models::{NewNote, Note},
    task::{TaskKind, Tasks},
};

pub const LOADING_TEXT: &str = "Loading....";
pub const ERROR_TEXT: &str = "Something went wrong!";
pub const EMPTY_TEXT: &str = "No Notes Available";
pub const ADD_NOTES_LABEL: &str = "Add Notes";
pub const SAVE_LABEL: &str = "Got it, thanks!";

const TITLE_PLACEHOLDER: &str = "add title";
const AUTHOR_PLACEHOLDER: &str = "add notes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteListState {
    Loading,
    /// Entered on any failed request. Only an explicit retry leaves it.
    Error,
    Loaded(Vec<Note>),
}

/// Results delivered back to the view by request tasks, tagged with the
/// generation of the request that produced them.
#[derive(Debug)]
pub enum Message {
    NotesFetched {
        generation: u64,
        result: ApiResult<Vec<Note>>,
    },
    NoteCreated {
        generation: u64,
        result: ApiResult<()>,
    },
}

impl Message {
    fn request(&self) -> (TaskKind, u64) {
        match self {
            Message::NotesFetched { generation, .. } => (TaskKind::Fetch, *generation),
            Message::NoteCreated { generation, .. } => (TaskKind::Create, *generation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusedInput {
    Title,
    Author,
}

pub struct App {
    api: Arc<dyn NotesApi>,
    state: NoteListState,
    modal_open: bool,
    title_input: Input,
    author_input: Input,
    focused_input: FocusedInput,
    submitting: bool,
    message_tx: Sender<Message>,
    message_rx: Receiver<Message>,
    tasks: Tasks,
    should_quit: bool,
}

impl App {
    pub fn new(api: Arc<dyn NotesApi>) -> App {
        let (message_tx, message_rx) = flume::unbounded();
        App {
            api,
            state: NoteListState::Loading,
            modal_open: false,
            title_input: Input::default(),
            author_input: Input::default(),
            focused_input: FocusedInput::Title,
            submitting: false,
            message_tx,
            message_rx,
            tasks: Tasks::default(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        self.start();

        let mut events = EventStream::new();
        let messages = self.message_rx.clone();
        while !self.should_quit {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(event) => self.handle_event(&event?),
                    None => break,
                },
                Ok(message) = messages.recv_async() => self.update(message),
            }
        }

        Ok(())
    }

    /// Issues the initial read.
    pub fn start(&mut self) {
        self.fetch_notes();
    }

    pub fn update(&mut self, message: Message) {
        let (kind, generation) = message.request();
        if !self.tasks.is_current(kind, generation) {
            tracing::debug!(?kind, generation, "discarding superseded result");
            return;
        }

        match message {
            Message::NotesFetched { result: Ok(notes), .. } => {
                tracing::info!(count = notes.len(), "notes fetched");
                self.state = NoteListState::Loaded(notes);
            }
            Message::NotesFetched { result: Err(error), .. } => {
                tracing::warn!(%error, "fetching notes failed");
                self.fail();
            }
            Message::NoteCreated { result: Ok(()), .. } => {
                tracing::info!("note created");
                self.submitting = false;
                self.set_modal_open(false);
                self.fetch_notes();
            }
            Message::NoteCreated { result: Err(error), .. } => {
                tracing::warn!(%error, "creating note failed");
                self.fail();
            }
        }
    }

    fn handle_event(&mut self, event: &Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(*key);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            NoteListState::Error => match key.code {
                KeyCode::Char('r') => self.retry(),
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
            NoteListState::Loading => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.should_quit = true;
                }
            }
            NoteListState::Loaded(_) if self.modal_open => self.handle_modal_key(key),
            NoteListState::Loaded(_) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('a') => self.set_modal_open(true),
                _ => {}
            },
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let modal = Modal::new(self.modal_open, ADD_NOTES_LABEL);
        if modal.handle_key(&key, |open| self.set_modal_open(open)) {
            return;
        }

        match (key.modifiers, key.code) {
            (_, KeyCode::Enter) | (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                self.submit();
            }
            (_, KeyCode::Tab) | (_, KeyCode::BackTab) => {
                self.toggle_input();
            }
            _ => {
                let event = Event::Key(key);
                match self.focused_input {
                    FocusedInput::Title => {
                        self.title_input.handle_event(&event);
                    }
                    FocusedInput::Author => {
                        self.author_input.handle_event(&event);
                    }
                };
            }
        }
    }

    fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
        if !open {
            self.title_input.reset();
            self.author_input.reset();
            self.focused_input = FocusedInput::Title;
        }
    }

    fn toggle_input(&mut self) {
        self.focused_input = match self.focused_input {
            FocusedInput::Title => FocusedInput::Author,
            FocusedInput::Author => FocusedInput::Title,
        };
    }

    /// Enters `Error` and invalidates whatever is still in flight, so only a
    /// retry can leave it.
    fn fail(&mut self) {
        self.tasks.cancel_all();
        self.submitting = false;
        self.state = NoteListState::Error;
        self.set_modal_open(false);
    }

    fn retry(&mut self) {
        tracing::info!("retrying after failure");
        self.state = NoteListState::Loading;
        self.fetch_notes();
    }

    fn fetch_notes(&mut self) {
        tracing::debug!("fetching notes");
        let api = Arc::clone(&self.api);
        let tx = self.message_tx.clone();
        self.tasks.spawn(TaskKind::Fetch, move |generation| async move {
            let result = api.get_all_notes().await;
            let _ = tx.send_async(Message::NotesFetched { generation, result }).await;
        });
    }

    fn submit(&mut self) {
        if self.submitting {
            tracing::debug!("create already in flight, ignoring submit");
            return;
        }
        self.submitting = true;

        let note = NewNote {
            title: self.title_input.value().to_string(),
            author: self.author_input.value().to_string(),
        };
        tracing::debug!(title = %note.title, "creating note");

        let api = Arc::clone(&self.api);
        let tx = self.message_tx.clone();
        self.tasks.spawn(TaskKind::Create, move |generation| async move {
            let result = api.add_note(&note).await;
            let _ = tx.send_async(Message::NoteCreated { generation, result }).await;
        });
    }

    fn draw(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        match &self.state {
            NoteListState::Loading => {
                frame.render_widget(Paragraph::new(LOADING_TEXT).italic(), layout[0]);
                frame.render_widget(help_line(&[("q", " exit")]), layout[1]);
            }
            NoteListState::Error => {
                frame.render_widget(Paragraph::new(ERROR_TEXT).bold().red(), layout[0]);
                frame.render_widget(
                    help_line(&[("r", " retry, "), ("q", " exit")]),
                    layout[1],
                );
            }
            NoteListState::Loaded(notes) => {
                self.render_list(frame, notes, layout[0]);
                frame.render_widget(
                    help_line(&[("a", " Add Notes, "), ("Esc/q", " exit")]),
                    layout[1],
                );

                let area = frame.area();
                Modal::new(self.modal_open, ADD_NOTES_LABEL)
                    .height(9)
                    .render(frame, area, |frame, inner| self.render_form(frame, inner));
            }
        }
    }

    fn render_list(&self, frame: &mut Frame, notes: &[Note], area: Rect) {
        let block = Block::bordered()
            .title("My Notes")
            .border_set(border::THICK);

        if notes.is_empty() {
            frame.render_widget(Paragraph::new(EMPTY_TEXT).block(block), area);
            return;
        }

        let items = notes
            .iter()
            .map(|note| ListItem::new(Line::from(note.title.as_str())).bold());
        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        let fields = [
            (
                FocusedInput::Title,
                "Title",
                &self.title_input,
                TITLE_PLACEHOLDER,
            ),
            (
                FocusedInput::Author,
                "Author",
                &self.author_input,
                AUTHOR_PLACEHOLDER,
            ),
        ];

        for ((field, label, input, placeholder), area) in fields.into_iter().zip(layout.iter()) {
            let mut block = Block::bordered().title(label);
            let mut paragraph = if input.value().is_empty() {
                Paragraph::new(placeholder.dark_gray().italic())
            } else {
                Paragraph::new(input.value())
            };

            if field == self.focused_input {
                block = block.border_style(Style::new().yellow());
                let width = area.width.max(3) - 3;
                let scroll = input.visual_scroll(width as usize);
                paragraph = paragraph.scroll((0, scroll as u16));

                let x = input.visual_cursor().max(scroll) - scroll + 1;
                frame.set_cursor_position((area.x + x as u16, area.y + 1));
            }

            frame.render_widget(paragraph.block(block), *area);
        }

        let save = if self.submitting {
            SAVE_LABEL.dark_gray()
        } else {
            SAVE_LABEL.bold().blue()
        };
        let footer = Line::from_iter([
            save,
            " (Enter) ".to_span(),
            "Tab".bold().yellow(),
            " switch".to_span(),
        ])
        .centered();
        frame.render_widget(footer, layout[2]);
    }
}

fn help_line<'a>(keys: &[(&'a str, &'a str)]) -> Line<'a> {
    Line::from_iter(
        keys.iter()
            .flat_map(|&(key, action)| [key.bold().yellow(), Span::raw(action)]),
    )
    .centered()
}
