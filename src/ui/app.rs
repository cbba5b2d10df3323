use std::collections::VecDeque;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::models::BlogPost;
use crate::worker::{Pending, StoreWorker};

use super::helpers::{move_index, surface_error};

/// Height of the bordered title input at the top of the screen.
const INPUT_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// A write submitted to the worker whose outcome is still to be reported.
enum PendingWrite {
    Add {
        title: String,
        pending: Pending<Option<BlogPost>>,
    },
    Delete {
        title: String,
        pending: Pending<usize>,
    },
    Rename {
        title: String,
        pending: Pending<usize>,
    },
}

impl PendingWrite {
    /// Poll the write. Returns the status line to show once it has finished.
    fn poll(&self) -> Option<(String, StatusKind)> {
        match self {
            PendingWrite::Add { title, pending } => pending.try_take().map(|result| match result {
                Ok(Some(post)) => (format!("Added \"{}\".", post.title), StatusKind::Info),
                Ok(None) => (format!("\"{title}\" is already listed."), StatusKind::Info),
                Err(err) => (surface_error(&err), StatusKind::Error),
            }),
            PendingWrite::Delete { title, pending } => {
                pending.try_take().map(|result| match result {
                    Ok(0) => (format!("No post titled \"{title}\"."), StatusKind::Error),
                    Ok(_) => (format!("Deleted \"{title}\"."), StatusKind::Info),
                    Err(err) => (surface_error(&err), StatusKind::Error),
                })
            }
            PendingWrite::Rename { title, pending } => {
                pending.try_take().map(|result| match result {
                    Ok(0) => ("Post no longer exists.".to_string(), StatusKind::Error),
                    Ok(_) => (format!("Renamed to \"{title}\"."), StatusKind::Info),
                    Err(err) => (surface_error(&err), StatusKind::Error),
                })
            }
        }
    }
}

/// State of the blog post list screen.
pub struct App {
    worker: StoreWorker,
    posts: Vec<BlogPost>,
    selected: usize,
    input: String,
    status: Option<StatusMessage>,
    writes: VecDeque<PendingWrite>,
    refresh: Option<Pending<Vec<BlogPost>>>,
}

impl App {
    /// Build the screen and queue the initial list load.
    pub fn new(worker: StoreWorker) -> Self {
        let mut app = Self {
            worker,
            posts: Vec::new(),
            selected: 0,
            input: String::new(),
            status: None,
            writes: VecDeque::new(),
            refresh: None,
        };
        app.request_refresh();
        app
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Enter => self.submit_add(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.posts.len().saturating_sub(1),
            KeyCode::Tab => {
                if let Some(post) = self.current_post() {
                    self.input = post.title.clone();
                }
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    self.input.push(ch);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    /// Delete the post whose title matches the input. The post is built from
    /// raw text, so the store resolves its id by title.
    pub(crate) fn handle_ctrl_d(&mut self) -> Result<()> {
        let Some(title) = self.take_input_title() else {
            return Ok(());
        };
        let pending = self.worker.delete_by_title(title.clone());
        self.writes.push_back(PendingWrite::Delete { title, pending });
        self.request_refresh();
        Ok(())
    }

    /// Rename the selected post to the input text. A title another post
    /// already uses is refused, since delete-by-title would only ever reach
    /// the first of the two.
    pub(crate) fn handle_ctrl_e(&mut self) -> Result<()> {
        let Some(id) = self.current_post().map(|post| post.id) else {
            self.set_status("No post selected to rename.", StatusKind::Error);
            return Ok(());
        };
        let candidate = BlogPost::with_title(self.input.trim());
        if self
            .posts
            .iter()
            .any(|post| post.id != id && *post == candidate)
        {
            self.set_status(
                format!("\"{}\" is already listed.", candidate.title),
                StatusKind::Error,
            );
            return Ok(());
        }
        let Some(title) = self.take_input_title() else {
            return Ok(());
        };
        let pending = self.worker.rename(id, title.clone());
        self.writes.push_back(PendingWrite::Rename { title, pending });
        self.request_refresh();
        Ok(())
    }

    /// Apply any worker results that have arrived. Called once per frame from
    /// the UI thread before drawing.
    pub(crate) fn poll_background(&mut self) -> Result<()> {
        while let Some(write) = self.writes.front() {
            match write.poll() {
                Some((text, kind)) => {
                    self.writes.pop_front();
                    self.set_status(text, kind);
                }
                None => break,
            }
        }

        if let Some(result) = self.refresh.as_ref().and_then(Pending::try_take) {
            self.refresh = None;
            match result {
                Ok(posts) => self.apply_posts(posts),
                Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
            }
        }

        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(INPUT_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        self.draw_input(frame, chunks[0]);
        self.draw_post_list(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Title").borders(Borders::ALL);
        let paragraph = Paragraph::new(self.input.as_str()).block(block.clone());
        frame.render_widget(paragraph, area);

        let inner = block.inner(area);
        let width = Line::from(self.input.as_str()).width();
        let cursor_x = inner
            .x
            .saturating_add(u16::try_from(width).unwrap_or(u16::MAX));
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }

    fn draw_post_list(&self, frame: &mut Frame, area: Rect) {
        let title = if self.refresh.is_some() {
            format!("Blog Posts ({}) • loading", self.posts.len())
        } else {
            format!("Blog Posts ({})", self.posts.len())
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        if self.posts.is_empty() {
            let paragraph = Paragraph::new("No blog posts yet.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self
            .posts
            .iter()
            .map(|post| ListItem::new(post.title.clone()))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn submit_add(&mut self) {
        let Some(title) = self.take_input_title() else {
            return;
        };
        let pending = self.worker.add(title.clone());
        self.writes.push_back(PendingWrite::Add { title, pending });
        self.request_refresh();
    }

    /// Queue a list reload behind whatever writes are already queued. A load
    /// that is still outstanding is replaced, so only the newest one lands.
    fn request_refresh(&mut self) {
        debug!("requesting blog post refresh");
        self.refresh = Some(self.worker.load_all());
    }

    fn apply_posts(&mut self, posts: Vec<BlogPost>) {
        self.posts = posts;
        if self.selected >= self.posts.len() {
            self.selected = self.posts.len().saturating_sub(1);
        }
    }

    /// Trimmed input text, clearing the field. Empty input sets an error
    /// status and yields `None`.
    fn take_input_title(&mut self) -> Option<String> {
        let title = self.input.trim().to_string();
        if title.is_empty() {
            self.set_status("Type a title first.", StatusKind::Error);
            return None;
        }
        self.input.clear();
        self.clear_status();
        Some(title)
    }

    fn current_post(&self) -> Option<&BlogPost> {
        self.posts.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        self.selected = move_index(self.selected, self.posts.len(), offset);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

fn footer_instructions() -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled("[Enter]", key_style),
        Span::raw(" Add   "),
        Span::styled("[Ctrl+D]", key_style),
        Span::raw(" Delete Title   "),
        Span::styled("[Ctrl+E]", key_style),
        Span::raw(" Rename Selected   "),
        Span::styled("[Tab]", key_style),
        Span::raw(" Copy Title   "),
        Span::styled("[Esc]", key_style),
        Span::raw(" Quit"),
    ])
}
