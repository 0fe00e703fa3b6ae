//! Demo application: one group of accordion sections in the terminal.

use std::cell::Cell;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use termcordion_config::AppearanceSettings;
use termcordion_core::IdSource;
use termcordion_widgets::{
    group, handle_key, handle_mouse, section, AccordionState, AccordionStyle, AccordionView,
    Element, Host,
};

use crate::event::{Event, EventHandler, LoopState};

/// Number of sections shown on startup.
const INITIAL_SECTIONS: usize = 2;

pub struct App {
    host: Host,
    state: AccordionState,
    style: AccordionStyle,
    sections: usize,
    /// Set by registry listeners whenever any record changes
    dirty: Rc<Cell<bool>>,
}

impl App {
    pub fn new(ids: Box<dyn IdSource>, style: AccordionStyle) -> Result<Self> {
        let host = Host::mount(&tree(INITIAL_SECTIONS), ids)?;

        let dirty = Rc::new(Cell::new(false));
        for group in host.groups() {
            let dirty = Rc::clone(&dirty);
            group.on_change(move |snapshot, change| {
                dirty.set(true);
                termcordion_logger::info(format!(
                    "demo: {:?}, {} of {} open",
                    change,
                    snapshot.open_count(),
                    snapshot.len()
                ));
            });
        }

        termcordion_logger::info(format!("demo: mounted {} sections", INITIAL_SECTIONS));

        Ok(Self {
            host,
            state: AccordionState::new(),
            style,
            sections: INITIAL_SECTIONS,
            dirty,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Main loop: poll, handle, redraw when something changed.
    pub fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &EventHandler,
    ) -> Result<()> {
        terminal.draw(|frame| self.render(frame))?;

        loop {
            let state = self.handle_event(events.next()?)?;
            if state.should_exit() {
                break;
            }
            if state.needs_redraw() {
                terminal.draw(|frame| self.render(frame))?;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) -> Result<LoopState> {
        let state = match event {
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => {
                redraw_if(handle_mouse(&self.host, &mut self.state, mouse).needs_redraw())
            }
            Event::Resize(..) => LoopState::NeedsRedraw,
            Event::Tick => LoopState::Continue,
        };

        let changed = redraw_if(self.dirty.replace(false));
        Ok(state.combine(changed))
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<LoopState> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Ok(LoopState::Exit)
            }
            KeyCode::Char('q') | KeyCode::Esc => Ok(LoopState::Exit),
            KeyCode::Char('a') => {
                self.set_sections(self.sections + 1)?;
                Ok(LoopState::NeedsRedraw)
            }
            KeyCode::Char('d') if self.sections > 0 => {
                self.set_sections(self.sections - 1)?;
                Ok(LoopState::NeedsRedraw)
            }
            _ => Ok(redraw_if(
                handle_key(&self.host, &mut self.state, key).needs_redraw(),
            )),
        }
    }

    fn set_sections(&mut self, count: usize) -> Result<()> {
        self.host.update(&tree(count))?;
        self.sections = count;
        termcordion_logger::debug(format!("demo: now {} sections", count));
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let view = AccordionView::new(&self.host)
            .style(self.style.clone())
            .block(Block::default().borders(Borders::ALL).title(" termcordion "));
        frame.render_stateful_widget(view, chunks[0], &mut self.state);

        let activity = Paragraph::new(activity_line().unwrap_or_default())
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(activity, chunks[1]);

        let status = Paragraph::new(self.status_line())
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(status, chunks[2]);
    }

    /// Registry summary plus key help.
    pub fn status_line(&self) -> String {
        let (records, open) = self
            .host
            .groups()
            .iter()
            .map(|g| g.read_all())
            .fold((0, 0), |(records, open), s| {
                (records + s.len(), open + s.open_count())
            });
        format!(
            " {} items, {} open | ↑↓ move  Enter toggle  a add  d remove  q quit",
            records, open
        )
    }
}

/// `Group` of numbered sections, matching "Header N" / "Panel N".
fn tree(count: usize) -> Element {
    group((1..=count).map(|i| section(format!("Header {}", i), format!("Panel {}", i))))
}

/// Latest entry of the in-memory log, shown above the status line.
fn activity_line() -> Option<String> {
    termcordion_logger::last_entry()
        .map(|entry| format!(" [{}] {}", entry.timestamp, entry.message))
}

fn redraw_if(changed: bool) -> LoopState {
    if changed {
        LoopState::NeedsRedraw
    } else {
        LoopState::Continue
    }
}

/// Widget style from the `[appearance]` config section.
pub fn style_from_config(appearance: &AppearanceSettings) -> AccordionStyle {
    let mut style = AccordionStyle::default()
        .with_symbols(&appearance.open_symbol, &appearance.closed_symbol);

    match Color::from_str(&appearance.accent) {
        Ok(color) => style = style.with_accent(color),
        Err(_) => termcordion_logger::warn(format!(
            "Unknown accent color '{}', using default",
            appearance.accent
        )),
    }

    if let Some(indent) = appearance.indent {
        style = style.with_indent(indent);
    }
    style
}
