//! Revision picker: a filterable list that also accepts free text.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::domain::model::{PickOutcome, RevisionCandidate};

/// Interactive state backing the picker.
///
/// Typing filters the list and clears any row the user moved to. Accepting
/// prefers a row chosen with the arrow keys, then the typed text, then the
/// first row shown for an empty query.
#[derive(Debug, Clone)]
pub struct PickerState {
    candidates: Vec<RevisionCandidate>,
    placeholder: String,
    query: String,
    visible: Vec<usize>,
    highlight: Option<usize>,
}

impl PickerState {
    pub fn new(candidates: Vec<RevisionCandidate>, placeholder: impl Into<String>) -> Self {
        let visible = (0..candidates.len()).collect();
        Self {
            candidates,
            placeholder: placeholder.into(),
            query: String::new(),
            visible,
            highlight: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Candidates matching the current query, in original order.
    pub fn visible(&self) -> impl Iterator<Item = &RevisionCandidate> {
        self.visible.iter().map(|&index| &self.candidates[index])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Row to draw as active: the chosen one, or the first row while nothing is typed.
    pub fn active_row(&self) -> Option<usize> {
        self.highlight.or_else(|| {
            (self.query.is_empty() && !self.visible.is_empty()).then_some(0)
        })
    }

    pub fn push_char(&mut self, ch: char) {
        self.query.push(ch);
        self.refilter();
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.refilter();
    }

    pub fn select_next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        self.highlight = Some(match self.highlight {
            Some(index) => (index + 1).min(last),
            None if self.query.is_empty() => 1.min(last),
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.highlight = Some(self.highlight.map_or(0, |index| index.saturating_sub(1)));
    }

    pub fn accept(&self) -> PickOutcome {
        if let Some(candidate) = self.highlight.and_then(|row| self.row(row)) {
            return PickOutcome::Picked(candidate.identifier.clone());
        }

        let typed = self.query.trim();
        if !typed.is_empty() {
            return PickOutcome::TypedOverride(typed.to_owned());
        }

        match self.row(0) {
            Some(candidate) => PickOutcome::Picked(candidate.identifier.clone()),
            None => PickOutcome::Cancelled,
        }
    }

    /// Apply a key press. Returns the outcome once the prompt is resolved.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PickOutcome> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Some(PickOutcome::Cancelled),
            KeyCode::Char('c') | KeyCode::Char('d') if control => {
                return Some(PickOutcome::Cancelled);
            }
            KeyCode::Enter => return Some(self.accept()),
            KeyCode::Down | KeyCode::Tab => self.select_next(),
            KeyCode::Char('n') if control => self.select_next(),
            KeyCode::Up | KeyCode::BackTab => self.select_previous(),
            KeyCode::Char('p') if control => self.select_previous(),
            KeyCode::Backspace => self.pop_char(),
            KeyCode::Char('u') if control => {
                self.query.clear();
                self.refilter();
            }
            KeyCode::Char(ch) if !control => self.push_char(ch),
            _ => {}
        }
        None
    }

    fn row(&self, row: usize) -> Option<&RevisionCandidate> {
        self.visible.get(row).map(|&index| &self.candidates[index])
    }

    fn refilter(&mut self) {
        let needle = self.query.trim().to_lowercase();
        self.visible = self
            .candidates
            .iter()
            .enumerate()
            .filter(|(_, candidate)| {
                needle.is_empty()
                    || candidate.identifier.to_lowercase().contains(&needle)
                    || candidate.description.to_lowercase().contains(&needle)
            })
            .map(|(index, _)| index)
            .collect();
        self.highlight = None;
    }
}

/// Visual component that renders the picker.
#[derive(Debug, Default)]
pub struct RevisionPicker;

impl RevisionPicker {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &PickerState) {
        let block = Block::default()
            .title("Compare with revision")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let prompt = if state.query().is_empty() {
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    state.placeholder().to_owned(),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::raw(state.query().to_owned()),
            ])
        };
        frame.render_widget(Paragraph::new(prompt), layout[0]);

        let items: Vec<ListItem> = state
            .visible()
            .map(|candidate| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        candidate.identifier.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        candidate.description.clone(),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
            .highlight_symbol("▸ ");
        let mut list_state = ListState::default().with_selected(state.active_row());
        frame.render_stateful_widget(list, layout[1], &mut list_state);

        let hint = if state.visible_len() == 0 && !state.query().trim().is_empty() {
            "↵ use typed revision · esc cancel"
        } else {
            "↑/↓ choose · ↵ accept · esc cancel"
        };
        frame.render_widget(
            Paragraph::new(Line::styled(hint, Style::default().fg(Color::DarkGray))),
            layout[2],
        );
    }
}
