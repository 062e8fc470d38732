//! Browsable list of saved hosts.

use crossterm::event::{Event, KeyCode, KeyEvent};
use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};
use log::{info, warn};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, Table, TableState},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};
use unicode_width::UnicodeWidthStr;

use crate::{db::HostStorage, host::Host, message::Message, ssh::SshParams};

const INFO_TEXT_NORMAL: &str = "(q) quit | (\u{2191}/\u{2193}) move | (enter) connect | (n) new | (e) edit | (d) delete | (y) copy key | (c) config | (/) search";
const INFO_TEXT_SEARCH: &str = "(esc) quit search | (\u{2191}/\u{2193}) move | (enter) keep filter";
const SEARCH_PROMPT: &str = "\u{1f50d} ";

enum Mode {
    Normal,
    Search,
}

struct FilteredRow {
    index: usize,
    // Matched character positions per column (title, address,
    // description), used for highlighting.
    highlights: [Vec<usize>; 3],
}

pub(crate) struct HostList {
    items: Vec<Host>,
    filtered: Vec<FilteredRow>,
    state: TableState,
    search: Input,
    mode: Mode,
    status: Option<String>,
    column_widths: (u16, u16),
    matcher: SkimMatcherV2,
}

impl HostList {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            state: TableState::default(),
            search: Input::default(),
            mode: Mode::Normal,
            status: None,
            column_widths: (0, 0),
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Reloads every record from storage. Keeps the previous selection
    /// when its record still exists.
    pub(crate) fn refresh(&mut self, storage: &dyn HostStorage) {
        let selected_id = self.selected().map(|host| host.id);

        self.items = storage.all();
        self.items
            .sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()).then(a.id.cmp(&b.id)));

        self.column_widths = (
            self.items
                .iter()
                .map(|h| UnicodeWidthStr::width(h.title.as_str()))
                .max()
                .unwrap_or(0)
                .max(UnicodeWidthStr::width("Title")) as u16,
            self.items
                .iter()
                .map(|h| UnicodeWidthStr::width(h.address.as_str()))
                .max()
                .unwrap_or(0)
                .max(UnicodeWidthStr::width("Host")) as u16,
        );

        self.refilter();
        match selected_id {
            Some(id) => self.select_id(id),
            None if !self.filtered.is_empty() => self.state.select(Some(0)),
            None => self.state.select(None),
        }
    }

    pub(crate) fn select_id(&mut self, id: u64) {
        let position = self
            .filtered
            .iter()
            .position(|row| self.items[row.index].id == id);
        match position {
            Some(position) => self.state.select(Some(position)),
            None if !self.filtered.is_empty() => self.state.select(Some(0)),
            None => self.state.select(None),
        }
    }

    pub(crate) fn selected(&self) -> Option<&Host> {
        let row = self.filtered.get(self.state.selected()?)?;
        self.items.get(row.index)
    }

    /// Attaches freshly resolved parameters to the selected record so
    /// the copy-id command can be built from them.
    pub(crate) fn set_resolved(&mut self, params: SshParams) {
        if let Some(position) = self.state.selected() {
            if let Some(row) = self.filtered.get(position) {
                if let Some(host) = self.items.get_mut(row.index) {
                    host.ssh_params = Some(params);
                }
            }
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        key: KeyEvent,
        storage: &mut dyn HostStorage,
    ) -> Vec<Message> {
        self.status = None;

        match self.mode {
            Mode::Normal => self.handle_normal_key(key, storage),
            Mode::Search => self.handle_search_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, storage: &mut dyn HostStorage) -> Vec<Message> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => vec![Message::Quit],
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.search.reset();
                self.refilter();
                Vec::new()
            }
            KeyCode::Enter => match self.selected() {
                Some(host) => {
                    info!("connect to host {} '{}'", host.id, host.title);
                    vec![Message::RunCommand(host.connect_command())]
                }
                None => Vec::new(),
            },
            KeyCode::Char('n') => vec![Message::EditHost(None)],
            KeyCode::Char('e') => match self.selected() {
                Some(host) => vec![Message::EditHost(Some(host.id))],
                None => Vec::new(),
            },
            KeyCode::Char('d') => match self.selected() {
                Some(host) => {
                    let (id, title) = (host.id, host.title.clone());
                    match storage.delete(id) {
                        Ok(()) => {
                            info!("deleted host {id} '{title}'");
                            self.status = Some(format!("deleted '{title}'"));
                            vec![Message::RefreshList]
                        }
                        Err(err) => {
                            warn!("cannot delete host {id}: {err}");
                            self.status = Some(format!("cannot delete: {err}"));
                            Vec::new()
                        }
                    }
                }
                None => Vec::new(),
            },
            KeyCode::Char('y') => match self.selected().and_then(Host::copy_id_command) {
                Some(command) => vec![Message::RunCommand(command)],
                None => {
                    self.status = Some("ssh defaults are still being resolved".to_string());
                    Vec::new()
                }
            },
            KeyCode::Char('c') => match self.selected() {
                Some(host) => vec![Message::RunCommand(host.config_command())],
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Vec<Message> {
        match key.code {
            KeyCode::Esc => {
                self.search.reset();
                self.mode = Mode::Normal;
                self.refilter();
                Vec::new()
            }
            KeyCode::Enter => {
                // Leave search mode with the filter still applied.
                self.mode = Mode::Normal;
                Vec::new()
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            _ => {
                self.search.handle_event(&Event::Key(key));
                self.refilter();
                self.reload_request()
            }
        }
    }

    fn move_selection(&mut self, delta: isize) -> Vec<Message> {
        if self.filtered.is_empty() {
            return Vec::new();
        }

        let last = self.filtered.len() - 1;
        let next = match (self.state.selected(), delta) {
            (None, _) => 0,
            (Some(0), d) if d < 0 => last,
            (Some(current), d) if d < 0 => current - 1,
            (Some(current), _) if current >= last => 0,
            (Some(current), _) => current + 1,
        };
        self.state.select(Some(next));
        self.reload_request()
    }

    /// Ask for fresh client defaults whenever the selection lands on a
    /// record, so copy-id and the edit form have something current.
    fn reload_request(&self) -> Vec<Message> {
        match self.selected() {
            Some(host) => vec![Message::LoadSshConfig {
                hostname: host.address.clone(),
            }],
            None => Vec::new(),
        }
    }

    fn refilter(&mut self) {
        let pattern = self.search.value().to_string();

        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, host)| {
                if pattern.is_empty() {
                    return Some(FilteredRow {
                        index,
                        highlights: Default::default(),
                    });
                }

                let columns = [&host.title, &host.address, &host.description];
                let mut highlights: [Vec<usize>; 3] = Default::default();
                let mut matched = false;
                for (column, text) in columns.iter().enumerate() {
                    if let Some((_, indices)) = self.matcher.fuzzy_indices(text, &pattern) {
                        highlights[column] = indices;
                        matched = true;
                    }
                }

                matched.then_some(FilteredRow { index, highlights })
            })
            .collect();

        if self.filtered.is_empty() {
            self.state.select(None);
        } else {
            match self.state.selected() {
                Some(selected) if selected >= self.filtered.len() => {
                    self.state.select(Some(self.filtered.len() - 1));
                }
                None => self.state.select(Some(0)),
                _ => {}
            }
        }
    }

    pub(crate) fn view(&mut self, f: &mut Frame) {
        let searching = matches!(self.mode, Mode::Search);
        let constraints = if searching {
            vec![
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ]
        } else {
            vec![Constraint::Min(1), Constraint::Length(1)]
        };
        let chunks = Layout::vertical(constraints).split(f.size());

        let header = Row::new(vec![
            Cell::from("Title").style(Style::default().add_modifier(Modifier::UNDERLINED)),
            Cell::from("Host").style(Style::default().add_modifier(Modifier::UNDERLINED)),
            Cell::from("Description").style(Style::default().add_modifier(Modifier::UNDERLINED)),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .filtered
            .iter()
            .map(|row| {
                let host = &self.items[row.index];
                let title = Text::from(Line::from(highlight_spans(&host.title, &row.highlights[0])));
                let address =
                    Text::from(Line::from(highlight_spans(&host.address, &row.highlights[1])));
                let description = Text::from(Line::from(highlight_spans(
                    &host.description,
                    &row.highlights[2],
                )));
                Row::new([title, address, description])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(self.column_widths.0 + 1),
                Constraint::Min(self.column_widths.1 + 1),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_spacing(HighlightSpacing::Always);
        f.render_stateful_widget(table, chunks[0], &mut self.state);

        if searching {
            let input = Paragraph::new(
                Text::from(format!("{SEARCH_PROMPT}{}", self.search.value()))
                    .style(Style::default().fg(Color::Cyan)),
            )
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(input, chunks[1]);
            f.set_cursor(
                chunks[1].x
                    + 1
                    + UnicodeWidthStr::width(SEARCH_PROMPT) as u16
                    + self.search.visual_cursor() as u16,
                chunks[1].y + 1,
            );
        }

        let footer = chunks[chunks.len() - 1];
        let info = match &self.status {
            Some(status) => Paragraph::new(Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Yellow),
            ))),
            None if searching => Paragraph::new(Line::from(INFO_TEXT_SEARCH)).centered(),
            None => Paragraph::new(Line::from(INFO_TEXT_NORMAL)).centered(),
        };
        f.render_widget(info, footer);
    }
}

fn highlight_spans<'a>(input: &str, indices: &[usize]) -> Vec<Span<'a>> {
    if indices.is_empty() {
        return vec![Span::raw(input.to_string())];
    }

    let highlight_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    let mut segment = String::new();
    for (i, c) in input.chars().enumerate() {
        if indices.contains(&i) {
            if !segment.is_empty() {
                spans.push(Span::raw(segment.clone()));
                segment.clear();
            }
            spans.push(Span::styled(c.to_string(), highlight_style));
        } else {
            segment.push(c);
        }
    }
    if !segment.is_empty() {
        spans.push(Span::raw(segment));
    }

    spans
}
