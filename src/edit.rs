//! Edit form for a single host record.

use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    binding::{
        BINDINGS, FIELD_ADDRESS, FIELD_COUNT, FIELD_DESCRIPTION, FIELD_IDENTITY_FILE, FIELD_LOGIN,
        FIELD_PASSWORD, FIELD_PORT, FIELD_TITLE,
    },
    db::HostStorage,
    host::{self, Host},
    input::InputField,
    message::Message,
    ssh::SshParams,
};

const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_BANNER: &str = "host details";
const ROWS_PER_FIELD: usize = 3;

const HELP_TEXT: &str = "(esc) discard | (ctrl+s) save | (\u{2191}/\u{2193}) move";
const HELP_TEXT_WITH_COPY: &str =
    "(esc) discard | (ctrl+s) save | (\u{2191}/\u{2193}) move | (ctrl+y) mirror title/host";

/// Shortcut availability derived from the focused field. Recomputed as
/// a value whenever it is needed, never mutated in place.
#[derive(Clone, Copy)]
struct KeyMap {
    copy_enabled: bool,
}

fn keymap(focus: usize) -> KeyMap {
    KeyMap {
        copy_enabled: matches!(focus, FIELD_TITLE | FIELD_ADDRESS),
    }
}

impl KeyMap {
    fn help_line(&self) -> &'static str {
        if self.copy_enabled {
            HELP_TEXT_WITH_COPY
        } else {
            HELP_TEXT
        }
    }
}

fn not_empty(value: &str) -> anyhow::Result<()> {
    anyhow::ensure!(!value.trim().is_empty(), "value is required");
    Ok(())
}

fn network_port(value: &str) -> anyhow::Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    match value.parse::<u16>() {
        Ok(port) if port >= 1 => Ok(()),
        _ => anyhow::bail!("network port must be a number which is less than 65,535"),
    }
}

pub(crate) struct EditForm {
    host: Host,
    is_new: bool,
    fields: Vec<InputField>,
    focus: usize,
    banner: String,
    params: SshParams,
    debounce_tag: u64,
    events: UnboundedSender<Message>,
    viewport: (u16, u16),
    scroll: usize,
    ready: bool,
}

impl EditForm {
    /// `host == None` starts a new, unsaved record.
    pub(crate) fn new(
        host: Option<Host>,
        params: SshParams,
        events: UnboundedSender<Message>,
    ) -> Self {
        let is_new = host.is_none();
        let host = host.unwrap_or_default();

        let mut fields = Vec::with_capacity(FIELD_COUNT);
        for (index, binding) in BINDINGS.iter().enumerate() {
            let field = InputField::new(binding.label).with_value(&(binding.get)(&host));
            let field = match index {
                FIELD_TITLE => field.with_placeholder("*required*").with_validator(not_empty),
                FIELD_ADDRESS => field
                    .with_placeholder("*required*")
                    .with_validator(not_empty)
                    .with_char_limit(128),
                FIELD_DESCRIPTION => field.with_placeholder("n/a").with_char_limit(512),
                FIELD_LOGIN => field.with_char_limit(128),
                FIELD_PORT => field.with_validator(network_port).with_char_limit(5),
                FIELD_IDENTITY_FILE => field.with_char_limit(512),
                FIELD_PASSWORD => field.with_placeholder("n/a").with_masked(),
                _ => field,
            };
            fields.push(field);
        }

        let mut form = Self {
            host,
            is_new,
            fields,
            focus: FIELD_TITLE,
            banner: DEFAULT_BANNER.to_string(),
            params,
            debounce_tag: 0,
            events,
            viewport: (0, 0),
            scroll: 0,
            ready: false,
        };
        form.fields[form.focus].focus();
        form.refresh_placeholders();
        form
    }

    pub(crate) fn handle_key(
        &mut self,
        key: KeyEvent,
        storage: &mut dyn HostStorage,
    ) -> Vec<Message> {
        // An error banner sticks only until the next keystroke.
        self.banner = DEFAULT_BANNER.to_string();

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => return self.save(storage),
                KeyCode::Char('y') => {
                    self.handle_copy_shortcut();
                    return Vec::new();
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => {
                info!("discard changes for host id {}", self.host.id);
                vec![Message::CloseForm]
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.move_focus(-1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Tab => {
                self.move_focus(1);
                Vec::new()
            }
            _ => self.process_input(key),
        }
    }

    /// A debounce envelope whose delay elapsed. The wrapped message is
    /// forwarded only when no newer envelope has been issued since.
    pub(crate) fn handle_debounced(&mut self, tag: u64, inner: Message) -> Vec<Message> {
        if tag + 1 == self.debounce_tag {
            vec![inner]
        } else {
            debug!("drop stale debounce envelope {tag}");
            Vec::new()
        }
    }

    /// Resolver completion: remember the parameters and derive every
    /// field's placeholder and enabled state from them.
    pub(crate) fn apply_ssh_params(&mut self, params: SshParams) {
        self.params = params;
        self.refresh_placeholders();
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        // One line of header, one line of help.
        self.viewport = (width, height.saturating_sub(2));
        self.ready = true;
        self.ensure_visible();
        debug!("edit form viewport {}x{}", self.viewport.0, self.viewport.1);
    }

    fn move_focus(&mut self, delta: isize) {
        let next = self.focus.saturating_add_signed(delta).min(FIELD_COUNT - 1);
        if next == self.focus {
            return;
        }

        // Error indicators stay live for every field while the user
        // tours the form, not just the focused one.
        for field in &mut self.fields {
            field.revalidate();
        }

        self.fields[self.focus].blur();
        self.focus = next;
        self.fields[self.focus].focus();
        self.ensure_visible();
        debug!("focus field '{}'", self.fields[self.focus].label);
    }

    fn handle_copy_shortcut(&mut self) {
        // Title and address often carry the same text; the shortcut is
        // inert on every other field.
        match self.focus {
            FIELD_TITLE => self.copy_value(FIELD_TITLE, FIELD_ADDRESS),
            FIELD_ADDRESS => self.copy_value(FIELD_ADDRESS, FIELD_TITLE),
            _ => {}
        }
    }

    fn copy_value(&mut self, source: usize, destination: usize) {
        let value = self.fields[source].value().to_string();
        self.fields[destination].set_value(&value);
        debug!(
            "copy '{}' value to '{}', new value = {}",
            self.fields[source].label, self.fields[destination].label, value
        );
        if destination == FIELD_ADDRESS {
            self.refresh_placeholders();
        }
    }

    fn process_input(&mut self, key: KeyEvent) -> Vec<Message> {
        // Decide on the pre-edit values whether this title edit should
        // mirror into the address; the copy itself happens afterwards.
        let mirror_title = self.focus == FIELD_TITLE
            && self.is_new
            && self.fields[FIELD_TITLE].value() == self.fields[FIELD_ADDRESS].value();

        let changed = self.fields[self.focus].handle_event(&Event::Key(key));

        if mirror_title {
            self.copy_value(FIELD_TITLE, FIELD_ADDRESS);
        }

        if self.focus == FIELD_ADDRESS && changed {
            self.refresh_placeholders();
            let hostname = self.fields[FIELD_ADDRESS].value().to_string();
            self.schedule(Message::LoadSshConfig { hostname });
        }

        Vec::new()
    }

    /// Issues a debounce envelope for `inner`. Rapid repeated calls
    /// leave only the newest envelope deliverable.
    fn schedule(&mut self, inner: Message) {
        let tag = self.debounce_tag;
        self.debounce_tag += 1;

        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_DELAY).await;
            let _ = events.send(Message::Debounced {
                tag,
                inner: Box::new(inner),
            });
        });
    }

    fn refresh_placeholders(&mut self) {
        let custom = host::is_user_defined(self.fields[FIELD_ADDRESS].value());
        let prefix = if custom { "readonly: " } else { "default: " };

        let defaults = [
            (FIELD_LOGIN, self.params.user.clone()),
            (FIELD_PORT, self.params.port.clone()),
            (FIELD_IDENTITY_FILE, self.params.identity_file.clone()),
        ];
        for (index, value) in defaults {
            self.fields[index].placeholder = format!("{prefix}{value}");
            self.fields[index].enabled = !custom;
        }
    }

    fn save(&mut self, storage: &mut dyn HostStorage) -> Vec<Message> {
        info!("save changes for host id {}", self.host.id);

        // Validate everything before touching the record.
        for index in 0..FIELD_COUNT {
            self.fields[index].revalidate();
            if !self.fields[index].is_valid() {
                let label = self.fields[index].label;
                info!("cannot save host {}: '{label}' is not valid", self.host.id);
                self.banner = format!("{label} is not valid");
                return Vec::new();
            }
        }

        for (index, binding) in BINDINGS.iter().enumerate() {
            (binding.set)(&mut self.host, self.fields[index].value().to_string());
        }

        if let Err(err) = storage.save(&mut self.host) {
            warn!("cannot save host {}: {err}", self.host.id);
            self.banner = format!("cannot save: {err}");
            return Vec::new();
        }

        // The list refresh resets focus, so the selection request has
        // to travel ahead of it.
        vec![
            Message::CloseForm,
            Message::SelectHost(self.host.id),
            Message::RefreshList,
        ]
    }

    fn visible_rows(&self) -> usize {
        ((self.viewport.1 as usize) / ROWS_PER_FIELD).max(1)
    }

    fn ensure_visible(&mut self) {
        let rows = self.visible_rows();
        if self.focus < self.scroll {
            self.scroll = self.focus;
        } else if self.focus >= self.scroll + rows {
            self.scroll = self.focus + 1 - rows;
        }
    }

    pub(crate) fn view(&mut self, f: &mut Frame) {
        let area = f.size();
        if !self.ready {
            self.resize(area.width, area.height);
        }

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        let banner_style = if self.banner == DEFAULT_BANNER {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        };
        f.render_widget(Paragraph::new(self.banner.as_str()).style(banner_style), chunks[0]);

        let mut lines: Vec<Line> = Vec::new();
        let last = (self.scroll + self.visible_rows()).min(FIELD_COUNT);
        for index in self.scroll..last {
            let field = &self.fields[index];

            let label_style = if field.focused() {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            let mut label = vec![Span::styled(field.label, label_style)];
            if let Some(error) = &field.error {
                label.push(Span::styled(
                    format!("  \u{2717} {error}"),
                    Style::default().fg(Color::Red),
                ));
            }
            lines.push(Line::from(label));

            let value = field.display_value();
            let value_line = if value.is_empty() {
                Line::from(Span::styled(
                    field.placeholder.clone(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ))
            } else if field.enabled {
                Line::from(Span::raw(value))
            } else {
                Line::from(Span::styled(value, Style::default().fg(Color::DarkGray)))
            };
            lines.push(value_line);
            lines.push(Line::default());
        }
        f.render_widget(Paragraph::new(lines), chunks[1]);

        f.render_widget(
            Paragraph::new(keymap(self.focus).help_line()).centered(),
            chunks[2],
        );

        let field = &self.fields[self.focus];
        if field.enabled && self.focus >= self.scroll && self.focus < last {
            let row = (self.focus - self.scroll) * ROWS_PER_FIELD + 1;
            f.set_cursor(
                chunks[1].x + field.visual_cursor() as u16,
                chunks[1].y + row as u16,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::MemStorage;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn form(host: Option<Host>) -> (EditForm, UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EditForm::new(host, SshParams::default(), tx), rx)
    }

    fn form_with_params(params: SshParams) -> (EditForm, UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EditForm::new(None, params, tx), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(form: &mut EditForm, storage: &mut MemStorage, text: &str) {
        for c in text.chars() {
            form.handle_key(key(KeyCode::Char(c)), storage);
        }
    }

    #[test]
    fn focus_never_leaves_the_field_range() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();

        for _ in 0..2 * FIELD_COUNT {
            form.handle_key(key(KeyCode::Down), &mut storage);
        }
        assert_eq!(form.focus, FIELD_COUNT - 1);
        assert!(form.fields[FIELD_COUNT - 1].focused());

        for _ in 0..2 * FIELD_COUNT {
            form.handle_key(key(KeyCode::Up), &mut storage);
        }
        assert_eq!(form.focus, FIELD_TITLE);
        assert!(form.fields[FIELD_TITLE].focused());
    }

    #[test]
    fn repeated_down_at_the_bottom_is_a_no_op() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();

        for _ in 0..FIELD_COUNT {
            form.handle_key(key(KeyCode::Down), &mut storage);
        }
        let scroll = form.scroll;
        form.handle_key(key(KeyCode::Down), &mut storage);
        assert_eq!(form.focus, FIELD_COUNT - 1);
        assert_eq!(form.scroll, scroll);
    }

    #[test]
    fn navigation_revalidates_every_field() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();

        assert!(form.fields[FIELD_TITLE].error.is_none());
        form.handle_key(key(KeyCode::Down), &mut storage);
        // Both required fields now carry errors, focused or not.
        assert!(form.fields[FIELD_TITLE].error.is_some());
        assert!(form.fields[FIELD_ADDRESS].error.is_some());
    }

    #[test]
    fn exactly_one_field_holds_focus() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();

        form.handle_key(key(KeyCode::Down), &mut storage);
        form.handle_key(key(KeyCode::Down), &mut storage);

        let focused = form.fields.iter().filter(|f| f.focused()).count();
        assert_eq!(focused, 1);
        assert!(form.fields[FIELD_DESCRIPTION].focused());
    }

    #[test]
    fn save_with_empty_title_leaves_storage_untouched() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();
        form.fields[FIELD_ADDRESS].set_value("10.0.0.5");

        let out = form.handle_key(ctrl('s'), &mut storage);

        assert!(out.is_empty());
        assert!(storage.saved.is_empty());
        assert_eq!(form.banner, "Title is not valid");
        assert!(form.fields[FIELD_TITLE].error.is_some());
    }

    #[test]
    fn save_with_bad_port_names_the_field() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();
        form.fields[FIELD_TITLE].set_value("box");
        form.fields[FIELD_ADDRESS].set_value("10.0.0.5");
        form.fields[FIELD_PORT].set_value("99999");

        let out = form.handle_key(ctrl('s'), &mut storage);

        assert!(out.is_empty());
        assert!(storage.saved.is_empty());
        assert_eq!(form.banner, "Network port is not valid");
    }

    #[test]
    fn save_copies_fields_and_emits_ordered_messages() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();
        form.fields[FIELD_TITLE].set_value("box");
        form.fields[FIELD_ADDRESS].set_value("10.0.0.5");
        form.fields[FIELD_LOGIN].set_value("root");
        form.fields[FIELD_PORT].set_value("2222");
        form.fields[FIELD_PASSWORD].set_value("hunter2");

        let out = form.handle_key(ctrl('s'), &mut storage);

        assert_eq!(
            out,
            vec![
                Message::CloseForm,
                Message::SelectHost(1),
                Message::RefreshList,
            ]
        );
        let saved = &storage.saved[0];
        assert_eq!(saved.title, "box");
        assert_eq!(saved.address, "10.0.0.5");
        assert_eq!(saved.login, "root");
        assert_eq!(saved.port, "2222");
        assert_eq!(saved.password, "hunter2");
    }

    #[test]
    fn storage_failure_surfaces_in_the_banner() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();
        storage.fail_with = Some("disk full".into());
        form.fields[FIELD_TITLE].set_value("box");
        form.fields[FIELD_ADDRESS].set_value("10.0.0.5");

        let out = form.handle_key(ctrl('s'), &mut storage);

        assert!(out.is_empty());
        assert_eq!(form.banner, "cannot save: disk full");
    }

    #[test]
    fn any_keystroke_clears_the_error_banner() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();

        form.handle_key(ctrl('s'), &mut storage);
        assert_ne!(form.banner, DEFAULT_BANNER);

        form.handle_key(key(KeyCode::Down), &mut storage);
        assert_eq!(form.banner, DEFAULT_BANNER);
    }

    #[test]
    fn discard_closes_without_saving() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();
        form.fields[FIELD_TITLE].set_value("box");

        let out = form.handle_key(key(KeyCode::Esc), &mut storage);

        assert_eq!(out, vec![Message::CloseForm]);
        assert!(storage.saved.is_empty());
    }

    #[test]
    fn typing_a_title_mirrors_into_the_address_for_new_records() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();

        type_text(&mut form, &mut storage, "abc");

        assert_eq!(form.fields[FIELD_TITLE].value(), "abc");
        assert_eq!(form.fields[FIELD_ADDRESS].value(), "abc");
    }

    #[test]
    fn diverged_title_and_address_stop_mirroring() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();

        type_text(&mut form, &mut storage, "abc");
        form.fields[FIELD_ADDRESS].set_value("10.0.0.5");

        type_text(&mut form, &mut storage, "x");
        assert_eq!(form.fields[FIELD_TITLE].value(), "abcx");
        assert_eq!(form.fields[FIELD_ADDRESS].value(), "10.0.0.5");
    }

    #[test]
    fn existing_records_never_mirror() {
        let host = Host {
            id: 7,
            title: "same".into(),
            address: "same".into(),
            ..Host::default()
        };
        let (mut form, _rx) = form(Some(host));
        let mut storage = MemStorage::default();

        type_text(&mut form, &mut storage, "x");
        assert_eq!(form.fields[FIELD_TITLE].value(), "samex");
        assert_eq!(form.fields[FIELD_ADDRESS].value(), "same");
    }

    #[test]
    fn copy_shortcut_works_on_title_and_address_only() {
        let (mut form, _rx) = form(Some(Host {
            id: 1,
            title: "box".into(),
            address: "10.0.0.5".into(),
            description: "keep".into(),
            ..Host::default()
        }));
        let mut storage = MemStorage::default();

        form.handle_key(ctrl('y'), &mut storage);
        assert_eq!(form.fields[FIELD_ADDRESS].value(), "box");

        // On the description the shortcut is inert.
        form.handle_key(key(KeyCode::Down), &mut storage);
        form.handle_key(key(KeyCode::Down), &mut storage);
        form.handle_key(ctrl('y'), &mut storage);
        assert_eq!(form.fields[FIELD_DESCRIPTION].value(), "keep");
    }

    #[test]
    fn copy_shortcut_from_address_overwrites_the_title() {
        let (mut form, _rx) = form(Some(Host {
            id: 1,
            title: "old".into(),
            address: "10.0.0.5".into(),
            ..Host::default()
        }));
        let mut storage = MemStorage::default();

        form.handle_key(key(KeyCode::Down), &mut storage);
        form.handle_key(ctrl('y'), &mut storage);
        assert_eq!(form.fields[FIELD_TITLE].value(), "10.0.0.5");
    }

    #[test]
    fn placeholders_follow_the_resolved_parameters() {
        let (mut form, _rx) = form_with_params(SshParams {
            hostname: "box".into(),
            port: "2222".into(),
            user: "root".into(),
            identity_file: "/id".into(),
        });

        assert_eq!(form.fields[FIELD_LOGIN].placeholder, "default: root");
        assert_eq!(form.fields[FIELD_PORT].placeholder, "default: 2222");
        assert_eq!(form.fields[FIELD_IDENTITY_FILE].placeholder, "default: /id");
        assert!(form.fields[FIELD_LOGIN].enabled);

        form.fields[FIELD_ADDRESS].set_value("root@box");
        form.apply_ssh_params(SshParams {
            hostname: "box".into(),
            port: "2222".into(),
            user: "root".into(),
            identity_file: "/id".into(),
        });

        assert_eq!(form.fields[FIELD_LOGIN].placeholder, "readonly: root");
        assert!(!form.fields[FIELD_LOGIN].enabled);
        assert!(!form.fields[FIELD_PORT].enabled);
        assert!(!form.fields[FIELD_IDENTITY_FILE].enabled);
    }

    #[test]
    fn resize_is_idempotent_and_marks_the_form_ready() {
        let (mut form, _rx) = form(None);
        assert!(!form.ready);

        form.resize(80, 24);
        assert!(form.ready);
        let viewport = form.viewport;

        form.resize(80, 24);
        assert_eq!(form.viewport, viewport);
    }

    #[test]
    fn scroll_follows_the_focused_field() {
        let (mut form, _rx) = form(None);
        let mut storage = MemStorage::default();
        // Room for two fields only.
        form.resize(80, 8);

        for _ in 0..FIELD_COUNT {
            form.handle_key(key(KeyCode::Down), &mut storage);
        }
        assert_eq!(form.scroll, FIELD_COUNT - 2);

        for _ in 0..FIELD_COUNT {
            form.handle_key(key(KeyCode::Up), &mut storage);
        }
        assert_eq!(form.scroll, 0);
    }

    #[test]
    fn stale_debounce_envelopes_are_dropped() {
        let (mut form, _rx) = form(None);

        // Three envelopes issued; only the newest may deliver.
        form.debounce_tag = 3;
        let inner = Message::LoadSshConfig {
            hostname: "c".into(),
        };

        assert!(form.handle_debounced(0, inner.clone()).is_empty());
        assert!(form.handle_debounced(1, inner.clone()).is_empty());
        assert_eq!(form.handle_debounced(2, inner.clone()), vec![inner]);
    }

    #[tokio::test(start_paused = true)]
    async fn a_typing_burst_delivers_only_the_last_reload() {
        let (mut form, mut rx) = form(None);
        let mut storage = MemStorage::default();

        // Focus the address and type three characters in quick
        // succession, each issuing an envelope.
        form.handle_key(key(KeyCode::Down), &mut storage);
        type_text(&mut form, &mut storage, "abc");
        assert_eq!(form.debounce_tag, 3);

        // Idle long enough for every timer to fire.
        tokio::time::sleep(Duration::from_millis(600)).await;

        let mut envelopes = Vec::new();
        while let Ok(message) = rx.try_recv() {
            envelopes.push(message);
        }
        assert_eq!(envelopes.len(), 3);

        // Regardless of the order the timers completed in, exactly one
        // envelope survives the tag check: the one for "abc".
        for order in [[0, 1, 2], [2, 1, 0], [1, 2, 0]] {
            let mut delivered = Vec::new();
            for index in order {
                if let Message::Debounced { tag, inner } = envelopes[index].clone() {
                    delivered.extend(form.handle_debounced(tag, *inner));
                }
            }
            assert_eq!(
                delivered,
                vec![Message::LoadSshConfig {
                    hostname: "abc".into()
                }]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn address_edits_schedule_a_reload_for_the_new_text() {
        let (mut form, mut rx) = form(None);
        let mut storage = MemStorage::default();

        form.handle_key(key(KeyCode::Down), &mut storage);
        type_text(&mut form, &mut storage, "db");
        // Arrow keys inside the field do not change the value and must
        // not schedule anything.
        form.handle_key(key(KeyCode::Left), &mut storage);
        assert_eq!(form.debounce_tag, 2);

        tokio::time::sleep(Duration::from_millis(600)).await;

        let mut delivered = Vec::new();
        while let Ok(Message::Debounced { tag, inner }) = rx.try_recv() {
            delivered.extend(form.handle_debounced(tag, *inner));
        }
        assert_eq!(
            delivered,
            vec![Message::LoadSshConfig {
                hostname: "db".into()
            }]
        );
    }
}
