use crossterm::event::Event;
use tui_input::{backend::crossterm::EventHandler, Input};

/// Pure check applied to a field's text. Failures carry the message
/// shown next to the field.
pub(crate) type Validator = fn(&str) -> anyhow::Result<()>;

/// One editable slot of the form: a `tui_input` buffer plus the label,
/// placeholder, enabled flag and validation state the form derives
/// behavior from.
pub(crate) struct InputField {
    input: Input,
    pub(crate) label: &'static str,
    pub(crate) placeholder: String,
    pub(crate) enabled: bool,
    pub(crate) masked: bool,
    pub(crate) error: Option<String>,
    validator: Option<Validator>,
    char_limit: usize,
    focused: bool,
}

impl InputField {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            input: Input::default(),
            label,
            placeholder: String::new(),
            enabled: true,
            masked: false,
            error: None,
            validator: None,
            char_limit: 0,
            focused: false,
        }
    }

    pub(crate) fn with_value(mut self, value: &str) -> Self {
        self.input = Input::new(value.to_string());
        self
    }

    pub(crate) fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub(crate) fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub(crate) fn with_char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }

    pub(crate) fn with_masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub(crate) fn value(&self) -> &str {
        self.input.value()
    }

    /// Text shown on screen; masked fields render bullets instead of
    /// the secret.
    pub(crate) fn display_value(&self) -> String {
        if self.masked {
            "\u{2022}".repeat(self.input.value().chars().count())
        } else {
            self.input.value().to_string()
        }
    }

    /// Replaces the value and moves the cursor to the end. The write
    /// itself is unconditional; validation runs afterwards so the
    /// field can pass through transient invalid states.
    pub(crate) fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
        self.revalidate();
    }

    /// Feeds a terminal event into the buffer. Returns true when the
    /// value changed. Disabled fields ignore events; the char limit
    /// rejects growth past it.
    pub(crate) fn handle_event(&mut self, event: &Event) -> bool {
        if !self.enabled {
            return false;
        }

        let before = self.input.value().to_string();
        self.input.handle_event(event);

        if self.char_limit > 0 && self.input.value().chars().count() > self.char_limit {
            self.input = Input::new(before);
            return false;
        }

        let changed = self.input.value() != before;
        if changed {
            self.revalidate();
        }
        changed
    }

    pub(crate) fn revalidate(&mut self) {
        self.error = self
            .validator
            .and_then(|validate| validate(self.input.value()).err())
            .map(|err| err.to_string());
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub(crate) fn focus(&mut self) {
        self.focused = true;
    }

    pub(crate) fn blur(&mut self) {
        self.focused = false;
    }

    pub(crate) fn focused(&self) -> bool {
        self.focused
    }

    pub(crate) fn visual_cursor(&self) -> usize {
        self.input.visual_cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn not_empty(value: &str) -> anyhow::Result<()> {
        anyhow::ensure!(!value.trim().is_empty(), "value is required");
        Ok(())
    }

    #[test]
    fn typing_changes_the_value() {
        let mut field = InputField::new("Title");
        assert!(field.handle_event(&key('a')));
        assert!(field.handle_event(&key('b')));
        assert_eq!(field.value(), "ab");
    }

    #[test]
    fn disabled_fields_ignore_events() {
        let mut field = InputField::new("Login").with_value("root");
        field.enabled = false;
        assert!(!field.handle_event(&key('x')));
        assert_eq!(field.value(), "root");
    }

    #[test]
    fn char_limit_rejects_growth() {
        let mut field = InputField::new("Port").with_char_limit(2);
        field.handle_event(&key('2'));
        field.handle_event(&key('2'));
        assert!(!field.handle_event(&key('2')));
        assert_eq!(field.value(), "22");
    }

    #[test]
    fn validator_records_the_error() {
        let mut field = InputField::new("Title").with_validator(not_empty);
        field.revalidate();
        assert_eq!(field.error.as_deref(), Some("value is required"));

        field.handle_event(&key('a'));
        assert!(field.is_valid());
    }

    #[test]
    fn set_value_moves_cursor_to_the_end() {
        let mut field = InputField::new("Host");
        field.set_value("example");
        assert_eq!(field.visual_cursor(), "example".len());
    }

    #[test]
    fn set_value_accepts_invalid_values() {
        let mut field = InputField::new("Title").with_value("keep").with_validator(not_empty);
        field.set_value("");
        assert_eq!(field.value(), "");
        assert!(!field.is_valid());
    }

    #[test]
    fn masked_fields_render_bullets() {
        let field = InputField::new("Password").with_masked().with_value("abc");
        assert_eq!(field.display_value(), "\u{2022}\u{2022}\u{2022}");
        assert_eq!(field.value(), "abc");
    }
}
