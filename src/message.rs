use crossterm::event::Event;

use crate::ssh::SshParams;

/// Everything that can enter the application loop. Messages are
/// handled one at a time, in arrival order; timers and the config
/// resolver re-enter the loop through the same channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Raw terminal event (keys, resize).
    Terminal(Event),
    /// A debounce envelope whose delay has elapsed. The wrapped
    /// message takes effect only if `tag` is still the latest issued.
    Debounced { tag: u64, inner: Box<Message> },
    /// Ask the resolver for the effective client parameters of a
    /// hostname.
    LoadSshConfig { hostname: String },
    /// Resolver completion.
    SshConfigLoaded(SshParams),
    /// Open the edit form; `None` starts a new record.
    EditHost(Option<u64>),
    /// Leave the edit form; unsaved edits are abandoned.
    CloseForm,
    /// Move the list selection to a record.
    SelectHost(u64),
    /// Reload the list from storage. Resets focus, so a preceding
    /// SelectHost must already have been handled.
    RefreshList,
    /// Suspend the interface and run a shell command in the real
    /// terminal.
    RunCommand(String),
    Quit,
}
