mod app;
mod binding;
mod db;
mod edit;
mod host;
mod hostlist;
mod input;
mod message;
mod secret;
mod ssh;
mod sshconfig;
mod terminal;

pub use app::App;
pub use db::{HostDb, HostStorage};
pub use host::Host;
pub use message::Message;
pub use secret::SecretBox;
pub use ssh::SshParams;
pub use terminal::Terminal;
