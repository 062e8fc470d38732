//! Rendering of the command lines handed to the user's shell.

use serde::{Deserialize, Serialize};

/// Parameters resolved from the SSH client configuration for one
/// hostname. Ephemeral: resolved again whenever the address changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SshParams {
    pub hostname: String,
    pub port: String,
    pub user: String,
    pub identity_file: String,
}

/// Connect command built from discrete fields. Empty options are
/// omitted rather than emitted as blank flags.
pub fn connect(identity_file: &str, port: &str, login: &str, address: &str) -> String {
    render("ssh", false, identity_file, port, login, address)
}

/// Connect command for a raw, user-defined connect string. The address
/// is passed through to the client unmodified apart from trimming.
pub fn connect_raw(address: &str) -> String {
    format!("ssh {}", address.trim())
}

/// `ssh -G` invocation that dumps the effective client configuration
/// instead of opening an interactive session.
pub fn dump_config(identity_file: &str, port: &str, login: &str, address: &str) -> String {
    render("ssh", true, identity_file, port, login, address)
}

pub fn dump_config_raw(address: &str) -> String {
    format!("ssh -G {}", address.trim())
}

/// `ssh-copy-id` invocation built from resolved parameters, not from
/// user overrides that may be empty.
pub fn copy_id(params: &SshParams) -> String {
    render(
        "ssh-copy-id",
        false,
        &params.identity_file,
        &params.port,
        &params.user,
        &params.hostname,
    )
}

/// Wraps a command with a password-injection helper. The password is
/// single-quoted, nothing else is escaped.
pub fn with_password(command: &str, password: &str) -> String {
    format!("sshpass -p '{password}' {command}")
}

fn render(
    program: &str,
    dump_config: bool,
    identity_file: &str,
    port: &str,
    login: &str,
    address: &str,
) -> String {
    let mut command = String::from(program);
    if dump_config {
        command.push_str(" -G");
    }

    for (flag, value) in [("-i", identity_file), ("-p", port)] {
        let value = value.trim();
        if !value.is_empty() {
            command.push(' ');
            command.push_str(flag);
            command.push(' ');
            command.push_str(value);
        }
    }

    let target = target(login, address);
    if !target.is_empty() {
        command.push(' ');
        command.push_str(&target);
    }

    command
}

fn target(login: &str, address: &str) -> String {
    let address = address.trim();
    let login = login.trim();

    if address.is_empty() {
        String::new()
    } else if login.is_empty() {
        address.to_string()
    } else {
        format!("{login}@{address}")
    }
}
