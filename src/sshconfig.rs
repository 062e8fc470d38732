use log::debug;
use ssh2_config::{ParseRule, SshConfig};
use whoami::username;

use crate::ssh::SshParams;

/// Resolves the effective client parameters for a hostname from the
/// user's default SSH config file. Never fails: anything the config
/// does not provide falls back to sensible defaults (current user,
/// port 22).
pub fn resolve(hostname: &str) -> SshParams {
    let hostname = hostname.trim();
    let mut params = SshParams {
        hostname: hostname.to_string(),
        port: String::from("22"),
        user: username(),
        identity_file: String::new(),
    };

    match SshConfig::parse_default_file(ParseRule::STRICT) {
        Ok(config) => {
            let host = config.query(hostname);
            if let Some(name) = host.host_name {
                params.hostname = name;
            }
            if let Some(port) = host.port {
                params.port = port.to_string();
            }
            if let Some(user) = host.user {
                params.user = user;
            }
            if let Some(first) = host.identity_file.as_deref().and_then(|files| files.first()) {
                params.identity_file = first.display().to_string();
            }
        }
        Err(err) => debug!("cannot parse ssh config: {err}"),
    }

    debug!("resolved ssh parameters for '{hostname}': {params:?}");
    params
}
