use serde::{Deserialize, Serialize};

use crate::ssh::{self, SshParams};

/// Returns true when the address is a raw, user-defined connect string
/// rather than a bare hostname or IP. Addresses containing a literal
/// `@` are always treated as user-defined.
pub fn is_user_defined(address: &str) -> bool {
    let raw = address.trim();
    raw.contains(' ') || raw.contains('@')
}

/// One SSH connection shortcut. `id == 0` means the record was never
/// saved. The password and resolved parameters live in memory only;
/// the storage layer keeps the password encrypted on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub address: String,
    pub login: String,
    pub port: String,
    pub identity_file: String,
    #[serde(skip)]
    pub password: String,
    #[serde(skip)]
    pub ssh_params: Option<SshParams>,
}

impl Host {
    pub fn is_user_defined_command(&self) -> bool {
        is_user_defined(&self.address)
    }

    /// Command line that opens an interactive session with this host.
    pub fn connect_command(&self) -> String {
        if self.is_user_defined_command() {
            return ssh::connect_raw(&self.address);
        }

        let command = ssh::connect(&self.identity_file, &self.port, &self.login, &self.address);
        if self.password.is_empty() {
            command
        } else {
            ssh::with_password(&command, &self.password)
        }
    }

    /// Command line that dumps the effective client configuration for
    /// this host. Never carries the password wrapper.
    pub fn config_command(&self) -> String {
        if self.is_user_defined_command() {
            return ssh::dump_config_raw(&self.address);
        }

        ssh::dump_config(&self.identity_file, &self.port, &self.login, &self.address)
    }

    /// Command line that copies the SSH identity to this host. Built
    /// from the resolved parameters; unavailable until they exist.
    pub fn copy_id_command(&self) -> Option<String> {
        self.ssh_params.as_ref().map(ssh::copy_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(address: &str) -> Host {
        Host {
            title: "box".into(),
            address: address.into(),
            ..Host::default()
        }
    }

    #[test]
    fn bare_hostnames_are_structured() {
        for address in ["10.0.0.5", "example.com", "box-01", " padded.host ", ""] {
            assert!(!is_user_defined(address), "{address:?}");
        }
    }

    #[test]
    fn space_or_at_means_user_defined() {
        for address in ["root@10.0.0.5", "host -p 2022", "a b", "@", " x@y "] {
            assert!(is_user_defined(address), "{address:?}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(!is_user_defined("  host  "));
        assert!(!is_user_defined("   "));
    }

    // Small deterministic generator instead of literal tables: any
    // string over a safe alphabet is structured, and injecting a
    // single space or '@' anywhere flips it.
    #[test]
    fn generated_addresses_follow_the_predicate() {
        let alphabet: Vec<char> = "abcdefghijklmnopqrstuvwxyz0123456789.-_".chars().collect();
        let mut seed: u64 = 0x5eed;
        let mut next = move |bound: usize| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) as usize) % bound
        };

        for _ in 0..200 {
            let len = 1 + next(24);
            let mut plain = String::new();
            for _ in 0..len {
                plain.push(alphabet[next(alphabet.len())]);
            }
            assert!(!is_user_defined(&plain), "{plain:?}");

            let marker = if next(2) == 0 { ' ' } else { '@' };
            let mut tagged = plain.clone();
            tagged.insert(1 + next(plain.len()).min(plain.len() - 1), marker);
            // A space injected at the edge is trimmed away.
            if tagged.trim().contains(' ') || tagged.trim().contains('@') {
                assert!(is_user_defined(&tagged), "{tagged:?}");
            }
        }
    }

    #[test]
    fn connect_command_from_discrete_fields() {
        let mut h = host("10.0.0.5");
        h.login = "root".into();
        h.port = "22".into();
        h.identity_file = "/k".into();
        assert_eq!(h.connect_command(), "ssh -i /k -p 22 root@10.0.0.5");
    }

    #[test]
    fn connect_command_for_user_defined_address() {
        let mut h = host("root@10.0.0.5");
        // Overrides are ignored when the user typed the whole command.
        h.login = "other".into();
        h.port = "2222".into();
        assert_eq!(h.connect_command(), "ssh root@10.0.0.5");
    }

    #[test]
    fn password_prefixes_the_connect_command() {
        let mut h = host("10.0.0.5");
        h.password = "x".into();
        assert_eq!(h.connect_command(), "sshpass -p 'x' ssh 10.0.0.5");
    }

    #[test]
    fn user_defined_connect_skips_the_password_wrapper() {
        let mut h = host("root@10.0.0.5");
        h.password = "x".into();
        assert_eq!(h.connect_command(), "ssh root@10.0.0.5");
    }

    #[test]
    fn config_command_never_carries_the_password() {
        let mut h = host("10.0.0.5");
        h.password = "x".into();
        assert_eq!(h.config_command(), "ssh -G 10.0.0.5");
    }

    #[test]
    fn copy_id_requires_resolved_parameters() {
        let mut h = host("10.0.0.5");
        assert_eq!(h.copy_id_command(), None);

        h.ssh_params = Some(SshParams {
            hostname: "10.0.0.5".into(),
            port: "22".into(),
            user: "root".into(),
            identity_file: "/k".into(),
        });
        assert_eq!(h.copy_id_command().as_deref(), Some("ssh-copy-id -i /k -p 22 root@10.0.0.5"));
    }
}
