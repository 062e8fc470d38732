use std::{
    collections::HashMap,
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{host::Host, secret::SecretBox};

/// Storage seam for host records. `id == 0` on save means "assign the
/// next free id". A missing id on `get` is not an error; callers treat
/// it as "start a new record".
pub trait HostStorage {
    fn get(&self, id: u64) -> Option<Host>;
    fn all(&self) -> Vec<Host>;
    fn save(&mut self, host: &mut Host) -> anyhow::Result<()>;
    fn delete(&mut self, id: u64) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DbFile {
    hosts: HashMap<u64, Host>,
    // Passwords are kept out of the host map and sealed per id.
    secrets: HashMap<u64, Vec<u8>>,
}

/// Bincode snapshot of all host records, rewritten as a whole on every
/// flush.
pub struct HostDb {
    path: PathBuf,
    secrets: SecretBox,
    file: DbFile,
}

impl HostDb {
    pub fn open<P: AsRef<Path>>(path: P, secrets: SecretBox) -> anyhow::Result<Self> {
        let path = PathBuf::from(path.as_ref());
        let file = if path.exists() {
            let reader = File::open(&path)?;
            bincode::deserialize_from(reader)?
        } else {
            DbFile::default()
        };

        debug!("opened host database with {} records", file.hosts.len());
        Ok(Self { path, secrets, file })
    }

    pub fn flush(&self) -> anyhow::Result<()> {
        let data = bincode::serialize(&self.file)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(&data)?;
        Ok(())
    }

    fn next_id(&self) -> u64 {
        self.file.hosts.keys().max().map_or(1, |id| id + 1)
    }
}

impl HostStorage for HostDb {
    fn get(&self, id: u64) -> Option<Host> {
        let mut host = self.file.hosts.get(&id).cloned()?;
        if let Some(sealed) = self.file.secrets.get(&id) {
            match self.secrets.open(sealed) {
                Ok(bytes) => host.password = String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => warn!("cannot open password for host {id}: {err}"),
            }
        }
        Some(host)
    }

    fn all(&self) -> Vec<Host> {
        let mut ids: Vec<u64> = self.file.hosts.keys().copied().collect();
        ids.sort_unstable();
        ids.iter().filter_map(|id| self.get(*id)).collect()
    }

    fn save(&mut self, host: &mut Host) -> anyhow::Result<()> {
        if host.id == 0 {
            host.id = self.next_id();
        }

        if host.password.is_empty() {
            self.file.secrets.remove(&host.id);
        } else {
            let sealed = self.secrets.seal(host.password.as_bytes())?;
            self.file.secrets.insert(host.id, sealed);
        }

        let mut stored = host.clone();
        stored.password.clear();
        stored.ssh_params = None;
        self.file.hosts.insert(host.id, stored);

        debug!("saved host {} '{}'", host.id, host.title);
        self.flush()
    }

    fn delete(&mut self, id: u64) -> anyhow::Result<()> {
        self.file.hosts.remove(&id);
        self.file.secrets.remove(&id);
        debug!("deleted host {id}");
        self.flush()
    }
}
