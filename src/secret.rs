use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use anyhow::ensure;
use std::{fs, path::Path};

const NONCE_LEN: usize = 12;

/// Seals and opens small byte strings with AES-256-GCM. The key lives
/// in a file created on first use; the nonce is prepended to every
/// ciphertext.
pub struct SecretBox {
    key: Key<Aes256Gcm>,
}

impl SecretBox {
    pub fn new<P: AsRef<Path>>(key_file: P) -> anyhow::Result<Self> {
        let key = match fs::read(key_file.as_ref()) {
            Ok(bytes) => {
                ensure!(bytes.len() == 32, "key file is corrupt");
                *Key::<Aes256Gcm>::from_slice(&bytes)
            }
            Err(_) => {
                let key = Aes256Gcm::generate_key(OsRng);
                fs::write(key_file, key.as_slice())?;
                key
            }
        };

        Ok(SecretBox { key })
    }

    pub fn seal(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let cipher = Aes256Gcm::new(&self.key);
        let ciphertext = cipher.encrypt(&nonce, data).map_err(|e| anyhow::anyhow!(e))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    pub fn open(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        ensure!(data.len() > NONCE_LEN, "sealed data is too short");
        let nonce = Nonce::from_slice(&data[..NONCE_LEN]);
        let cipher = Aes256Gcm::new(&self.key);
        cipher.decrypt(nonce, &data[NONCE_LEN..]).map_err(|e| anyhow::anyhow!(e))
    }
}
