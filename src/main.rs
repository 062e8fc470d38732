use std::{fs, path::Path};

use anyhow::Context;

use sshto::{App, HostDb, SecretBox, Terminal};

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const DB_FILE: &str = "db";
const KEY_FILE: &str = "key";
const LOG_FILE: &str = "sshto.log";

fn main() -> anyhow::Result<()> {
    let data_dir = dirs::config_dir()
        .context("cannot locate the user config directory")?
        .join(CRATE_NAME);
    fs::create_dir_all(&data_dir)?;
    init_logging(&data_dir)?;

    let secrets = SecretBox::new(data_dir.join(KEY_FILE))?;
    let storage = HostDb::open(data_dir.join(DB_FILE), secrets)?;

    let mut terminal = Terminal::new()?;
    let (app, rx) = App::new(storage);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(app.run(rx, &mut terminal));

    // drop restores the terminal before any error is printed
    drop(terminal);

    result
}

// The TUI owns the screen, so logs go to a file; RUST_LOG picks the
// level as usual.
fn init_logging(data_dir: &Path) -> anyhow::Result<()> {
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    Ok(())
}
