use std::{
    process::Command,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::{
    db::{HostDb, HostStorage},
    edit::EditForm,
    hostlist::HostList,
    message::Message,
    sshconfig,
    ssh::SshParams,
    terminal::Terminal,
};

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns every screen and runs the single message loop. Exactly one
/// message is handled at a time; timer and resolver completions come
/// back through the same channel as keystrokes.
pub struct App {
    storage: HostDb,
    list: HostList,
    form: Option<EditForm>,
    params: SshParams,
    tx: UnboundedSender<Message>,
    suspended: Arc<AtomicBool>,
    quit: bool,
}

impl App {
    pub fn new(storage: HostDb) -> (Self, UnboundedReceiver<Message>) {
        let (tx, rx) = unbounded_channel();
        let mut list = HostList::new();
        list.refresh(&storage);

        let app = Self {
            storage,
            list,
            form: None,
            params: SshParams::default(),
            tx,
            suspended: Arc::new(AtomicBool::new(false)),
            quit: false,
        };
        (app, rx)
    }

    pub async fn run(
        mut self,
        mut rx: UnboundedReceiver<Message>,
        terminal: &mut Terminal,
    ) -> anyhow::Result<()> {
        let stop = Arc::new(AtomicBool::new(false));
        self.spawn_input_reader(stop.clone());

        // Seed the resolved defaults for whatever is selected first.
        if let Some(host) = self.list.selected() {
            let _ = self.tx.send(Message::LoadSshConfig {
                hostname: host.address.clone(),
            });
        }

        self.draw(terminal)?;
        while let Some(message) = rx.recv().await {
            self.handle(message, terminal).await?;
            if self.quit {
                break;
            }
            self.draw(terminal)?;
        }

        stop.store(true, Ordering::Relaxed);
        self.storage.flush()?;
        Ok(())
    }

    fn draw(&mut self, terminal: &mut Terminal) -> anyhow::Result<()> {
        terminal.draw(|frame| match &mut self.form {
            Some(form) => form.view(frame),
            None => self.list.view(frame),
        })?;
        Ok(())
    }

    async fn handle(&mut self, message: Message, terminal: &mut Terminal) -> anyhow::Result<()> {
        match message {
            Message::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key);
            }
            Message::Terminal(Event::Resize(width, height)) => {
                debug!("terminal resized to {width}x{height}");
                if let Some(form) = &mut self.form {
                    form.resize(width, height);
                }
            }
            Message::Terminal(_) => {}
            Message::Debounced { tag, inner } => {
                // Envelopes outliving their form are just as stale as
                // superseded ones.
                if let Some(form) = &mut self.form {
                    let out = form.handle_debounced(tag, *inner);
                    self.send_all(out);
                }
            }
            Message::LoadSshConfig { hostname } => self.spawn_resolver(hostname),
            Message::SshConfigLoaded(params) => {
                self.params = params.clone();
                self.list.set_resolved(params.clone());
                if let Some(form) = &mut self.form {
                    form.apply_ssh_params(params);
                }
            }
            Message::EditHost(id) => {
                let host = id.and_then(|id| self.storage.get(id));
                if host.is_none() {
                    info!("edit a new host record");
                } else {
                    info!("edit host record {}", id.unwrap_or_default());
                }
                self.form = Some(EditForm::new(host, self.params.clone(), self.tx.clone()));
            }
            Message::CloseForm => {
                self.form = None;
            }
            Message::SelectHost(id) => {
                self.list.select_id(id);
                let out = self.reload_for_selection();
                self.send_all(out);
            }
            Message::RefreshList => {
                self.list.refresh(&self.storage);
                let out = self.reload_for_selection();
                self.send_all(out);
            }
            Message::RunCommand(command) => self.run_command(&command, terminal).await?,
            Message::Quit => {
                self.quit = true;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl+C leaves the program from anywhere.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }

        let out = match &mut self.form {
            Some(form) => form.handle_key(key, &mut self.storage),
            None => self.list.handle_key(key, &mut self.storage),
        };
        self.send_all(out);
    }

    fn reload_for_selection(&self) -> Vec<Message> {
        match self.list.selected() {
            Some(host) => vec![Message::LoadSshConfig {
                hostname: host.address.clone(),
            }],
            None => Vec::new(),
        }
    }

    /// Queues follow-up messages in emission order, behind whatever is
    /// already waiting.
    fn send_all(&self, messages: Vec<Message>) {
        for message in messages {
            let _ = self.tx.send(message);
        }
    }

    fn spawn_input_reader(&self, stop: Arc<AtomicBool>) {
        let tx = self.tx.clone();
        let suspended = self.suspended.clone();

        tokio::task::spawn_blocking(move || {
            while !stop.load(Ordering::Relaxed) {
                // A child process owns the terminal while we are
                // suspended; stay away from its input.
                if suspended.load(Ordering::Relaxed) {
                    std::thread::sleep(INPUT_POLL_INTERVAL);
                    continue;
                }

                match event::poll(INPUT_POLL_INTERVAL) {
                    Ok(true) => match event::read() {
                        Ok(event) => {
                            if tx.send(Message::Terminal(event)).is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            warn!("cannot read terminal event: {err}");
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(err) => {
                        warn!("cannot poll terminal events: {err}");
                        break;
                    }
                }
            }
        });
    }

    fn spawn_resolver(&self, hostname: String) {
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            let params = sshconfig::resolve(&hostname);
            let _ = tx.send(Message::SshConfigLoaded(params));
        });
    }

    async fn run_command(&mut self, command: &str, terminal: &mut Terminal) -> anyhow::Result<()> {
        info!("run command: {command}");

        self.suspended.store(true, Ordering::Relaxed);
        // Let the input reader notice before the child takes over.
        tokio::time::sleep(2 * INPUT_POLL_INTERVAL).await;

        terminal.suspend()?;
        let status = Command::new("sh").arg("-c").arg(command).status();
        terminal.resume()?;
        self.suspended.store(false, Ordering::Relaxed);

        match status {
            Ok(status) if status.success() => debug!("command finished: {status}"),
            Ok(status) => warn!("command finished: {status}"),
            Err(err) => warn!("cannot run command: {err}"),
        }

        Ok(())
    }
}
