use std::{path::PathBuf, sync::Arc, time::Duration};

use color_eyre::Result;
use crossterm::event::{Event, EventStream};
use ratatui::DefaultTerminal;
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::StreamExt;

use dynaview::dynamodb::{DynamoBackend, RetrievalClient};
use dynaview::navigation::{Command, LoadingState, Message, Session};
use dynaview::pagination::PageFetch;

use crate::{keys, widgets, widgets::theme::Theme};

/// Owns the session and the terminal; backend work runs on spawned tasks
/// that report back through the message channel.
pub struct App {
    session: Session,
    client: Arc<RetrievalClient<DynamoBackend>>,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    context: String,
    theme: Theme,
    throbber: ThrobberState,
    should_quit: bool,
    dirty: bool,
}

impl App {
    const FRAMES_PER_SECOND: f32 = 30.0;
    const SPINNER_EVERY: u64 = 4;

    pub fn new(client: RetrievalClient<DynamoBackend>, context: String, export_dir: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(export_dir),
            client: Arc::new(client),
            tx,
            rx,
            context,
            theme: Theme::default(),
            throbber: ThrobberState::default(),
            should_quit: false,
            dirty: true,
        }
    }

    pub async fn run_tui(self) -> Result<()> {
        let terminal = ratatui::init();
        let app_result = self.run(terminal).await;
        ratatui::restore();
        app_result
    }

    async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let commands = self.session.start();
        self.execute(commands);

        let period = Duration::from_secs_f32(1.0 / Self::FRAMES_PER_SECOND);
        let mut interval = tokio::time::interval(period);
        let mut events = EventStream::new();
        let mut ticks: u64 = 0;

        while !self.should_quit {
            if self.dirty {
                self.draw(&mut terminal)?;
            }
            tokio::select! {
                _ = interval.tick() => {
                    ticks += 1;
                    if self.is_busy() && ticks.is_multiple_of(Self::SPINNER_EVERY) {
                        self.throbber.calc_next();
                        self.dirty = true;
                    }
                },
                Some(event) = events.next() => {
                    let event = event?;
                    self.handle_event(&event);
                },
                Some(message) = self.rx.recv() => {
                    let commands = self.session.apply(message);
                    self.execute(commands);
                },
            }
        }
        tracing::debug!("quit");
        Ok(())
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut body_height = 0;
        terminal.draw(|frame| {
            body_height = widgets::draw(
                frame,
                &self.session,
                &self.context,
                &self.theme,
                &mut self.throbber,
            );
        })?;
        self.session.set_viewport_height(body_height as usize);
        self.dirty = false;
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.session.pager().is_loading()
            || *self.session.table_list().loading() == LoadingState::Loading
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Resize(_, _) => self.dirty = true,
            _ => {
                let Some(key) = event.as_key_press_event() else {
                    return;
                };
                let Some(input) = keys::to_input(&key) else {
                    return;
                };
                let commands = self.session.handle(input);
                self.execute(commands);
            }
        }
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Invalidate => self.dirty = true,
                Command::Quit => self.should_quit = true,
                Command::LoadTables { request_id } => self.spawn_load_tables(request_id),
                Command::FetchPage(fetch) => self.spawn_fetch(fetch),
            }
        }
    }

    fn spawn_load_tables(&self, request_id: u64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.list_tables().await;
            let _ = tx.send(Message::TablesLoaded { request_id, result });
        });
    }

    fn spawn_fetch(&self, fetch: PageFetch) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.fetch(&fetch.request, fetch.start_key.clone()).await;
            let _ = tx.send(Message::PageLoaded { fetch, result });
        });
    }
}
