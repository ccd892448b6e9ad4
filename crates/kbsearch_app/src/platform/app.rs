use std::io::Write as _;
use std::sync::Arc;

use anyhow::Result;
use kb_logging::{kb_info, kb_warn};
use kbsearch_client::{Credentials, HttpGateway, MemoryCredentials, SessionDriver};
use kbsearch_core::{Effect, Msg, SessionState};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::commands::{self, Command, HELP};
use super::config::AppConfig;
use super::render::{render_facets, render_history, Renderer};

pub async fn run(config: AppConfig) -> Result<()> {
    let credentials = Arc::new(MemoryCredentials::new());
    if let Some(token) = config.token.clone() {
        credentials.store(token);
    }
    let gateway = Arc::new(HttpGateway::new(
        config.client_settings(),
        credentials.clone(),
    )?);
    kb_info!("Using backend {}", gateway.settings().base_url);

    let mut app = App {
        driver: SessionDriver::new(
            SessionState::with_config(config.session_config()?),
            gateway.clone(),
            gateway.clone(),
            config.driver_settings(),
        ),
        gateway,
        renderer: Renderer::new(),
        quit: false,
    };

    println!("kbsearch, type :help for commands");
    if credentials.bearer().is_none() {
        println!("Not signed in. Use :login <user> <password>");
    } else {
        app.dispatch(Msg::SessionStarted);
    }
    app.render();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !app.quit {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => app.handle_line(&line).await,
                    None => break,
                }
            }
            Some(effects) = app.driver.next(), if app.driver.outstanding() > 0 => {
                app.handle_effects(effects);
            }
        }
        app.render();
    }

    kb_info!("Session ended");
    Ok(())
}

struct App {
    driver: SessionDriver,
    gateway: Arc<HttpGateway>,
    renderer: Renderer,
    quit: bool,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let effects = self.driver.dispatch(msg);
        self.handle_effects(effects);
    }

    fn handle_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ReturnToLogin => {
                    kb_warn!("Credential rejected; waiting for sign-in");
                }
                other => kb_warn!("Unhandled effect {:?}", other),
            }
        }
    }

    async fn handle_line(&mut self, line: &str) {
        let command = match commands::parse(line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                return;
            }
        };

        match command {
            Command::Query(text) => {
                if self.driver.state().is_busy() {
                    println!("A search is still running; try again when it finishes.");
                    return;
                }
                self.dispatch(Msg::InputChanged(text));
                self.dispatch(Msg::QuerySubmitted);
            }
            Command::SubmitPending => self.dispatch(Msg::QuerySubmitted),
            Command::ShowHistory => print!("{}", render_history(&self.driver.view())),
            Command::PickHistory(n) => {
                self.dispatch(Msg::HistorySelected { index: n - 1 });
                self.show_input();
            }
            Command::PickExample(n) => {
                self.dispatch(Msg::ExampleSelected { index: n - 1 });
                self.show_input();
            }
            Command::Preview(n) => self.preview(n),
            Command::ClosePreview => self.dispatch(Msg::PreviewClosed),
            Command::Filter { field, value } => {
                self.dispatch(Msg::FilterChanged { field, value });
                println!("filters: {:?}", self.driver.view().filters.pairs());
            }
            Command::ShowFacets => print!("{}", render_facets(self.driver.state().facets())),
            Command::Login { username, password } => {
                match self.gateway.login(&username, &password).await {
                    Ok(()) => {
                        println!("Signed in as {username}");
                        self.dispatch(Msg::SignedIn);
                    }
                    Err(err) => println!("Sign-in failed: {err}"),
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => self.quit = true,
        }
    }

    fn preview(&mut self, n: usize) {
        let target = self
            .driver
            .view()
            .entries
            .iter()
            .rev()
            .find(|entry| !entry.results.is_empty())
            .and_then(|entry| entry.results.get(n - 1))
            .map(|row| (row.document_id, row.filename.clone()));
        match target {
            Some((document_id, filename)) => self.dispatch(Msg::PreviewRequested {
                document_id,
                filename,
            }),
            None => println!("No result [{n}] in the latest answer"),
        }
    }

    fn show_input(&self) {
        let input = self.driver.state().pending_input();
        if !input.is_empty() {
            println!("input: {input}  (press Enter to search)");
        }
    }

    fn render(&mut self) {
        if self.driver.consume_dirty() {
            print!("{}", self.renderer.render(&self.driver.view()));
        }
    }
}

fn prompt() {
    print!("? ");
    let _ = std::io::stdout().flush();
}
