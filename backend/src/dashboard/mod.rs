//! Interactive admin dashboard.
//!
//! `run` is the composition root: it wires the auth gateway, the session
//! context and the event store client together, gates the events view on a
//! resolved admin session, and then serves a small command loop.

pub mod navigation;
pub mod prompt;
pub mod render;
pub mod view;

use crate::auth::{AuthGateway, FirestorePermissionStore, GoogleIdentityProvider};
use crate::client::event_client::HttpEventStoreClient;
use crate::config::DashboardConfig;
use anyhow::Result;
use navigation::TerminalNavigator;
use prompt::TerminalPrompter;
use render::render_view;
use std::sync::Arc;
use tracing::info;
use view::{DeleteOutcome, EventsView};

const HELP: &str = "Commands: list, refresh, new, view <id>, edit <id>, delete <id>, logout, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Refresh,
    New,
    View(String),
    Edit(String),
    Delete(String),
    Logout,
    Quit,
    Help,
    Unknown(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let mut parts = input.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let argument = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Command::Unknown(input.trim().to_string());
        }

        match (verb.as_str(), argument) {
            ("list" | "ls", None) => Command::List,
            ("refresh", None) => Command::Refresh,
            ("new" | "create", None) => Command::New,
            ("view", Some(id)) => Command::View(id),
            ("edit", Some(id)) => Command::Edit(id),
            ("delete" | "rm", Some(id)) => Command::Delete(id),
            ("logout", None) => Command::Logout,
            ("quit" | "exit", None) => Command::Quit,
            ("help" | "", None) => Command::Help,
            _ => Command::Unknown(input.trim().to_string()),
        }
    }
}

pub async fn run(config: DashboardConfig) -> Result<()> {
    let provider = GoogleIdentityProvider::new(config.google.clone())?;
    let permissions = FirestorePermissionStore::new(config.firestore.clone())?;
    let gateway = AuthGateway::new(provider, permissions)
        .with_sign_out_unauthorized(config.sign_out_unauthorized);

    let _auth_log = gateway.subscribe_to_auth_state(|state| info!("Auth state: {}", state));
    let session = gateway.session();

    let signed_in = gateway.sign_in_with_google().await?;
    println!("Signed in as {}", signed_in.user.email);

    let client = Arc::new(HttpEventStoreClient::new(&config.events_api_base_url)?);
    let mut view = EventsView::new(client);
    let prompter = TerminalPrompter;
    let navigator = TerminalNavigator;

    view.load().await;
    println!("{}", render_view(view.state()));
    println!("{HELP}");

    while session.is_admin() {
        let Some(line) = prompter.read_line("events> ")? else {
            break;
        };

        match Command::parse(&line) {
            Command::List => println!("{}", render_view(view.state())),
            Command::Refresh => {
                view.load().await;
                println!("{}", render_view(view.state()));
            }
            Command::New => {
                view.create_event(&navigator);
            }
            Command::View(id) => {
                view.view_event(&id, &navigator);
            }
            Command::Edit(id) => {
                view.edit_event(&id, &navigator);
            }
            Command::Delete(id) => {
                if view.delete(&id, &prompter).await == DeleteOutcome::Deleted {
                    println!("{}", render_view(view.state()));
                }
            }
            Command::Logout => match gateway.sign_out().await {
                Ok(()) => println!("Signed out."),
                Err(e) => eprintln!("{e}"),
            },
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Unknown(input) => println!("Unknown command '{input}'. {HELP}"),
        }
    }

    info!("Dashboard closed ({})", session.current());
    Ok(())
}
