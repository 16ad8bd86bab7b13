//! Live-reload dev server
//!
//! Serves the staging tree with the project root as fallback and exposes a
//! `/__livereload` server-sent-events endpoint fed by the build context's
//! reload channel. The serve task completes once the listener is bound; the
//! server itself outlives the run.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;

use async_trait::async_trait;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use colored::*;
use futures::stream::{self, Stream};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::execution::runner::TaskRunner;
use crate::graph::{Action, Outcome};
use crate::types::SiteResult;

pub struct Serve {
    dev_dir: PathBuf,
    port: u16,
}

impl Serve {
    pub fn new(dev_dir: PathBuf, port: u16) -> Self {
        Self { dev_dir, port }
    }
}

#[async_trait]
impl Action for Serve {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome> {
        let root = runner.context().root.clone();
        let dev_root = root.join(&self.dev_dir);

        let app = Router::new()
            .route("/__livereload", get(reload_events))
            .fallback_service(ServeDir::new(dev_root).fallback(ServeDir::new(root)))
            .with_state(runner.context().reload_sender());

        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        println!("{} http://{}", "Serving".green().bold(), addr);

        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app).await {
                eprintln!("{} {}", "Dev server error:".red().bold(), error);
            }
        });

        Ok(Outcome::Started)
    }
}

async fn reload_events(
    State(reload): State<broadcast::Sender<()>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = reload.subscribe();
    let stream = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            // A lagged client still wants one reload, not a backlog.
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                Some((Ok(Event::default().event("reload").data("reload")), rx))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Publishes one reload event to connected clients. Nobody listening is fine.
pub struct Reload;

#[async_trait]
impl Action for Reload {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome> {
        let _ = runner.context().reload_sender().send(());
        Ok(Outcome::Finished)
    }
}
