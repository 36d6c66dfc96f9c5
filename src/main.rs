mod api;
mod app;
mod config;
mod logging;
mod modal;
mod models;
mod task;

use std::sync::Arc;

use clap::Parser;

use crate::{
    api::HttpNotesApi,
    app::App,
    config::{Cli, Config},
    logging::initialize_logging,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv::dotenv().ok();

    let config = Config::from_cli(Cli::parse())?;
    initialize_logging(&config.log_file)?;

    let api = HttpNotesApi::new(&config.api_url);
    tracing::info!(endpoint = api.endpoint(), "starting notes-list");
    let mut app = App::new(Arc::new(api));

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal).await;
    ratatui::restore();

    if let Err(error) = &result {
        tracing::error!(%error, "notes-list exited with an error");
    }
    result
}
