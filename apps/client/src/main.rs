mod backend;
mod cli;
mod config;
mod error;
mod resize;
mod view;

use error::WrapErr;

use clap::Parser;
use rpc::search::User;
use search_controller::{ChannelObserver, ControllerRuntime};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use view::{TerminalView, ViewInput};

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();
    init_tracing(command_line.verbose);

    let cfg = config::Config::load().context("Load configuration error")?;
    info!("config file {:?}, socket {:?}", cfg.config_path, cfg.socket_path);
    let credential = command_line.credential.or_else(|| cfg.app.credential.clone());

    let client = backend::connect(&cfg.socket_path).await?;
    let service = backend::RpcSearchService::new(client, credential);

    let (observer, mut events) = ChannelObserver::channel();
    let (resize_tx, mut resizes) = mpsc::unbounded_channel();
    let handle = ControllerRuntime::new(service, observer, cfg.controller.to_controller_config())
        .with_notification_source(Arc::new(resize::WindowResizeSource::new(resize_tx)))
        .spawn::<User>();
    handle.activate()?;

    let mut view = TerminalView::default();
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Read stdin")? else {
                    break;
                };
                match view::parse_line(&line) {
                    Ok(ViewInput::Text(text)) => handle.input_changed(text)?,
                    Ok(ViewInput::More) => {
                        handle.reached_bottom_changed(true)?;
                        handle.reached_bottom_changed(false)?;
                    }
                    Ok(ViewInput::Open(index)) => {
                        if let Err(e) = handle.select_record(index).await {
                            view.notice(&mut stdout, &e.to_string())?;
                        }
                    }
                    Ok(ViewInput::Status) => {
                        let snapshot = handle.snapshot().await?;
                        view.status(&mut stdout, &snapshot)?;
                    }
                    Ok(ViewInput::Quit) => break,
                    Err(message) => view.notice(&mut stdout, &message)?,
                }
            }
            Some(event) = events.recv() => view.render(&event, &mut stdout)?,
            Some(()) = resizes.recv() => {
                let snapshot = handle.snapshot().await?;
                view.status(&mut stdout, &snapshot)?;
            }
        }
    }

    handle.deactivate()?;
    handle.shutdown()?;
    Ok(())
}
