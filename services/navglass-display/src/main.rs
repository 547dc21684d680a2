use anyhow::{bail, Context};
use navglass_binding::{DispatchHooks, ElementTable, Frame, MarkerFilter, MessageDispatcher};
use navglass_core::{logging, DisplayConfig};
use navglass_link::{ConnectionManager, TelemetryEndpoint};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, info, warn};

mod console;
mod operator;

use console::ConsoleDocument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let config_path = parse_config_path(&args)?;
    let config = DisplayConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let endpoint = TelemetryEndpoint::from_config(&config.endpoint)?;

    if args.iter().any(|arg| arg == "--print-endpoint") {
        println!("{}", endpoint);
        return Ok(());
    }

    logging::init_from(&config.logging);

    let layout = config.layout_ids()?;
    if layout.is_empty() {
        warn!("Layout has no elements, nothing will be displayed");
    }
    let display = ConsoleDocument::new(ElementTable::from_ids(layout));

    let marker_filter = MarkerFilter::new(config.marker_filter);
    let hooks = DispatchHooks::new().with_post_update(|frame: &Frame| {
        let sections: Vec<_> = frame.present_sections().map(|s| s.key()).collect();
        debug!(?sections, "Frame applied");
    });
    let dispatcher = MessageDispatcher::with_hooks(hooks, marker_filter.clone());

    let mut manager = ConnectionManager::new(endpoint, &config.retry, dispatcher, display);
    info!(
        endpoint = %manager.endpoint(),
        marker_filter = ?marker_filter.get(),
        "NavGlass display starting"
    );

    let mut link_state = manager.subscribe();
    tokio::spawn(async move {
        while link_state.changed().await.is_ok() {
            let state = *link_state.borrow_and_update();
            info!(%state, stale = state.is_disconnected(), "Telemetry link");
        }
    });

    std::thread::spawn(move || operator::listen(marker_filter));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C, shutting down");
        } else {
            info!("Stopping");
        }
        let _ = shutdown_tx.send(true);
    });

    manager.run(shutdown_rx).await?;
    Ok(())
}

fn parse_config_path(args: &[String]) -> anyhow::Result<PathBuf> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(PathBuf::from(path));
            }
            bail!("--config was provided without a path");
        }
    }

    bail!("missing required --config <path> argument")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_config_path() {
        let path = parse_config_path(&args(&["navglass-display", "--config", "nav.toml"])).unwrap();
        assert_eq!(path, PathBuf::from("nav.toml"));
    }

    #[test]
    fn test_parse_config_path_errors() {
        assert!(parse_config_path(&args(&["navglass-display"])).is_err());
        assert!(parse_config_path(&args(&["navglass-display", "--config"])).is_err());
    }
}
