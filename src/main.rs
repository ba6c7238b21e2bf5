// Entrypoint for the demo CLI.
// - Installs logging on stderr (`RUST_LOG`, default `warn`) so it stays
//   out of the way of the menu.
// - Builds the API client from config file + `BHIV_*` environment and hands
//   it to the UI loop.

use bhiv_mobile_cli::{api::ApiClient, ui::main_menu};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let api = ApiClient::from_env()?;
    tracing::debug!(base_url = api.base_url(), "client configured");

    main_menu(api)?;
    Ok(())
}
