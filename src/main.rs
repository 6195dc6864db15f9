use std::io;

use melo_chat::{
    config::ChatConfig,
    services::transport::HttpTransport,
    ui::{Shell, Theme},
};
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ChatConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(io::stderr)
        .init();

    let transport = HttpTransport::new(&config)?;
    info!(endpoint = transport.endpoint(), "chat client starting");

    let mut shell = Shell::new(transport, io::stdout(), Theme::default())?;
    shell.widget_mut().set_idle_timeout(config.idle_timeout);
    shell.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
