//! Basic session example - connect, bind to a page, issue commands.

use cdp_session::{CdpClient, ClientConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ClientConfig::new("ws://localhost:9222/devtools/browser", 136);
    println!("Connecting to {}", config.url);

    let client = CdpClient::connect(config).await?;
    println!("Bound to session {:?}", client.session_id());
    println!(
        "Loaded protocol catalog for version {}",
        client.catalog().version
    );

    let version = client
        .send_command_unscoped("Browser.getVersion", None)
        .await?;
    println!("Browser: {}", version["product"]);

    client.send_command("Page.enable", None).await?;
    let result = client
        .send_command("Page.navigate", Some(json!({"url": "https://example.com"})))
        .await?;
    println!("Navigated, frame {}", result["frameId"]);

    client.close().await?;
    Ok(())
}
