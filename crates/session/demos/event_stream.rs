//! Event subscription example - watch network traffic during a navigation.

use cdp_session::{CdpClient, ClientConfig};
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let client = CdpClient::connect(ClientConfig::default()).await?;

    client.on("Network.requestWillBeSent", |params| {
        println!("-> {} {}", params["request"]["method"], params["request"]["url"]);
    });
    client.on("Network.responseReceived", |params| {
        println!("<- {} {}", params["response"]["status"], params["response"]["url"]);
    });
    client.on("Page.loadEventFired", |_| {
        println!("page load fired");
    });

    client.send_command("Network.enable", None).await?;
    client.send_command("Page.enable", None).await?;
    client
        .send_command("Page.navigate", Some(json!({"url": "https://example.com"})))
        .await?;

    // Let events stream in for a bit.
    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("{} messages ledgered", client.message_count());

    client.close().await?;
    Ok(())
}
