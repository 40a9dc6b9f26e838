//! Example: Run the bridge against a recorded account and print what the hub would see.

use std::sync::Arc;

use async_trait::async_trait;
use totalconnect_bridge::{
    Bridge, BridgeConfig, Command, DriverValue, Hub, NodeInfo, ReplayUpstream, UpstreamClient,
};

/// Hub that prints to stdout.
struct PrintHub;

#[async_trait]
impl Hub for PrintHub {
    async fn add_node(&self, node: &NodeInfo, update: bool) {
        println!(
            "  node   {:12} {:?} {:30} parent={:?} update={}",
            node.address, node.kind, node.name, node.parent, update
        );
    }

    async fn publish_drivers(&self, address: &str, drivers: &[DriverValue]) {
        let values: Vec<String> = drivers
            .iter()
            .map(|d| format!("{}={}", d.driver, d.value))
            .collect();
        println!("  driver {:12} {}", address, values.join(" "));
    }

    async fn set_notice(&self, key: &str, message: &str) {
        println!("  notice {key}: {message}");
    }

    async fn clear_notices(&self) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = BridgeConfig::builder()
        .user("me@example.com")
        .password("secret")
        .zone_query_delay_ms(100)
        .build();

    let json = std::fs::read_to_string("demos/account.json")?;
    let upstream: Arc<dyn UpstreamClient> =
        Arc::new(ReplayUpstream::from_json(&config.user, &config.password, &json)?);
    let hub: Arc<dyn Hub> = Arc::new(PrintHub);

    println!("--- Start ---");
    let mut bridge = Bridge::new(config, upstream, hub);
    bridge.start().await?;

    println!("\n--- Zones ---");
    bridge.long_poll().await;

    println!("\n--- Arm away, then poll panels ---");
    bridge.execute("panel_7", Command::ArmAway).await;
    bridge.short_poll().await;

    println!("\n--- Disarm (refused: allow_disarming is off) ---");
    bridge.execute("panel_7", Command::Disarm).await;

    Ok(())
}
