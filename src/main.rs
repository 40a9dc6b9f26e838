// MIT License - Copyright (c) 2026 Peter Wright
// MQTT bridge

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::Duration;
use tracing::{error, info, warn};

use totalconnect_bridge::mqtt::{command_topic, parse_command};
use totalconnect_bridge::{
    Bridge, BridgeConfig, BridgeEvent, EventSender, Hub, MqttHub, ReplayUpstream, UpstreamClient,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "totalconnect2mqtt")]
#[command(about = "Bridge between a Total Connect security account and MQTT")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default)]
    totalconnect: TotalConnectToml,
    #[serde(default)]
    poll: PollToml,
    mqtt: MqttToml,
    account: AccountToml,
}

#[derive(Debug, Default, Deserialize)]
struct TotalConnectToml {
    #[serde(default)]
    user: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    include_non_bypassable_zones: bool,
    #[serde(default)]
    allow_disarming: bool,
    /// Minutes between re-authentications
    #[serde(default = "default_refresh_auth_interval")]
    refresh_auth_interval: u64,
    #[serde(default = "default_zone_query_delay")]
    zone_query_delay_ms: u64,
}

fn default_refresh_auth_interval() -> u64 {
    120
}
fn default_zone_query_delay() -> u64 {
    500
}

#[derive(Debug, Deserialize)]
struct PollToml {
    #[serde(default = "default_short_poll")]
    short_poll_secs: u64,
    #[serde(default = "default_long_poll")]
    long_poll_secs: u64,
}

impl Default for PollToml {
    fn default() -> Self {
        Self {
            short_poll_secs: default_short_poll(),
            long_poll_secs: default_long_poll(),
        }
    }
}

fn default_short_poll() -> u64 {
    30
}
fn default_long_poll() -> u64 {
    300
}

#[derive(Debug, Deserialize)]
struct MqttToml {
    url: String,
    #[serde(default = "default_client_id")]
    client_id: String,
    #[serde(default = "default_topic_prefix")]
    topic_prefix: String,
}

fn default_client_id() -> String {
    "totalconnect-bridge".to_string()
}
fn default_topic_prefix() -> String {
    "totalconnect".to_string()
}

#[derive(Debug, Deserialize)]
struct AccountToml {
    /// Recorded account snapshot (JSON) served in place of the cloud API
    replay_file: String,
}

fn build_bridge_config(config: &Config) -> BridgeConfig {
    let tc = &config.totalconnect;
    BridgeConfig::builder()
        .user(&tc.user)
        .password(&tc.password)
        .include_non_bypassable_zones(tc.include_non_bypassable_zones)
        .allow_disarming(tc.allow_disarming)
        .refresh_auth_interval_mins(tc.refresh_auth_interval)
        .zone_query_delay_ms(tc.zone_query_delay_ms)
        .short_poll_secs(config.poll.short_poll_secs)
        .long_poll_secs(config.poll.long_poll_secs)
        .build()
}

fn load_config(path: &str) -> Result<Config> {
    let text = std::fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&text).context("Failed to parse config file")
}

/// Parse an MQTT URL like "mqtt://host:port" into (host, port).
fn parse_mqtt_url(url: &str) -> Result<(String, u16)> {
    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port_str) = stripped
        .rsplit_once(':')
        .context("MQTT URL must be in format mqtt://host:port")?;

    let port: u16 = port_str.parse().context("Invalid MQTT port number")?;

    Ok((host.to_string(), port))
}

// ---------------------------------------------------------------------------
// MQTT command intake
// ---------------------------------------------------------------------------

async fn run_mqtt(mut eventloop: rumqttc::EventLoop, client: AsyncClient, cmd_topic: String, handle: EventSender) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                // rumqttc does not resubscribe after a broker reconnect
                info!("MQTT: connected, subscribing to {cmd_topic}");
                if let Err(e) = client.subscribe(&cmd_topic, QoS::AtLeastOnce).await {
                    error!("Failed to subscribe to {cmd_topic}: {e}");
                }
            }
            Ok(Event::Incoming(Packet::Publish(msg))) if msg.topic == cmd_topic => {
                match parse_command(&msg.payload) {
                    Ok(event) => {
                        info!("MQTT command received: {}", String::from_utf8_lossy(&msg.payload));
                        if handle.send(event).await.is_err() {
                            warn!("Engine stopped, dropping command");
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to parse MQTT command: {e}"),
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!("MQTT event loop error: {e}");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=totalconnect_bridge=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let bridge_config = build_bridge_config(&config);
    let (mqtt_host, mqtt_port) = parse_mqtt_url(&config.mqtt.url)?;

    let account = std::fs::read_to_string(&config.account.replay_file)
        .context("Failed to read account replay file")?;
    let upstream: Arc<dyn UpstreamClient> = Arc::new(
        ReplayUpstream::from_json(&bridge_config.user, &bridge_config.password, &account)
            .context("Failed to parse account replay file")?,
    );

    let mut mqtt_opts = MqttOptions::new(&config.mqtt.client_id, &mqtt_host, mqtt_port);
    mqtt_opts.set_keep_alive(Duration::from_secs(30));
    let (client, eventloop) = AsyncClient::new(mqtt_opts, 256);
    let prefix = config.mqtt.topic_prefix.clone();
    let hub: Arc<dyn Hub> = Arc::new(MqttHub::new(client.clone(), prefix.clone()));

    let mut bridge = Bridge::new(bridge_config, upstream, hub);
    let handle = bridge.handle();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let mqtt_handle = tokio::spawn(run_mqtt(eventloop, client, command_topic(&prefix), handle.clone()));

    let engine_handle = tokio::spawn(async move {
        if let Err(e) = bridge.start().await {
            warn!("Bridge started without a complete device tree: {e}");
        }
        bridge.run(shutdown_rx).await;
    });

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    info!("Bridge running. Send SIGHUP to reload config, SIGINT/SIGTERM to stop.");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }
            _ = sighup.recv() => {
                // Credentials, MQTT and replay settings take effect on restart only
                info!("Received SIGHUP, reloading config from {}", cli.config);
                match load_config(&cli.config) {
                    Ok(new_config) => {
                        let event = BridgeEvent::ApplyConfig(Box::new(build_bridge_config(&new_config)));
                        if handle.send(event).await.is_err() {
                            warn!("Engine stopped, cannot apply config");
                        }
                    }
                    Err(e) => warn!("Failed to reload config, keeping previous: {e:#}"),
                }
            }
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = engine_handle.await {
        warn!("Engine task ended abnormally: {e}");
    }
    mqtt_handle.abort();

    info!("Shutdown complete");
    Ok(())
}
