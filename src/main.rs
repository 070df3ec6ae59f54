//! switchd — telephony inbound-event dispatch server.
//!
//! Owns a single signaling connection, admission-gates inbound call offers
//! on process lifecycle state, and routes accepted events to per-call
//! inboxes. The wire protocol layer feeds events through the connection's
//! injector; this binary wires the core together and runs until
//! interrupted.
//!
//! Usage:
//!   switchd --username usera@127.0.0.1 --password secret     # xmpp platform
//!   switchd --platform asterisk --host pbx.local --port 5038
//!   switchd --verbose                                        # debug logging

use std::sync::Arc;

use clap::Parser;
use switch_server::{
    ActiveCall, CallRegistry, CallRouter, EventDispatcher, LifecycleGate, LifecycleState,
    TracingDiagnostics,
};
use switch_transport::{connect, ConnectionConfig, Platform};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "switchd", about = "Telephony inbound-event dispatch server")]
struct Cli {
    /// Signaling platform (xmpp or asterisk)
    #[arg(long, default_value = "xmpp")]
    platform: String,

    /// Account name (a JID for the xmpp platform)
    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Disable automatic reconnection in the wire layer
    #[arg(long)]
    no_reconnect: bool,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Root domain used to scope the transport
    #[arg(long)]
    root_domain: Option<String>,

    /// Domain calls are addressed under
    #[arg(long)]
    calls_domain: Option<String>,

    /// Domain mixers are addressed under
    #[arg(long)]
    mixers_domain: Option<String>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

/// Routing collaborator for the standalone binary: takes each accepted
/// call's inbox and logs its events until the call ends.
struct LoggingRouter;

impl CallRouter for LoggingRouter {
    async fn dispatch(&self, call: Arc<ActiveCall>) {
        let Some(mut inbox) = call.take_inbox() else {
            return;
        };
        info!(call_id = %call.id, "call routed");
        while let Some(event) = inbox.recv().await {
            info!(call_id = %call.id, %event, "call event");
        }
        info!(call_id = %call.id, "call inbox closed");
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let platform: Platform = match cli.platform.parse() {
        Ok(platform) => platform,
        Err(err) => {
            error!(%err, "invalid --platform");
            std::process::exit(2);
        }
    };

    let config = ConnectionConfig {
        platform,
        username: cli.username,
        password: cli.password,
        auto_reconnect: !cli.no_reconnect,
        host: cli.host,
        port: cli.port,
        root_domain: cli.root_domain,
        calls_domain: cli.calls_domain,
        mixers_domain: cli.mixers_domain,
    };

    let (adapter, mut rejects) = match connect(&config) {
        Ok(connected) => connected,
        Err(err) => {
            error!(%err, "failed to establish signaling connection");
            std::process::exit(1);
        }
    };

    let registry = Arc::new(CallRegistry::new());
    let gate = Arc::new(LifecycleGate::new());
    let dispatcher = EventDispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&gate),
        Arc::new(LoggingRouter),
        adapter.clone(),
        Arc::new(TracingDiagnostics),
    );
    adapter.bind(dispatcher);

    // Drain outbound rejects; in a full deployment the wire layer does
    // this and turns each entry into a protocol-level reject.
    tokio::spawn(async move {
        while let Some((call_id, cause)) = rejects.recv().await {
            info!(%call_id, %cause, "call rejected");
        }
    });

    gate.set_state(LifecycleState::Running);
    info!(platform = %adapter.platform(), "switchd running");

    tokio::signal::ctrl_c().await.ok();

    gate.set_state(LifecycleState::Stopping);
    for call in registry.all() {
        registry.remove(&call.id);
    }
    info!("shutdown complete");
}
