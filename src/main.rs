use signalhub::signaling::{ServerConfig, SignalingServer};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let mut config = ServerConfig::default();
    if let Some(addr) = std::env::args().nth(1) {
        config.addr = addr
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    }

    println!("   Signalhub WebRTC Signaling Relay");
    println!("   Binding to {}", config.addr);
    println!("   Press Ctrl+C to stop\n");

    let server = SignalingServer::new(config);
    server.run().await
}
