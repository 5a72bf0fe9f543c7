use splunk_pump::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // reqwest builds its own provider, but rustls still wants a process default.
    let _ = rustls::crypto::ring::default_provider().install_default();
    app::main().await
}
