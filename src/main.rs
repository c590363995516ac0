use spellsp::create_service;
use tower_lsp::Server;
use tracing::level_filters::LevelFilter;

#[tokio::main]
async fn main() {
    // stdout carries the protocol, so logs go to stderr.
    let level = std::env::var("SPELLSP_LOG")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = create_service();
    Server::new(stdin, stdout, socket).serve(service).await;
}
