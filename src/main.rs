//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use grand_salto::{app, config::AppState};

#[tokio::main]
async fn main() {
    // RUST_LOG controla o nível; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Sem configuração ou banco a aplicação não deve iniciar
    let app_state = match AppState::new().await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Falha ao inicializar o estado da aplicação: {:#}", e);
            std::process::exit(1);
        }
    };

    let addr = app_state.config.bind_addr.clone();
    let router = app(app_state);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Falha ao iniciar o listener TCP em {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("🚀 Servidor escutando em {}", addr);

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("Erro no servidor Axum: {}", e);
        std::process::exit(1);
    }
}
