/// Structured logging setup for the service process
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chat_service=debug,tower_http=debug,sqlx=warn".into()),
        )
        .init();
}
