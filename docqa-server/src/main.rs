use docqa_server::{
    ServerConfig,
    config::LogFormat,
    run_server,
    server::SERVICE_NAME,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    match config.log_format {
        LogFormat::Text => docqa_telemetry::init_telemetry(SERVICE_NAME),
        LogFormat::Json => docqa_telemetry::init_json_telemetry(SERVICE_NAME),
    };

    run_server(config).await
}
