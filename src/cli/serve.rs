use crate::api;
use crate::core::AppConfig;

pub async fn run(host: String, port: String, config: AppConfig) {
    api::serve(host, port, config).await;
}
