use mock_server::MockConfig;
use pet_manager_client::{ApiClient, ApiConfig, Session};
use tokio::net::TcpListener;

/// Starts a mock API on a random loopback port and returns its base URL.
pub async fn spawn_server(config: MockConfig) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = mock_server::run_with(listener, config).await {
            panic!("mock server stopped: {e}");
        }
    });
    format!("http://{addr}")
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig::new(base_url), Session::new()).unwrap()
}

pub async fn logged_in_client(base_url: &str) -> ApiClient {
    let api = client(base_url);
    pet_manager_client::services::login(&api, "admin", "secret")
        .await
        .unwrap();
    api
}
