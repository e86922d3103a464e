//! Test server management.
//!
//! Spawns and manages acwardend instances for integration testing.

use serde_json::Value;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

/// Storage backend for a spawned server.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    File,
    Database,
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: PathBuf,
    client: reqwest::Client,
}

impl TestServer {
    /// Spawn a server on `port` with the flat-file backend.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with(port, Backend::File).await
    }

    /// Spawn a server on `port` with the given backend.
    pub async fn spawn_with(port: u16, backend: Backend) -> anyhow::Result<Self> {
        // Create temporary directory for test data
        let data_dir = std::env::temp_dir().join(format!("acwarden-test-{}", port));
        let _ = std::fs::remove_dir_all(&data_dir);
        std::fs::create_dir_all(&data_dir)?;

        let backend = match backend {
            Backend::File => "file",
            Backend::Database => "database",
        };

        let config_path = data_dir.join("acwarden.toml");
        let config_content = format!(
            r#"
[server]
name = "test.acwarden"
listen = "127.0.0.1:{port}"
metrics = true

[storage]
backend = "{backend}"
path = "{dir}/test.db"
data_dir = "{dir}/data"

[webhook]
timeout_secs = 1
"#,
            port = port,
            backend = backend,
            dir = data_dir.display()
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_acwardend"))
            .arg(&config_path)
            .env_remove("DATABASE_URL")
            .spawn()?;

        let server = Self {
            child,
            port,
            data_dir,
            client: reqwest::Client::new(),
        };

        // Wait for server to start listening
        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..30 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 3 seconds")
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// GET a path, returning status and JSON body.
    pub async fn get(&self, path: &str) -> anyhow::Result<(u16, Value)> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }

    /// POST a JSON body, returning status and JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<(u16, Value)> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }

    /// POST a raw body with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> anyhow::Result<(u16, Value)> {
        let response = self
            .client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }

    /// GET a path as text.
    pub async fn get_text(&self, path: &str) -> anyhow::Result<(u16, String)> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status().as_u16();
        Ok((status, response.text().await?))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Kill the server process
        let _ = self.child.kill();
        let _ = self.child.wait();

        // Clean up test data directory
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}
