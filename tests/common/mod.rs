use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use todo_api_rust::auth::{generate_token, Claims};

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Secret handed to the spawned server and used to mint test tokens
pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/todo-api-rust");
        cmd.env("PORT", port.to_string())
            .env("BETTER_AUTH_SECRET", TEST_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL when set
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Authorization header value for a user, valid for one hour
#[allow(dead_code)]
pub fn bearer_for(user_id: &str) -> String {
    let claims = Claims::new(user_id, chrono::Duration::hours(1));
    let token = generate_token(&claims, TEST_SECRET).expect("failed to sign test token");
    format!("Bearer {}", token)
}

/// Authorization header value whose token expired well past validation leeway
#[allow(dead_code)]
pub fn expired_bearer_for(user_id: &str) -> String {
    let claims = Claims::new(user_id, chrono::Duration::hours(-2));
    let token = generate_token(&claims, TEST_SECRET).expect("failed to sign test token");
    format!("Bearer {}", token)
}

/// Fresh user id per call so tests never see each other's rows
#[allow(dead_code)]
pub fn unique_user(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}-{}-{}", prefix, nanos, n)
}

/// Database-backed cases skip cleanly on hosts without Postgres
#[allow(dead_code)]
pub fn db_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}
