//! In-process mock backend for client tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use uuid::Uuid;

use super::{ApiClient, MemoryTokenStore};
use crate::config::HttpTimeouts;
use crate::model::{AuthSession, Role, User};

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock backend failed");
    });
    format!("http://{addr}")
}

#[must_use]
pub fn session(role: Role) -> AuthSession {
    AuthSession {
        token: format!("token-{role}"),
        user: User { id: Uuid::new_v4(), email: format!("{role}@example.com"), name: format!("Test {role}"), role },
    }
}

/// Client against `base_url`, logged in as `role` when given.
#[must_use]
pub fn client(base_url: &str, role: Option<Role>) -> (ApiClient, Arc<MemoryTokenStore>) {
    let tokens = Arc::new(role.map_or_else(MemoryTokenStore::new, |r| MemoryTokenStore::with_session(session(r))));
    let timeouts = HttpTimeouts { request: Duration::from_secs(5), connect: Duration::from_secs(2) };
    let client = ApiClient::new(base_url, timeouts, Duration::from_secs(60), tokens.clone()).expect("client build");
    (client, tokens)
}
