//! Admin session example
//!
//! Usage:
//!   ADMIN_ACCESS_TOKEN=... cargo run --example admin_session
//!
//! The base URL is resolved from `ADMIN_API_BASE_URL` or `BACKEND_SUBDOMAIN`,
//! falling back to the local development backend.

use aomail_admin_client::{
    format_cost, format_integer, ApiClient, AuthClientConfig, AuthClientHttp, ChannelNavigator,
    ClientConfig, FileTokenStore, MemoryTokenStore, NotificationState, TokenStore,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env()?;
    println!("=== Aomail Admin Client Example ===");
    println!("Base URL: {}", config.base_url);
    println!();

    let store: Arc<dyn TokenStore> = match FileTokenStore::default_location() {
        Some(store) => {
            println!("Token storage: {}", store.path().display());
            Arc::new(store)
        }
        None => Arc::new(MemoryTokenStore::new()),
    };

    if let Ok(token) = std::env::var("ADMIN_ACCESS_TOKEN") {
        store.set(&token)?;
    }

    let (navigator, mut redirects) = ChannelNavigator::new();
    let client = AuthClientHttp::new(
        config.clone(),
        AuthClientConfig::new(true, None),
        store,
        Arc::new(navigator),
    )?;

    let notifications = NotificationState::new();

    if !client.is_admin_authenticated().await {
        let hide = notifications.show_error("Not signed in", "Log in as an administrator first");
        println!(
            "! {}: {}",
            notifications.notification_title.get(),
            notifications.notification_message.get()
        );
        if let Ok(redirect) = redirects.try_recv() {
            println!("  (redirect {} -> {})", redirect.status, redirect.location);
        }
        hide.await?;
        return Ok(());
    }

    let api = ApiClient::new(client, config);
    let result = api.get_data("dashboard/stats/", &[]).await?;

    if result.success {
        let data = result.data.unwrap_or_default();
        println!("Emails processed: {}", format_integer(data["emails"].as_f64()));
        println!("LLM cost:         {}", format_cost(data["cost"].as_f64()));
        notifications.show_success("Loaded", "Dashboard statistics refreshed");
    } else {
        notifications.show_error("Error", result.error.as_deref().unwrap_or_default());
    }

    println!(
        "[{}] {}: {}",
        notifications.notification_type.get(),
        notifications.notification_title.get(),
        notifications.notification_message.get()
    );

    Ok(())
}
