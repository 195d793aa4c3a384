use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{ConnectOptions, MySqlPool};
use std::str::FromStr;
use std::time::Duration;

/// Create a connection pool with slow-query logging
pub async fn create_pool(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    let mut connect_options = MySqlConnectOptions::from_str(database_url)?;

    // Log statements slower than 5 seconds
    connect_options = connect_options.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_secs(5),
    );

    MySqlPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
}
