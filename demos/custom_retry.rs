//! Configures retry behavior and inspects how a request went.
//!
//! Run with: `cargo run --example custom_retry`

use std::time::Duration;
use webflow::rate_limit::RateLimitConfig;
use webflow::retry::{OrPredicate, RetryOnRateLimit, RetryOnTimeout};
use webflow::{Client, Collection, Error, ErrorKind, GetRequest, RetryPredicate, RetryStrategy};

/// Gives up after a fixed number of failed attempts, whatever the strategy allows.
struct MaxAttempts(usize);

impl RetryPredicate for MaxAttempts {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        attempt < self.0 && error.is_retryable()
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("webflow=info,custom_retry=info")
        .init();

    let token = std::env::var("WEBFLOW_API_TOKEN").unwrap_or_else(|_| "demo-token".to_string());
    let site_id = std::env::var("WEBFLOW_SITE_ID").unwrap_or_else(|_| "demo-site".to_string());

    println!("=== Example 1: Only rate limits and timeouts ===");
    let client = Client::builder(&token, &site_id)
        .retry_strategy(RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            max_retries: 4,
            jitter: true,
        })
        .retry_predicate(Box::new(OrPredicate::new(vec![
            Box::new(RetryOnRateLimit),
            Box::new(RetryOnTimeout),
        ])))
        .rate_limit_config(RateLimitConfig::default().with_max_wait(Duration::from_secs(20)))
        .timeout(Duration::from_secs(10))
        .build()?;
    report(&client).await;

    println!("=== Example 2: At most two attempts ===");
    let client = Client::builder(&token, &site_id)
        .retry_strategy(RetryStrategy::Linear {
            delay: Duration::from_millis(500),
            max_retries: 5,
        })
        .retry_predicate(Box::new(MaxAttempts(2)))
        .build()?;
    report(&client).await;

    Ok(())
}

async fn report(client: &Client) {
    let request = GetRequest::list_collections(client.site_id());
    match client.get::<Vec<Collection>>(request).await {
        Ok(response) => {
            println!("{} collections", response.data.len());
            println!("Attempts: {} (retried: {})", response.attempts, response.was_retried());
            println!("Latency: {:?}", response.latency);
        }
        Err(e) => match e.kind() {
            ErrorKind::Api => println!("API error {:?}: {}", e.status(), e),
            ErrorKind::Transport => println!("Transport failure: {}", e),
            ErrorKind::Decode => println!("Malformed response: {}", e),
            ErrorKind::Callback => println!("Handler failure: {}", e),
        },
    }
    println!();
}
