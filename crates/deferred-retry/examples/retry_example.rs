//! Example: retrying flaky async operations
//!
//! This example demonstrates:
//! 1. `retry` recovering from transient failures
//! 2. `retry_while` giving up early on a fatal failure
//! 3. The spread of jittered backoff delays
//!
//! Run with:
//! ```bash
//! cargo run -p deferred-retry --example retry_example
//! ```

use deferred_retry::prelude::*;
use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// A simulated service that fails the first few times
struct UnreliableService {
    attempts: AtomicU32,
    fail_count: u32,
}

impl UnreliableService {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_count,
        }
    }

    async fn call(&self) -> Result<String, std::io::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if attempt <= self.fail_count {
            println!("  Attempt {}: FAILED (simulating transient error)", attempt);
            Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("timed out on attempt {}", attempt),
            ))
        } else {
            println!("  Attempt {}: SUCCESS", attempt);
            Ok("service response".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Example 1: retry until success
async fn example_simple_retry() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Retry with Jittered Backoff ===\n");

    let service = UnreliableService::new(2);
    let start = Instant::now();

    let result = retry(|| service.call(), 3).await?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", service.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected waits: 0-40ms after attempt 1, 20-60ms after attempt 2");

    Ok(())
}

/// Example 2: stop retrying on errors that will not go away
async fn example_retry_while() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Predicate-Gated Retry ===\n");

    let result = retry_while(
        || async {
            println!("  Attempt: permission denied");
            Err::<(), _>(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "auth failed",
            ))
        },
        |err: &std::io::Error| err.kind() == std::io::ErrorKind::TimedOut,
        10,
    )
    .await;

    match result {
        Err(err) => println!("Gave up immediately: {}", err),
        Ok(()) => unreachable!("operation never succeeds"),
    }

    Ok(())
}

/// Example 3: delays drawn for the first few attempts
fn example_delay_spread() {
    println!("\n=== Example 3: Backoff Delays ===\n");

    let backoff = JitteredBackoff::default();
    for attempt in 1..=5 {
        let range = backoff.delay_range(attempt);
        let samples: Vec<Duration> = (0..5).map(|_| backoff.next_delay(attempt)).collect();
        println!(
            "  Attempt {}: range {:.0}..={:.0}ms, samples {:?}",
            attempt,
            range.start().max(0.0),
            range.end(),
            samples
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("==============================================");
    println!("   deferred-retry: Retry Examples");
    println!("==============================================");

    example_simple_retry().await?;
    example_retry_while().await?;
    example_delay_spread();

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
