use line_errors::{AnalyzerResult, ErrorAnalyzer, ErrorInput, InMemoryStats};
use serde_json::json;
use std::sync::Arc;

fn main() -> AnalyzerResult<()> {
    println!("LINE Errors - Retry Guidance");

    let stats = Arc::new(InMemoryStats::new());
    let analyzer = ErrorAnalyzer::new().with_stats(stats.clone());
    let policy = analyzer.retry_policy();

    let inputs = [
        json!({"status_code": 429, "headers": {"Retry-After": "20"}}),
        json!({"status_code": 429}),
        json!({"status_code": 502, "message": "Bad Gateway"}),
        json!({"status_code": 404, "error_code": "50001"}),
        json!({"message": "network unreachable"}),
    ];

    for value in inputs {
        let result = analyzer.classify(&ErrorInput::try_from(value)?, None);
        println!("\n{result}");
        for attempt in 1..=policy.max_attempts + 1 {
            match policy.suggested_delay(&result, attempt) {
                Some(delay) => println!("  attempt {attempt}: wait {delay:?}"),
                None => {
                    println!("  attempt {attempt}: give up");
                    break;
                }
            }
        }
    }

    println!("\n=== Stats ===");
    for (category, counters) in stats.snapshot() {
        println!(
            "{category}: {} seen, {} retryable, last at {}",
            counters.count, counters.retryable, counters.last_seen
        );
    }

    Ok(())
}
