use line_errors::{classify, AnalyzerResult, ErrorInput};
use serde_json::json;

fn main() -> AnalyzerResult<()> {
    println!("LINE Errors - Basic Usage Examples");

    classify_mappings()?;
    rejected_inputs();

    Ok(())
}

fn classify_mappings() -> AnalyzerResult<()> {
    println!("\n=== Structured Mappings ===");

    let inputs = [
        json!({"status_code": 401, "message": "Authentication failed"}),
        json!({"status_code": 429, "headers": {"Retry-After": "60"}}),
        json!({"status_code": 400, "body": "{\"message\":\"The request body has 2 error(s)\",\"details\":[{\"code\":\"40011\"}]}"}),
        json!({"status_code": 0, "message": "connection reset by peer"}),
    ];

    for value in inputs {
        let result = classify(&ErrorInput::try_from(value)?, None);
        println!("{result}");
        println!(
            "  severity={} retryable={} retry_after={:?}",
            result.severity, result.is_retryable, result.retry_after
        );
        println!("  -> {}", result.recommended_action);
    }
    Ok(())
}

fn rejected_inputs() {
    println!("\n=== Unsupported Inputs ===");

    for value in [json!(404), json!(null)] {
        match ErrorInput::try_from(value) {
            Ok(input) => println!("Accepted: {}", input.kind()),
            Err(e) => println!("Rejected: {e}"),
        }
    }
}
