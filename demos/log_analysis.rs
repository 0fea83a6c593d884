use line_errors::{classify_log, AnalyzerResult};

const LOGS: &[&str] = &[
    "(404)\nReason: Not Found\nHTTP response headers: HTTPHeaderDict({'server': 'legy', 'x-line-request-id': 'abc123'})\nHTTP response body: {\"message\":\"Not found\"}",
    "(400)\nReason: Bad Request\nHTTP response body: {\"message\":\"The request body has 1 error(s)\",\"details\":[{\"message\":\"May not be empty\",\"property\":\"messages[0].text\"}]}",
    "HTTP 503 Service Unavailable",
    "(429) Too Many Requests request_id=7f2a-99",
    "connection timed out after 30s",
    "",
];

fn main() -> AnalyzerResult<()> {
    println!("LINE Errors - Log Analysis");

    for (i, log) in LOGS.iter().enumerate() {
        let result = classify_log(log, None);

        println!("\n--- Log #{} ---", i + 1);
        println!("{result}");
        println!("  request_id: {:?}", result.request_id);
        println!("  headers:    {:?}", result.headers);
        for detail in &result.details {
            println!("  detail:     {detail}");
        }
    }

    println!("\n=== JSON ===");
    println!("{}", classify_log(LOGS[0], Some("user.user_profile")).to_json()?);

    Ok(())
}
