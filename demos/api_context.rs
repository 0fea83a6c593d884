use line_errors::{classify_log, ApiContext};

fn main() {
    println!("LINE Errors - API Context");

    let cases = [
        ("(404) Not found", "user.user_profile"),
        ("(404) Not found", "webhook.webhook_settings"),
        ("(400) The reply token has already been used", "message.message_reply"),
        ("(400) invalid image size", "rich_menu.rich_menu_create"),
        ("(403) Forbidden", "message_narrowcast"),
        ("(413) Payload Too Large", "rich_menu.rich_menu_image"),
        ("(404) Not found", "billing.invoice"),
    ];

    for (log, tag) in cases {
        let plain = classify_log(log, None);
        let tagged = classify_log(log, Some(tag));

        println!("\n{log:?} @ {tag}");
        match tag.parse::<ApiContext>() {
            Ok(context) => println!("  context:  {context}"),
            Err(e) => println!("  context:  ignored ({e})"),
        }
        println!("  generic:  {}", plain.category);
        println!("  refined:  {} ({})", tagged.category, tagged.severity);
        println!("  action:   {}", tagged.recommended_action);
        for solution in &tagged.solutions {
            println!("  - {solution}");
        }
    }
}
