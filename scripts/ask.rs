//! Run with: cargo run --bin ask -- "How can I save water at home?"
//!
//! Sends each question through a fresh WaterWise chat straight to Gemini,
//! bypassing the HTTP server.

use std::time::Instant;

use waterwise::config::app::AppConfig;
use waterwise::modules::chat::model::start_chat;
use waterwise::services::gemini::GeminiClient;

const DEFAULT_QUESTIONS: [&str; 3] = [
    "How can I save water at home?",
    "Is drip irrigation worth it for a small garden?",
    "Can I reuse shower water for my plants?",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let client = GeminiClient::from_config(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let questions: Vec<String> = if args.is_empty() {
        DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect()
    } else {
        args
    };

    println!("\n💧 WaterWise chat smoke test\n");

    for question in &questions {
        println!("❓ {}", question);

        let session = start_chat();
        let start = Instant::now();
        let result = session.send_message(&client, question).await;
        let elapsed = start.elapsed().as_millis();

        match result {
            Ok(text) => {
                println!("⏱️  Response time: {}ms\n", elapsed);
                println!("📝 Response:\n{}\n", text);
            }
            Err(e) => println!("❌ Error after {}ms: {}\n", elapsed, e),
        }

        println!("{:-<60}", "");
    }

    Ok(())
}
