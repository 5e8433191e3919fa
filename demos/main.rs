use std::collections::HashMap;
use std::env;

use chatscope::analysis::analyze_chat;
use chatscope::models::ParseOptions;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let file_path = args.get(1).expect("usage: main <chat-export.txt>");

    let options = ParseOptions::default();
    let chat = chatscope::parse_file(file_path, &options).expect("failed to parse chat file");

    if chat.is_empty() {
        println!("No messages found in {file_path}");
        return;
    }

    println!("Chat: {}", chat.chat_name);
    println!("Participants: {}", chat.participants.join(", "));
    if let Some(span) = &chat.date_span {
        println!("From {} to {}", span.start, span.end);
    }

    let mut sender_counts = HashMap::new();
    for message in &chat.messages {
        if !message.is_system {
            *sender_counts.entry(message.sender.clone()).or_insert(0) += 1;
        }
    }
    let mut sorted: Vec<_> = sender_counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    println!("\nMessages by sender:");
    for (sender, count) in sorted {
        println!("  {sender}: {count}");
    }

    let analysis = analyze_chat(&chat, &options.lexicon);
    println!("\nInsights:");
    for insight in &analysis.insights {
        println!("  - {insight}");
    }
}
