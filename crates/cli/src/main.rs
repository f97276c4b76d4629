//! LLM Perfbench CLI entry point.

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    if let Err(e) = llm_perfbench_cli::run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
