use internhub_cli::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {}", err.user_message());
        std::process::exit(1);
    }
}
