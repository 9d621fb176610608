#[tokio::main]
async fn main() {
    if let Err(e) = disability_calc::api::run_cli().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
