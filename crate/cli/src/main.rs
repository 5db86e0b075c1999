use std::process;

use keyvault_cli::kvcli_main;

#[tokio::main]
async fn main() {
    if let Err(err) = kvcli_main().await {
        eprintln!("ERROR [{}]: {err}", err.category());
        process::exit(1);
    }
}
