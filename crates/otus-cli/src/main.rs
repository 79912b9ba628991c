// Otus CLI entry point

use clap::Parser;

use otus_cli::{output, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = otus_cli::run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
