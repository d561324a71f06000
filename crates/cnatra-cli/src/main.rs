use clap::Parser;
use cnatra_cli::cli_args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = cnatra_cli::run(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
