use clap::Parser;

use authz_console_cli::args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    authz_console_observability::init();

    let cli = Cli::parse();
    authz_console_cli::commands::run(cli).await
}
