use clap::Parser;
use bedrock_kb_ops::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tokio::select! {
        result = cli::run(cli.command) => result,
        _ = tokio::signal::ctrl_c() => {
            // A pending stdin read holds a blocking thread that runtime
            // shutdown would wait on, so leave without dropping the runtime.
            tracing::warn!("Interrupted by user");
            eprintln!("{}", cli::INTERRUPTED_MESSAGE);
            std::process::exit(cli::INTERRUPTED_EXIT_CODE);
        }
    }
}
