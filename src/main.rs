use clap::Parser;
use reportcheck::{Cli, DriverError, Output};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = cli.run().await {
        let exit_code = err.downcast_ref::<DriverError>().map_or(1, DriverError::exit_code);
        Output::default().critical(&format!("{err:#}"));
        std::process::exit(exit_code);
    }
}
