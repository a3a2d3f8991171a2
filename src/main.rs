//! gcmon CLI entry point.

use gcmon_lib::cli::{self, Cli};
use gcmon_lib::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    cli::execute(cli).await
}
