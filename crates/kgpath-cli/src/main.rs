use clap::Parser;
use kgpath_cli::{CliArgs, KgpathCli};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let result = match KgpathCli::from_args("kgpath", &args) {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
