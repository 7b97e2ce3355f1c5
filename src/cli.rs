use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "rxstatic", version)]
#[command(about = "Regex-routed static file server with templated directory indexes", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Print a commented sample configuration and exit
    #[arg(long)]
    pub genconfig: bool,

    /// Validate the configuration, print it with the route order, and exit
    #[arg(long)]
    pub check: bool,
}
