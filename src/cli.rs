use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "owtf-installer", version, about)]
pub struct Args {
    /// Install path to run; omit to only emit the package description
    #[arg(value_enum)]
    pub mode: Option<Mode>,

    /// Project root holding requirements/, scripts/ and package.toml
    /// (defaults to the current directory)
    #[arg(long)]
    pub root: Option<std::path::PathBuf>,

    /// Write the package description JSON to a file instead of stdout
    #[arg(long)]
    pub description_out: Option<std::path::PathBuf>,

    /// Enable verbose (debug) logging output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Source-link the package into the environment
    Develop,
    /// Standard package-file installation
    Install,
}
