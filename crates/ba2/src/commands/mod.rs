pub mod extract;
pub mod list;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Extract a BA2 file into a directory
    Extract(extract::ExtractArgs),
    /// List the entries of a BA2 file
    List(list::ListArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Extract(extract) => extract.handle(),
            Commands::List(list) => list.handle(),
        }
    }
}
