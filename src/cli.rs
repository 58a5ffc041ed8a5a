use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "travel-admin")]
#[command(about = "Terminal dashboard for managing travel offerings and drivers")]
#[command(version)]
pub struct Cli {
    /// Defaults to the interactive TUI
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Open the interactive dashboard
    Tui,
    /// Print the travel table and exit
    Travels,
    /// Print the driver table and exit
    Drivers,
}

impl Cli {
    /// Whether this invocation runs the interactive TUI
    pub fn is_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }
}
