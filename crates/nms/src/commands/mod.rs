pub mod game;
pub mod pak;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Inspect and extract single .pak archives
    Pak {
        #[command(subcommand)]
        command: pak::PakCommands,
    },
    /// Work across a whole game installation
    Game {
        #[command(subcommand)]
        command: game::GameCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Pak { command } => command.handle(),
            Commands::Game { command } => command.handle(),
        }
    }
}
