use clap::Parser;
use worklog::cli::commands::Cli;
use worklog::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // No subcommand → launch TUI
        None => worklog::tui::run(cli.workspace_dir.as_deref()),
        Some(_) => handlers::dispatch(cli),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
