mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    edit, graph, init, play, show, suggestions, vote, EditArgs, GraphArgs, InitArgs, PlayArgs,
    ShowArgs, SuggestionsArgs, VoteArgs,
};
use tracing::Level;

/// Polydraft CLI - Edit many drafts of one text at once
#[derive(Parser, Debug)]
#[command(name = "polydraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log engine activity to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new session from an initial text
    Init(InitArgs),

    /// List the drafts of a session
    Show(ShowArgs),

    /// Edit one draft and propagate the change to the others
    Edit(EditArgs),

    /// Vote a suggestion up or down
    Vote(VoteArgs),

    /// Print the draft lineage graph
    Graph(GraphArgs),

    /// List recorded suggestions
    Suggestions(SuggestionsArgs),

    /// Run an edit script against a session
    Play(PlayArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()
        .map(|path| path.to_string_lossy().to_string())
        .unwrap_or_else(|_| ".".to_string());

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Show(args) => show(args, &cwd),
        Command::Edit(args) => edit(args, &cwd),
        Command::Vote(args) => vote(args, &cwd),
        Command::Graph(args) => graph(args, &cwd),
        Command::Suggestions(args) => suggestions(args, &cwd),
        Command::Play(args) => play(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}
