use crate::demo::{run_demo, run_notify_report, run_notify_run, DemoArgs, NotifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use renewdesk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Renewdesk",
    about = "Run the vehicle tax renewal reminder service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run notification passes and reports without the HTTP server
    Notify {
        #[command(subcommand)]
        command: NotifyCommand,
    },
    /// Run a seeded end-to-end demo of the reminder workflow
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum NotifyCommand {
    /// Execute one notification pass over imported sheets
    Run(NotifyArgs),
    /// Print the due-list overview without sending anything
    Report(NotifyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Customer sheet (CSV) to preload into the in-memory store
    #[arg(long)]
    pub(crate) customers: Option<PathBuf>,
    /// Installment policy sheet (CSV) to preload into the in-memory store
    #[arg(long)]
    pub(crate) policies: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Notify {
            command: NotifyCommand::Run(args),
        } => run_notify_run(args),
        Command::Notify {
            command: NotifyCommand::Report(args),
        } => run_notify_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
