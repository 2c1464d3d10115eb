pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "maildesk",
    about = "Maildesk operator CLI",
    long_about = "Operate maildesk migrations, knowledge base seeding, config inspection, and one-off email processing.",
    after_help = "Examples:\n  maildesk migrate\n  maildesk seed\n  maildesk process --from jane@example.com --subject \"Order status\" --body \"Where is order #12345?\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Embed and load the starter knowledge base articles, skipping ones already present")]
    Seed,
    #[command(about = "Run one email through the full support pipeline and print the drafted response")]
    Process {
        #[arg(long, help = "Sender email address")]
        from: String,
        #[arg(long, help = "Email subject line")]
        subject: String,
        #[arg(long, help = "Email body text")]
        body: String,
        #[arg(long, help = "Sender display name")]
        sender_name: Option<String>,
        #[arg(long, help = "Upstream message identifier for the audit log")]
        email_id: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Process { from, subject, body, sender_name, email_id } => commands::process::run(
            &from,
            &subject,
            &body,
            sender_name.as_deref(),
            email_id.as_deref(),
        ),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
