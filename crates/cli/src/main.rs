use std::process::ExitCode;

fn main() -> ExitCode {
    maildesk_cli::run()
}
