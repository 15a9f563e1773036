use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    airdesk_cli::run()
}
