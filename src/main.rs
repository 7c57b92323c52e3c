use specrun::cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Parse command line arguments
    let command = cli::parse_args();

    // Process the command
    match cli::process_command(command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
