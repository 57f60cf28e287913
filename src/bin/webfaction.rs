use std::process::ExitCode;

fn main() -> ExitCode {
    match webfaction::cli::run(std::env::args_os()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:?}", err);
            ExitCode::FAILURE
        }
    }
}
