//! mailtally-extract - Pull the total out of receipt emails.

fn main() -> std::process::ExitCode {
    mailtally::cmd::extract_cmd::main()
}
