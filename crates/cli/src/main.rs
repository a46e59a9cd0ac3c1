//! perfsuite CLI entry point.

fn main() {
    if let Err(e) = perfsuite_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
