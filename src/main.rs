fn main() {
    if let Err(err) = bal_validator::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
