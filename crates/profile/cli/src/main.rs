fn main() {
    if let Err(e) = profile_cli::run() {
        eprintln!("aa-serialize: {}", e);
        std::process::exit(1);
    }
}
