fn main() {
    if let Err(err) = tag_audit::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
