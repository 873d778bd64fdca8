fn main() {
    if let Err(e) = sipetualang_lib::run() {
        eprintln!("sipetualang: {e}");
        std::process::exit(1);
    }
}
