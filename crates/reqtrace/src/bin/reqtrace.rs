fn main() {
    if let Err(err) = reqtrace::run() {
        eprintln!("{}", reqtrace::format_error(&err));
        std::process::exit(1);
    }
}
