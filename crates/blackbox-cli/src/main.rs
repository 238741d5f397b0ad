#![forbid(unsafe_code)]

fn main() {
    std::process::exit(blackbox_cli::run());
}
