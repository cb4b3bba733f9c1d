mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{:#}", e); // pretty anyhow chain
        std::process::exit(1);
    }
}
