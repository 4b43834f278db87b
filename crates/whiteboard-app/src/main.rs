//! Native entry point.

#[cfg(feature = "native")]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    let cli = whiteboard_app::cli::Cli::parse();
    whiteboard_app::cli::run(cli)
}

#[cfg(not(feature = "native"))]
fn main() {
    eprintln!("Native feature not enabled. Use `cargo run --features native`");
}
