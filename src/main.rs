fn main() {
    #[cfg(feature = "cli")]
    wavhuff::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("wavhuff: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
