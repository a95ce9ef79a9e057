//! Binary entrypoint for `sdkctl`.

#[tokio::main]
async fn main() {
    std::process::exit(sdkctl_cli::run().await);
}
