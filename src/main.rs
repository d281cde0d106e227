#[tokio::main]
async fn main() -> anyhow::Result<()> {
    findiag::run().await
}
