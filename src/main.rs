#[tokio::main]
async fn main() -> anyhow::Result<()> {
    aso_keywords::app::run().await
}
