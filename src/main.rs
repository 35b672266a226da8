#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kummerkasten_lib::run().await
}
