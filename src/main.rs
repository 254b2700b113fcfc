#[tokio::main]
async fn main() -> anyhow::Result<()> {
    echofind_lib::run().await
}
