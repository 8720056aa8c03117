use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    fleet_management::run().await
}
