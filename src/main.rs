use std::time::Duration;

use scootread::ScooterClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut scooter_client = ScooterClient::new_default_name().await?;

    loop {
        for record in scooter_client.fetch_telemetry().await? {
            println!("{record}");
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}
