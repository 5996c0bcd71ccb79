//! Read live telemetry from Xiaomi M365 electric scooters over Bluetooth Low Energy
//!
//! The scooter has a BLE interface. On top of that the NordicUART protocol is used for
//! serial communication. On top of that sits a proprietary query-response protocol which
//! has been partially reverse engineered by the community.
//!
//! Three fixed queries are written to the scooter and the answer frames are decoded as
//! they arrive. Currently the following data can be read:
//!
//! - Distance left (km)
//! - Current and average speed (km/h)
//! - Battery capacity (mAh), charge (%), current (A), voltage (V) and temperatures (C)
//! - Total distance / odometer (km)
//! - Frame temperature (C)
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::time::Duration;
//! #
//! # #[tokio::main]
//! # pub async fn main(){
//!     let mut scooter_client = scootread::ScooterClient::new_default_name().await.unwrap();
//!     loop {
//!         for record in scooter_client.fetch_telemetry().await.unwrap() {
//!             println!("{record}");
//!         }
//!         tokio::time::sleep(Duration::from_secs(5)).await;
//!     }
//! # }
//! ```

mod message;
mod scooter_client;
mod telemetry;

pub use message::{decode_frame, DecodeOutcome};
pub use scooter_client::ScooterClient;
pub use telemetry::TelemetryRecord;
