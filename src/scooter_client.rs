use anyhow::anyhow;
use bluest::Adapter;
use bluest::AdvertisingDevice;
use bluest::Characteristic;
use bluest::Device;
use bluest::Uuid;
use futures_util::Stream;
use futures_util::StreamExt;
use tokio::time::sleep;
use tokio::time::timeout;
use tokio::time::Duration;

use crate::message;
use crate::message::DecodeOutcome;
use crate::telemetry::TelemetryRecord;

/// A client for reading live telemetry from an M365 scooter.
///
/// The scooter speaks its proprietary protocol over the Nordic UART service:
/// queries are written to the UART write characteristic and the answers
/// arrive as notifications on the UART notify characteristic.
pub struct ScooterClient {
    adapter: Adapter,
    device: Device,
    write: Characteristic,
    notify: Characteristic,
}

impl ScooterClient {
    const BLE_DEVICE_NAME: &'static str = "MIScooter";
    const NORDIC_UART_SERVICE_ID: &'static str = "6e400001-b5a3-f393-e0a9-e50e24dcca9e";
    const NORDIC_UART_WRITE_CHARACTERISTIC_ID: &'static str =
        "6e400002-b5a3-f393-e0a9-e50e24dcca9e";
    const NORDIC_UART_NOTIFY_CHARACTERISTIC_ID: &'static str =
        "6e400003-b5a3-f393-e0a9-e50e24dcca9e";
    // Each notification carries a transport header before the protocol payload
    const TRANSPORT_PREFIX_LEN: usize = 3;
    // How long to wait between query writes so the scooter can answer each
    // before the next arrives
    const WRITE_PACING_MS: u64 = 100;
    // How long to wait without any notifications before considering the
    // response frames completely received
    const NOTIFICATION_TIMEOUT_S: u64 = 5;

    /// Disconnect from the scooter
    pub async fn stop(self) -> anyhow::Result<()> {
        self.adapter.disconnect_device(&self.device).await?;
        Ok(())
    }

    pub async fn new_default_name() -> anyhow::Result<Self> {
        Self::new(Self::BLE_DEVICE_NAME).await
    }

    /// Create a new `ScooterClient`, which includes attempting to discover the device.
    pub async fn new(ble_device_name: &str) -> anyhow::Result<Self> {
        let adapter = bluest::Adapter::default()
            .await
            .ok_or(anyhow!("Default adapter not found"))?;
        adapter.wait_available().await?;

        let device = timeout(
            Duration::from_secs(30),
            Self::discover_device(ble_device_name, &adapter),
        )
        .await
        .map_err(|_| anyhow!("Device not found"))??;

        Self::connect_device(&adapter, &device.device).await?;

        let nordic_uart_service = device
            .device
            .discover_services_with_uuid(Self::nordic_uart_service_id())
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the Nordic UART service."))?
            .clone();
        let write = nordic_uart_service
            .discover_characteristics_with_uuid(Self::nordic_uart_write_characteristic_id())
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the Nordic UART write characterstic."))?
            .clone();
        let notify = nordic_uart_service
            .discover_characteristics_with_uuid(Self::nordic_uart_notify_characteristic_id())
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the Nordic UART notify characterstic."))?
            .clone();

        Ok(Self {
            adapter: adapter.clone(),
            device: device.device,
            write,
            notify,
        })
    }

    /// Send the three telemetry queries and collect every record the scooter
    /// answers with.
    ///
    /// The scooter streams its answers back as notifications, one or two
    /// frames per query. Reading stops once the notifications go quiet for a
    /// short time.
    pub async fn fetch_telemetry(&mut self) -> anyhow::Result<Vec<TelemetryRecord>> {
        self.try_connect().await?;

        // Subscribing here is what writes [0x01, 0x00] to the notify
        // characteristic's client configuration descriptor.
        let reader = self.notify.notify().await?;

        let requests: [&[u8]; 3] = [
            &message::TRIP_INFO_REQUEST,
            &message::DISTANCE_LEFT_REQUEST,
            &message::BATTERY_INFO_REQUEST,
        ];
        for rq in requests {
            let h = hex::encode(rq);
            println!("SCOOTER: TX: {h}");

            self.write.write(rq).await?;
            sleep(Duration::from_millis(Self::WRITE_PACING_MS)).await;
        }

        Self::read_telemetry(reader).await
    }

    async fn discover_device(name: &str, adapter: &Adapter) -> anyhow::Result<AdvertisingDevice> {
        let required_services = [Self::nordic_uart_service_id()];
        let mut adapter_events = adapter.scan(&required_services).await?;
        while let Some(device) = timeout(Duration::from_secs(30), adapter_events.next())
            .await
            .map_err(|_| anyhow!("Device not found"))?
        {
            let device_name = device.device.name_async().await?;
            if device_name == name {
                return Ok(device);
            }
        }

        Err(anyhow!("Device not found"))
    }

    /// Read notifications until they stop arriving, decoding each into at
    /// most one telemetry record.
    ///
    /// There is no end-of-response marker in the protocol. The trip info
    /// query alone answers with two frames, and the scooter interleaves the
    /// answers to the three queries however it likes, so the only reliable
    /// way to know the responses are done is a timeout: once no notification
    /// has arrived for a short time, whatever was decoded is the result.
    async fn read_telemetry<T: Stream<Item = Result<Vec<u8>, bluest::Error>> + Send + Unpin>(
        mut reader: T,
    ) -> anyhow::Result<Vec<TelemetryRecord>> {
        let mut records = Vec::new();
        loop {
            let read_result = tokio::time::timeout(
                Duration::from_secs(Self::NOTIFICATION_TIMEOUT_S),
                reader.next(),
            )
            .await;

            match read_result {
                Err(_) => {
                    // timeout, the responses are as complete as they will get
                    return Ok(records);
                }
                Ok(None) => {
                    // End of stream

                    println!("SCOOTER: End of notification stream");

                    return Err(anyhow!("end of notification stream"));
                }
                Ok(Some(Ok(data))) => {
                    let h_notification = hex::encode(&data);
                    println!("SCOOTER: RX notification: 0x{h_notification}");

                    if let Some(record) = Self::on_notification(&data) {
                        records.push(record);
                    }
                }
                Ok(Some(Err(err))) => {
                    println!("SCOOTER: Notification error: {err}");

                    return Err(err.into());
                }
            }
        }
    }

    /// Handle one raw notification: strip the transport prefix and decode
    /// the remaining protocol payload.
    ///
    /// Frames that are unrecognised or too short to classify are a normal
    /// part of the stream and yield nothing. Frames whose header names a
    /// known record but whose body is truncated are logged and dropped.
    fn on_notification(data: &[u8]) -> Option<TelemetryRecord> {
        if data.len() < Self::TRANSPORT_PREFIX_LEN {
            return None;
        }
        let payload = &data[Self::TRANSPORT_PREFIX_LEN..];

        match message::decode_frame(payload) {
            DecodeOutcome::Record(record) => Some(record),
            DecodeOutcome::Malformed(reason) => {
                let h_payload = hex::encode(payload);
                println!("SCOOTER: Malformed frame ({reason}): 0x{h_payload}");

                None
            }
            DecodeOutcome::Skip => None,
        }
    }

    fn nordic_uart_service_id() -> Uuid {
        Uuid::parse_str(Self::NORDIC_UART_SERVICE_ID).unwrap()
    }

    fn nordic_uart_write_characteristic_id() -> Uuid {
        Uuid::parse_str(Self::NORDIC_UART_WRITE_CHARACTERISTIC_ID).unwrap()
    }

    fn nordic_uart_notify_characteristic_id() -> Uuid {
        Uuid::parse_str(Self::NORDIC_UART_NOTIFY_CHARACTERISTIC_ID).unwrap()
    }

    /// Connect, tolerating the adapter quirk where the connect call reports
    /// an error even though the link did come up. The connection state is
    /// trusted over the returned error.
    async fn connect_device(adapter: &Adapter, device: &Device) -> anyhow::Result<()> {
        match adapter.connect_device(device).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if device.is_connected().await {
                    Ok(())
                } else {
                    Err(err.into())
                }
            }
        }
    }

    async fn try_connect(&self) -> anyhow::Result<()> {
        if !self.device.is_connected().await {
            let mut retries = 2;
            loop {
                match Self::connect_device(&self.adapter, &self.device).await {
                    Ok(()) => return Ok(()),
                    Err(err) if retries > 0 => {
                        println!("SCOOTER: Failed to connect: {err}");
                        retries -= 1;
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Ok(())
    }
}

#[test]
fn test_on_notification_strips_transport_prefix() {
    // 3 transport bytes, then a distance left frame
    let data = hex::decode("0b120055aa230025026400ff").unwrap();
    let record = ScooterClient::on_notification(&data);
    assert_eq!(
        record,
        Some(TelemetryRecord::DistanceLeft {
            distance_left_km: 1.0
        })
    );
}

#[test]
fn test_on_notification_sub_prefix_data() {
    assert_eq!(ScooterClient::on_notification(&[0x0b, 0x12]), None);
    assert_eq!(ScooterClient::on_notification(&[]), None);
}

#[test]
fn test_on_notification_malformed_frame_yields_nothing() {
    // trip info header with a truncated body
    let data = hex::decode("0b120055aa2300b016d007e8").unwrap();
    assert_eq!(ScooterClient::on_notification(&data), None);
}

#[test]
fn test_on_notification_unrecognised_address_yields_nothing() {
    let data = hex::decode("0b120055aa2300990264000000").unwrap();
    assert_eq!(ScooterClient::on_notification(&data), None);
}
