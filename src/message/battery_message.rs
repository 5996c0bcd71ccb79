use super::{i16_at, u16_at, u8_at, DecodeOutcome, BODY_OFFSET};
use crate::telemetry::TelemetryRecord;

/// A verbatim message to send which requests the battery info record
pub(crate) const REQUEST: [u8; 9] = [0x55, 0xaa, 0x03, 0x22, 0x01, 0x31, 0x0a, 0x9e, 0xff];

/// Reported temperatures carry a fixed +20 offset on the wire
const TEMPERATURE_OFFSET: i16 = 20;

/// Decode a battery info frame: capacity in mAh, charge in %, current and
/// voltage in hundredths, two offset temperatures.
pub(crate) fn decode(payload: &[u8]) -> DecodeOutcome {
    let fields = (
        u16_at(payload, BODY_OFFSET),
        u16_at(payload, BODY_OFFSET + 2),
        i16_at(payload, BODY_OFFSET + 4),
        u16_at(payload, BODY_OFFSET + 6),
        u8_at(payload, BODY_OFFSET + 8),
        u8_at(payload, BODY_OFFSET + 9),
    );

    let (Some(capacity), Some(percent), Some(current), Some(voltage), Some(temp1), Some(temp2)) =
        fields
    else {
        return DecodeOutcome::Malformed("battery info frame truncated");
    };

    DecodeOutcome::Record(TelemetryRecord::BatteryInfo {
        capacity_mah: capacity,
        percent,
        current_a: current as f32 / 100.0,
        voltage_v: voltage as f32 / 100.0,
        temp1_c: temp1 as i16 - TEMPERATURE_OFFSET,
        temp2_c: temp2 as i16 - TEMPERATURE_OFFSET,
    })
}
