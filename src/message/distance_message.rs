use super::{u16_at, DecodeOutcome, BODY_OFFSET};
use crate::telemetry::TelemetryRecord;

/// A verbatim message to send which requests the remaining range estimate
pub(crate) const REQUEST: [u8; 9] = [0x55, 0xaa, 0x03, 0x20, 0x01, 0x25, 0x02, 0xb4, 0xff];

/// Decode a distance-left frame: one u16, hundredths of a km.
pub(crate) fn decode(payload: &[u8]) -> DecodeOutcome {
    let Some(distance) = u16_at(payload, BODY_OFFSET) else {
        return DecodeOutcome::Malformed("distance left frame truncated");
    };

    DecodeOutcome::Record(TelemetryRecord::DistanceLeft {
        distance_left_km: distance as f32 / 100.0,
    })
}
