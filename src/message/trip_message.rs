use super::{i16_at, u16_at, u32_at, DecodeOutcome, BODY_OFFSET};
use crate::telemetry::TelemetryRecord;

/// A verbatim message to send which requests the trip info bundle. The
/// scooter answers with two frames: the trip info record and a headerless
/// continuation frame carrying the odometer.
pub(crate) const REQUEST: [u8; 9] = [0x55, 0xaa, 0x03, 0x20, 0x01, 0xb0, 0x20, 0x0b, 0xff];

/// The body is 7 u16 words: error, warning, flags, workmode, battery, speed,
/// average speed. Only the two speeds are surfaced.
const WORD_COUNT: usize = 7;
const SPEED_WORD: usize = 5;
const AVERAGE_SPEED_WORD: usize = 6;

/// Decode a trip info frame in hundredths of a km/h.
pub(crate) fn decode(payload: &[u8]) -> DecodeOutcome {
    let mut words = [0u16; WORD_COUNT];
    for (i, word) in words.iter_mut().enumerate() {
        match u16_at(payload, BODY_OFFSET + i * 2) {
            Some(value) => *word = value,
            None => return DecodeOutcome::Malformed("trip info frame truncated"),
        }
    }

    DecodeOutcome::Record(TelemetryRecord::TripInfo {
        speed_kmh: words[SPEED_WORD] as f32 / 100.0,
        average_speed_kmh: words[AVERAGE_SPEED_WORD] as f32 / 100.0,
    })
}

/// Decode the second frame of the trip info response. It carries no header:
/// a u32 odometer in metres at offset 0, 4 reserved bytes, then an i16 frame
/// temperature in tenths of a degree at offset 8.
pub(crate) fn decode_odometer(payload: &[u8]) -> DecodeOutcome {
    let Some(total_m) = u32_at(payload, 0) else {
        return DecodeOutcome::Malformed("odometer frame truncated");
    };
    let Some(temperature) = i16_at(payload, 8) else {
        return DecodeOutcome::Malformed("odometer frame truncated");
    };

    DecodeOutcome::Record(TelemetryRecord::OdometerContinuation {
        total_distance_km: total_m as f32 / 1000.0,
        frame_temp_c: temperature as f32 / 10.0,
    })
}
