//! Classification and decoding of the scooter's notification frames.
//!
//! Every notification payload starts with a fixed header. The byte at offset
//! 2 names the unit the frame came from and the byte at offset 4 names the
//! data record carried in the body from offset 6 onwards. The one exception
//! is the second frame of the trip info response, which has no header at all
//! and is recognised by its source byte matching no known unit.

mod battery_message;
mod distance_message;
mod trip_message;

pub(crate) use battery_message::REQUEST as BATTERY_INFO_REQUEST;
pub(crate) use distance_message::REQUEST as DISTANCE_LEFT_REQUEST;
pub(crate) use trip_message::REQUEST as TRIP_INFO_REQUEST;

use crate::telemetry::TelemetryRecord;

/// Source byte of frames sent by the master (us). Never decoded, listed for
/// completeness.
#[allow(dead_code)]
pub(crate) const MASTER_TO_SCOOTER: u8 = 0x20;
/// Source byte of frames sent by the scooter's drive controller
pub(crate) const SCOOTER_TO_MASTER: u8 = 0x23;
/// Source byte of frames sent by the battery management unit
pub(crate) const BATTERY_TO_MASTER: u8 = 0x25;

/// Data address of the remaining-range record
pub(crate) const DISTANCE_INFO: u8 = 0x25;
/// Data address of the trip info record
pub(crate) const TRIP_INFO: u8 = 0xb0;
/// Data address of the battery info record
pub(crate) const BATTERY_INFO: u8 = 0x31;

const SOURCE_OFFSET: usize = 2;
const ADDRESS_OFFSET: usize = 4;
pub(crate) const BODY_OFFSET: usize = 6;

/// The result of attempting to decode one notification payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// The payload carried a recognised telemetry record
    Record(TelemetryRecord),
    /// The header matched a known record but the body is too short for its
    /// field layout
    Malformed(&'static str),
    /// Nothing to report: the payload is too short to classify or carries a
    /// record we don't know
    Skip,
}

/// Decode one notification payload (transport prefix already stripped).
///
/// Pure and stateless: the same bytes always produce the same outcome, and
/// no field read ever goes past the end of the payload.
pub fn decode_frame(payload: &[u8]) -> DecodeOutcome {
    if payload.len() <= 8 {
        return DecodeOutcome::Skip;
    }

    let source = payload[SOURCE_OFFSET];
    let address = payload[ADDRESS_OFFSET];

    match source {
        SCOOTER_TO_MASTER => match address {
            DISTANCE_INFO => distance_message::decode(payload),
            TRIP_INFO => trip_message::decode(payload),
            _ => DecodeOutcome::Skip,
        },
        BATTERY_TO_MASTER => match address {
            BATTERY_INFO => battery_message::decode(payload),
            _ => DecodeOutcome::Skip,
        },
        // No known source unit: the second frame of the trip info response,
        // which carries the odometer and is laid out from offset 0.
        _ => trip_message::decode_odometer(payload),
    }
}

pub(crate) fn u16_at(payload: &[u8], offset: usize) -> Option<u16> {
    payload
        .get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn i16_at(payload: &[u8], offset: usize) -> Option<i16> {
    payload
        .get(offset..offset + 2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn u32_at(payload: &[u8], offset: usize) -> Option<u32> {
    payload
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn u8_at(payload: &[u8], offset: usize) -> Option<u8> {
    payload.get(offset).copied()
}

#[test]
fn test_decode_short_payloads_yield_nothing() {
    let payload = hex::decode("55aa032301250264").unwrap();
    for len in 0..=payload.len() {
        assert_eq!(decode_frame(&payload[..len]), DecodeOutcome::Skip);
    }
}

#[test]
fn test_decode_distance_left() {
    // source 0x23 at offset 2, address 0x25 at offset 4, u16 100 at offset 6
    let payload = hex::decode("55aa230025026400ff").unwrap();
    let outcome = decode_frame(&payload);
    assert_eq!(
        outcome,
        DecodeOutcome::Record(TelemetryRecord::DistanceLeft {
            distance_left_km: 1.0
        })
    );
}

#[test]
fn test_decode_trip_info() {
    // 7 words from offset 6; the 6th and 7th are speed 2000 and average 1000
    let payload = hex::decode("55aa2300b01600000000000000005400d007e803").unwrap();
    let outcome = decode_frame(&payload);
    assert_eq!(
        outcome,
        DecodeOutcome::Record(TelemetryRecord::TripInfo {
            speed_kmh: 20.0,
            average_speed_kmh: 10.0
        })
    );
}

#[test]
fn test_decode_battery_info() {
    // capacity 2000, percent 87, current -150, voltage 4050, temps 40 and 41
    let payload = hex::decode("55aa25003102d00757006affd20f2829").unwrap();
    let outcome = decode_frame(&payload);
    assert_eq!(
        outcome,
        DecodeOutcome::Record(TelemetryRecord::BatteryInfo {
            capacity_mah: 2000,
            percent: 87,
            current_a: -1.5,
            voltage_v: 40.5,
            temp1_c: 20,
            temp2_c: 21,
        })
    );
}

#[test]
fn test_decode_odometer_continuation() {
    // source byte at offset 2 matches no unit; u32 5000000 at offset 0,
    // 4 reserved bytes, i16 200 at offset 8
    let payload = hex::decode("404b4c0000000000c800").unwrap();
    assert_ne!(payload[2], SCOOTER_TO_MASTER);
    assert_ne!(payload[2], BATTERY_TO_MASTER);
    let outcome = decode_frame(&payload);
    assert_eq!(
        outcome,
        DecodeOutcome::Record(TelemetryRecord::OdometerContinuation {
            total_distance_km: 5000.0,
            frame_temp_c: 20.0
        })
    );
}

#[test]
fn test_decode_unknown_address_yields_nothing() {
    let from_scooter = hex::decode("55aa2300990264000000").unwrap();
    assert_eq!(decode_frame(&from_scooter), DecodeOutcome::Skip);
    let from_battery = hex::decode("55aa2500990264000000").unwrap();
    assert_eq!(decode_frame(&from_battery), DecodeOutcome::Skip);
}

#[test]
fn test_decode_is_pure() {
    let payload = hex::decode("55aa230025026400ff").unwrap();
    assert_eq!(decode_frame(&payload), decode_frame(&payload));
}

#[test]
fn test_decode_truncated_trip_info_is_malformed() {
    // recognised header but only 3 of the 14 body bytes present
    let payload = hex::decode("55aa2300b016d007e8").unwrap();
    assert_eq!(payload.len(), 9);
    assert!(matches!(decode_frame(&payload), DecodeOutcome::Malformed(_)));
}

#[test]
fn test_decode_truncated_battery_info_is_malformed() {
    let payload = hex::decode("55aa25003102d00757").unwrap();
    assert_eq!(payload.len(), 9);
    assert!(matches!(decode_frame(&payload), DecodeOutcome::Malformed(_)));
}

#[test]
fn test_decode_truncated_odometer_is_malformed() {
    // 9 bytes cannot hold the i16 at offset 8
    let payload = hex::decode("404b4c0000000000c8").unwrap();
    assert!(matches!(decode_frame(&payload), DecodeOutcome::Malformed(_)));
}
