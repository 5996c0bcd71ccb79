use std::fmt;

/// A single decoded telemetry reading from the scooter.
///
/// Each notification frame decodes to at most one of these. Values are plain
/// physical quantities; the raw wire scaling (x100, x1000, temperature
/// offsets) has already been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryRecord {
    /// Estimated remaining range in km
    DistanceLeft { distance_left_km: f32 },
    /// Current and average trip speed in km/h
    TripInfo {
        speed_kmh: f32,
        average_speed_kmh: f32,
    },
    /// State of the battery pack as reported by the BMU
    BatteryInfo {
        /// Remaining capacity in mAh
        capacity_mah: u16,
        /// State of charge in %
        percent: u16,
        /// Pack current in A. Negative while discharging
        current_a: f32,
        /// Pack voltage in V
        voltage_v: f32,
        temp1_c: i16,
        temp2_c: i16,
    },
    /// Second frame of the trip info response: lifetime odometer in km and
    /// the frame (chassis) temperature in C
    OdometerContinuation {
        total_distance_km: f32,
        frame_temp_c: f32,
    },
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DistanceLeft { distance_left_km } => {
                write!(f, "Distance left: {distance_left_km:.2} km")
            }
            Self::TripInfo {
                speed_kmh,
                average_speed_kmh,
            } => {
                writeln!(f, "Current speed: {speed_kmh:.2} km/h")?;
                write!(f, "Average speed: {average_speed_kmh:.2} km/h")
            }
            Self::BatteryInfo {
                capacity_mah,
                percent,
                current_a,
                voltage_v,
                temp1_c,
                temp2_c,
            } => {
                writeln!(f, "Battery capacity: {capacity_mah} mAh")?;
                writeln!(f, "Battery percentage: {percent} %")?;
                writeln!(f, "Battery current: {current_a:.2} A")?;
                writeln!(f, "Battery voltage: {voltage_v:.2} V")?;
                writeln!(f, "Battery temperature 1: {temp1_c} C")?;
                write!(f, "Battery temperature 2: {temp2_c} C")
            }
            Self::OdometerContinuation {
                total_distance_km,
                frame_temp_c,
            } => {
                writeln!(f, "Total distance: {total_distance_km:.2} km")?;
                write!(f, "Frame temperature: {frame_temp_c:.1} C")
            }
        }
    }
}

#[test]
fn test_display_distance_left() {
    let record = TelemetryRecord::DistanceLeft {
        distance_left_km: 12.3,
    };
    assert_eq!(record.to_string(), "Distance left: 12.30 km");
}

#[test]
fn test_display_trip_info() {
    let record = TelemetryRecord::TripInfo {
        speed_kmh: 20.0,
        average_speed_kmh: 10.0,
    };
    assert_eq!(
        record.to_string(),
        "Current speed: 20.00 km/h\nAverage speed: 10.00 km/h"
    );
}

#[test]
fn test_display_odometer() {
    let record = TelemetryRecord::OdometerContinuation {
        total_distance_km: 5000.0,
        frame_temp_c: 20.0,
    };
    assert_eq!(
        record.to_string(),
        "Total distance: 5000.00 km\nFrame temperature: 20.0 C"
    );
}
