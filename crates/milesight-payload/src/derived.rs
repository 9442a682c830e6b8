//! Quantities computed from decoded measurements rather than read off the wire.

use crate::record::DecodedRecord;

// Magnus-form coefficients (Alduchov & Eskridge)
const MAGNUS_C1: f64 = 243.04;
const MAGNUS_C2: f64 = 17.625;

/// Dewpoint in °C for temperature `t` (°C) and relative humidity `rh` (0..100).
///
/// Humidity is clamped to 1..100 % so very dry or out-of-range readings still
/// produce a finite result.
pub fn dewpoint(t: f64, rh: f64) -> f64 {
    let h = (rh / 100.0).clamp(0.01, 1.0);
    let lnh = h.ln();
    let txc2_tpc1 = t * MAGNUS_C2 / (t + MAGNUS_C1);

    MAGNUS_C1 * (lnh + txc2_tpc1) / (MAGNUS_C2 - lnh - txc2_tpc1)
}

/// NWS heat index in °C, or `None` where the index is not defined.
///
/// Computed in °F: the Steadman approximation when it lands below 80 °F,
/// otherwise the Rothfusz regression with the NWS low/high humidity
/// adjustments. Defined for rounded temperatures of 76..=126 °F and
/// humidity within 0..=100 %.
pub fn heat_index(t: f64, rh: f64) -> Option<f64> {
    let t_f = t * 1.8 + 32.0;

    let t_rounded = (t_f + 0.5).floor();
    if !(76.0..=126.0).contains(&t_rounded) || !(0.0..=100.0).contains(&rh) {
        return None;
    }

    let simple = 0.5 * (t_f + 61.0 + (t_f - 68.0) * 1.2 + rh * 0.094);
    if simple + t_f < 160.0 {
        return Some(fahrenheit_to_celsius(simple));
    }

    let t2 = t_f * t_f;
    let rh2 = rh * rh;
    let mut result = -42.379 + 2.049_015_23 * t_f + 10.143_331_27 * rh
        - 0.224_755_41 * t_f * rh
        - 0.006_837_83 * t2
        - 0.054_817_17 * rh2
        + 0.001_228_74 * t2 * rh
        + 0.000_852_82 * t_f * rh2
        - 0.000_001_99 * t2 * rh2;

    if rh < 13.0 && (80.0..=112.0).contains(&t_f) {
        result -= ((13.0 - rh) / 4.0) * ((17.0 - (t_f - 95.0).abs()) / 17.0).sqrt();
    } else if rh > 85.0 && (80.0..=87.0).contains(&t_f) {
        result += ((rh - 85.0) / 10.0) * ((87.0 - t_f) / 5.0);
    }

    if result >= 183.5 {
        return None;
    }
    Some(fahrenheit_to_celsius(result))
}

fn fahrenheit_to_celsius(t_f: f64) -> f64 {
    (t_f - 32.0) / 1.8
}

/// Value reported as "heat index" downstream: the computed index when it is
/// defined, the plain temperature otherwise.
pub fn heat_index_or_temperature(heat_index: Option<f64>, temperature: Option<f64>) -> Option<f64> {
    heat_index.or(temperature)
}

/// Add dewpoint and heat index once both temperature and humidity are known.
pub fn enrich(mut record: DecodedRecord) -> DecodedRecord {
    if let (Some(t), Some(rh)) = (record.temperature, record.humidity) {
        record.dewpoint = Some(dewpoint(t, rh));
        record.heat_index = Some(heat_index(t, rh));
    }
    record
}
