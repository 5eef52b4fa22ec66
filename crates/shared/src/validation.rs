//! Coordinate validation.
//!
//! Latitude and longitude bounds are inclusive on both ends. Non-finite
//! values never fall inside a range and are therefore rejected.

use validator::ValidationError;

/// Smallest and largest accepted latitude, in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Smallest and largest accepted longitude, in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        err.add_param("value".into(), &lat);
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        err.add_param("value".into(), &lon);
        Err(err)
    }
}

/// Returns true iff both coordinates fall inside their ranges.
///
/// Each failed bound is logged at warn level so rejected updates can be
/// traced back to the offending value.
pub fn is_valid_location(latitude: f64, longitude: f64) -> bool {
    let valid_latitude = validate_latitude(latitude).is_ok();
    if !valid_latitude {
        tracing::warn!(latitude, "latitude out of range");
    }

    let valid_longitude = validate_longitude(longitude).is_ok();
    if !valid_longitude {
        tracing::warn!(longitude, "longitude out of range");
    }

    valid_latitude && valid_longitude
}
