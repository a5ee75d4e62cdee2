//! Coordinate helpers for the position readout.

/// Wrap a longitude into the [-180, 180) range.
pub fn normalize_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

/// Render a position as degrees and thousandths of minutes, one line per
/// axis, e.g. `N  52 19.809` over `W 000 10.973`.
///
/// Latitude keeps two degree digits and longitude three, the widths used
/// on aviation charts.
pub fn format_position(latitude: f64, longitude: f64) -> String {
    let mut lat = (latitude * 60000.0).round() as i64;
    let mut lon = (normalize_longitude(longitude) * 60000.0).round() as i64;

    let mut lat_hemisphere = 'N';
    let mut lon_hemisphere = 'E';

    if lat < 0 {
        lat = -lat;
        lat_hemisphere = 'S';
    }

    if lon < 0 {
        lon = -lon;
        lon_hemisphere = 'W';
    }

    format!(
        "{}  {:02} {:06.3}\n{} {:03} {:06.3}",
        lat_hemisphere,
        lat / 60000,
        (lat % 60000) as f64 / 1000.0,
        lon_hemisphere,
        lon / 60000,
        (lon % 60000) as f64 / 1000.0,
    )
}
