//! Market key derivation.
//!
//! A market identifies a route independently of its direction: the origin
//! and destination airport codes are sorted as strings and concatenated, so
//! `SBGR -> SBSV` and `SBSV -> SBGR` both map to `SBGRSBSV`.

/// Build the direction-independent market key for an airport pair.
///
/// A missing airport code is treated as the empty string before sorting.
pub fn market_key(origin: Option<&str>, destination: Option<&str>) -> String {
    let a = origin.unwrap_or("");
    let b = destination.unwrap_or("");
    let (first, second) = if a <= b { (a, b) } else { (b, a) };

    let mut key = String::with_capacity(first.len() + second.len());
    key.push_str(first);
    key.push_str(second);
    key
}
