//! Tracking numbers and pickup codes
//!
//! Backend-issued tracking numbers look like `ABIS-20240501-123456`. Numbers
//! minted offline look like `LOCAL-LVN3K2QO-7HQ2`, so the two schemes can
//! never collide and an offline record is recognizable on sight.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Prefix of tracking numbers minted without the backend
pub const LOCAL_PREFIX: &str = "LOCAL-";

/// Prefix of tracking numbers issued by the backend
pub const SERVER_PREFIX: &str = "ABIS-";

// No 0/O or 1/I, codes get read aloud at the counter
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Tracking number for a record created offline: time plus random characters
pub fn local_tracking_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    format!("{}{}-{}", LOCAL_PREFIX, to_base36(millis), random_code(4))
}

/// Tracking number in the backend's scheme
pub fn server_tracking_number(now: DateTime<Utc>) -> String {
    let serial: u32 = rand::rng().random_range(0..1_000_000);
    format!("{}{}-{:06}", SERVER_PREFIX, now.format("%Y%m%d"), serial)
}

/// Short code required to collect a document in person
pub fn pickup_code() -> String {
    random_code(6)
}

pub fn is_local_tracking_number(number: &str) -> bool {
    number
        .get(..LOCAL_PREFIX.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(LOCAL_PREFIX))
        .unwrap_or(false)
}

fn random_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_format() {
        let number = local_tracking_number(Utc::now());
        assert!(number.starts_with(LOCAL_PREFIX));
        assert!(is_local_tracking_number(&number));
        assert!(is_local_tracking_number(&number.to_lowercase()));
        assert_eq!(number.rsplit('-').next().map(str::len), Some(4));
    }

    #[test]
    fn test_server_format_is_not_local() {
        let number = server_tracking_number(Utc::now());
        assert!(number.starts_with(SERVER_PREFIX));
        assert!(!is_local_tracking_number(&number));
        assert_eq!(number.len(), "ABIS-20240501-123456".len());
    }

    #[test]
    fn test_pickup_code_alphabet() {
        let code = pickup_code();
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_short_input_is_not_local() {
        assert!(!is_local_tracking_number("LOC"));
        assert!(!is_local_tracking_number(""));
    }
}
