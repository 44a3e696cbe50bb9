use rand::rngs::OsRng;
use rand::Rng;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates a 10-character booking reference: "BK", four base-36 chars
/// derived from the millisecond clock, four crypto-random base-36 chars.
/// The persistence layer's unique constraint is the final backstop; on a
/// duplicate the ledger simply generates a fresh one.
pub fn generate_booking_reference() -> String {
    let millis = chrono::Utc::now().timestamp_millis() as u64;
    let mut reference = String::with_capacity(10);
    reference.push_str("BK");

    let mut time_part = millis % 36u64.pow(4);
    let mut time_chars = [b'0'; 4];
    for slot in time_chars.iter_mut().rev() {
        *slot = ALPHABET[(time_part % 36) as usize];
        time_part /= 36;
    }
    reference.push_str(std::str::from_utf8(&time_chars).unwrap());

    let mut rng = OsRng;
    for _ in 0..4 {
        reference.push(ALPHABET[rng.gen_range(0..ALPHABET.len())] as char);
    }

    reference
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reference_shape() {
        let reference = generate_booking_reference();
        assert_eq!(reference.len(), 10);
        assert!(reference.starts_with("BK"));
        assert!(reference[2..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_references_rarely_collide() {
        let refs: HashSet<String> = (0..1000).map(|_| generate_booking_reference()).collect();
        // The time component is shared within a millisecond, so the four
        // random chars carry uniqueness here. 1000 draws from 36^4 space
        // collide with probability well under 1 in 3.
        assert!(refs.len() > 900);
    }
}
