//! Store-generated record keys.
//!
//! A push id is 20 characters: 8 encoding the creation time in milliseconds
//! followed by 12 random characters. Ids created within the same millisecond
//! reuse the timestamp and increment the random part, so lexicographic order
//! always matches generation order.

use std::sync::Mutex;

use rand::Rng;
use rand::distributions::Alphanumeric;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;
const UID_LEN: usize = 28;

#[derive(Default)]
struct PushState {
    last_millis: i64,
    last_random: [u8; RANDOM_CHARS],
}

#[derive(Default)]
pub struct PushIdGenerator {
    state: Mutex<PushState>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_millis: i64) -> String {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        // Clock going backwards is treated like the same millisecond.
        if now_millis <= state.last_millis {
            increment(&mut state.last_random);
        } else {
            state.last_millis = now_millis;
            let mut rng = rand::thread_rng();
            for slot in state.last_random.iter_mut() {
                *slot = rng.gen_range(0..64);
            }
        }

        let mut id = String::with_capacity(TIME_CHARS + RANDOM_CHARS);
        let mut time_chars = [0u8; TIME_CHARS];
        let mut ts = state.last_millis.max(0) as u64;
        for c in time_chars.iter_mut().rev() {
            *c = PUSH_CHARS[(ts % 64) as usize];
            ts /= 64;
        }
        id.extend(time_chars.iter().map(|&c| c as char));
        id.extend(state.last_random.iter().map(|&i| PUSH_CHARS[i as usize] as char));
        id
    }
}

/// Add one to a base-64 digit array, carrying from the right.
fn increment(digits: &mut [u8; RANDOM_CHARS]) {
    for digit in digits.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
}

/// Random identifier for a newly registered user.
pub fn generate_uid() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_in_same_millisecond_sort_in_generation_order() {
        let generator = PushIdGenerator::new();
        let ids: Vec<String> = (0..50).map(|_| generator.next_at(1_736_500_000_000)).collect();

        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(ids.iter().all(|id| id.len() == 20));
        assert!(ids.iter().all(|id| id[..8] == ids[0][..8]));
    }

    #[test]
    fn test_later_timestamp_sorts_after() {
        let generator = PushIdGenerator::new();
        let first = generator.next_at(1_000);
        let second = generator.next_at(2_000);
        assert!(first < second);
    }

    #[test]
    fn test_clock_going_backwards_stays_monotonic() {
        let generator = PushIdGenerator::new();
        let first = generator.next_at(5_000);
        let second = generator.next_at(4_000);
        assert!(first < second);
    }

    #[test]
    fn test_increment_carries() {
        let mut digits = [0u8; RANDOM_CHARS];
        digits[RANDOM_CHARS - 1] = 63;
        increment(&mut digits);
        assert_eq!(digits[RANDOM_CHARS - 1], 0);
        assert_eq!(digits[RANDOM_CHARS - 2], 1);
    }

    #[test]
    fn test_uid_shape() {
        let uid = generate_uid();
        assert_eq!(uid.len(), UID_LEN);
        assert!(uid.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
