use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Custom epoch: 2025-01-01T00:00:00Z in milliseconds since Unix epoch.
const EPOCH_MS: u64 = 1_735_689_600_000;

const WORKER_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

struct State {
    last_ms: u64,
    sequence: u64,
}

/// 64-bit snowflake generator for user and post ids.
///
/// Layout (MSB → LSB):
/// - Bits 63–22: milliseconds since 2025-01-01 (42 bits)
/// - Bits 21–12: worker id (10 bits)
/// - Bits 11–0:  per-millisecond sequence (12 bits)
///
/// Ids from one generator are strictly increasing. If the wall clock steps
/// backwards the generator keeps issuing from its last timestamp instead of
/// failing, so a clock adjustment never takes the write path down.
pub struct SnowflakeGenerator {
    worker_id: u64,
    state: Mutex<State>,
}

impl SnowflakeGenerator {
    pub fn new(worker_id: u16) -> Self {
        assert!(
            (worker_id as u64) < (1 << WORKER_BITS),
            "worker_id must fit in {WORKER_BITS} bits"
        );
        Self {
            worker_id: worker_id as u64,
            state: Mutex::new(State {
                last_ms: 0,
                sequence: 0,
            }),
        }
    }

    pub fn generate(&self) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let now_ms = current_ms().max(state.last_ms);

        if now_ms == state.last_ms {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted: borrow the next millisecond.
                state.last_ms += 1;
            }
        } else {
            state.sequence = 0;
            state.last_ms = now_ms;
        }

        let ts = state.last_ms - EPOCH_MS;
        let id = (ts << (WORKER_BITS + SEQUENCE_BITS))
            | (self.worker_id << SEQUENCE_BITS)
            | state.sequence;

        id as i64
    }
}

fn current_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(EPOCH_MS)
        .max(EPOCH_MS)
}

/// Creation time (ms since Unix epoch) encoded in a snowflake id.
pub fn snowflake_timestamp_ms(id: i64) -> u64 {
    ((id as u64) >> (WORKER_BITS + SEQUENCE_BITS)) + EPOCH_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_increasing() {
        let gen = SnowflakeGenerator::new(3);
        let mut seen = HashSet::new();
        let mut prev = 0i64;
        for _ in 0..10_000 {
            let id = gen.generate();
            assert!(id > prev, "not monotonic: {prev} >= {id}");
            assert!(seen.insert(id), "duplicate snowflake: {id}");
            prev = id;
        }
    }

    #[test]
    fn embeds_creation_time() {
        let gen = SnowflakeGenerator::new(0);
        let before = current_ms();
        let id = gen.generate();
        // Sequence overflow may push the timestamp one ms ahead.
        let after = current_ms() + 1;

        let ts = snowflake_timestamp_ms(id);
        assert!(ts >= before && ts <= after, "ts={ts} before={before} after={after}");
    }

    #[test]
    fn worker_id_is_encoded() {
        let gen = SnowflakeGenerator::new(0x2a);
        let id = gen.generate() as u64;
        assert_eq!((id >> SEQUENCE_BITS) & ((1 << WORKER_BITS) - 1), 0x2a);
    }
}
