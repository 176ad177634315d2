//! Deterministic severity score derived from the user's statement.
//!
//! The score must be reproducible across runs and platforms, so it relies only
//! on 32-bit integer arithmetic: an FNV-1a hash of the statement seeds a
//! mulberry32 generator, and the first draw is scaled into `[4.0, 10.0]`.

pub const MIN_SCORE: f64 = 4.0;
pub const MAX_SCORE: f64 = 10.0;

const FALLBACK_STATEMENT: &str = "default";
const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// Severity of `statement`, a whole number in `[4.0, 10.0]`.
///
/// Surrounding whitespace is ignored; a blank statement scores as the fixed
/// fallback text instead of failing.
pub fn score(statement: &str) -> f64 {
    let trimmed = statement.trim();
    let input = if trimmed.is_empty() {
        FALLBACK_STATEMENT
    } else {
        trimmed
    };
    let draw = Mulberry32::new(hash_statement(input)).next_unit();
    (10.0 * (0.4 + draw * 0.6)).round()
}

/// Position of the gauge needle for `score`, from -70° (calm) to +70°.
pub fn needle_angle(score: f64) -> f64 {
    -70.0 + (score / MAX_SCORE) * 140.0
}

/// FNV-1a over UTF-16 code units.
pub(crate) fn hash_statement(input: &str) -> u32 {
    input.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Counter-based 32-bit generator (mulberry32).
pub(crate) struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub(crate) fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform value in `[0, 1)`.
    pub(crate) fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(hash_statement("default"), 2_470_140_894);
        assert_eq!(hash_statement("hello"), 1_335_831_723);
        assert_eq!(hash_statement("a"), 3_826_002_220);
    }

    #[test]
    fn generator_matches_reference_draws() {
        let mut rng = Mulberry32::new(1_335_831_723);
        assert!((rng.next_unit() - 0.631_196_580_128_744_2).abs() < 1e-12);
        assert!((rng.next_unit() - 0.798_349_051_503_464_6).abs() < 1e-12);

        let mut zero = Mulberry32::new(0);
        assert!((zero.next_unit() - 0.266_429_208_684_712_65).abs() < 1e-12);
    }

    #[test]
    fn scores_known_statements() {
        assert_eq!(score("hello"), 8.0);
        assert_eq!(score("I want to rest in the forest alone.."), 6.0);
        assert_eq!(score("Freeze into a glacier under auroras.."), 9.0);
    }

    #[test]
    fn blank_statement_scores_as_fallback() {
        assert_eq!(score(""), score("default"));
        assert_eq!(score("   \t"), 5.0);
    }

    #[test]
    fn score_is_stable_and_bounded() {
        let statements = [
            "Lay me by the ocean during a storm..",
            "Take me where the world stops speaking..",
            "ünïcödé 🌲 statement",
            "x",
        ];
        for statement in statements {
            let first = score(statement);
            for _ in 0..5 {
                assert_eq!(score(statement), first);
            }
            assert!((MIN_SCORE..=MAX_SCORE).contains(&first), "{statement}: {first}");
        }
    }

    #[test]
    fn different_statements_spread_across_the_range() {
        let distinct: std::collections::BTreeSet<u64> = (0..200)
            .map(|i| score(&format!("statement number {i}")) as u64)
            .collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn needle_spans_gauge() {
        assert_eq!(needle_angle(0.0), -70.0);
        assert_eq!(needle_angle(10.0), 70.0);
        assert_eq!(needle_angle(5.0), 0.0);
    }
}
