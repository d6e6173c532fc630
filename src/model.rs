use anyhow::bail;
use chrono::NaiveDate;

/// One fetched game, exactly as the archive API delivered it. Built once per
/// game, read by the record builder, then discarded.
#[derive(Clone, Debug)]
pub struct RawGameEntry {
    /// Opaque PGN text (tag block + moves). Moves are never interpreted.
    pub pgn: String,
    /// Archive URL this entry came from.
    pub source: String,
    /// Variant, e.g. "chess", "chess960".
    pub rules: String,
    pub rated: bool,
    pub time_control: String,
    pub time_class: String,
    pub white_rating: u32,
    pub black_rating: u32,
    pub white_accuracy: Option<f64>,
    pub black_accuracy: Option<f64>,
    /// Archive identity (the month this entry was fetched under).
    pub year: i32,
    pub month: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}

/// Game outcome from the queried player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Derive the player's outcome from the Result tag. The enumeration is
    /// closed: any value outside "1-0" / "0-1" / "1/2-1/2" is a contract
    /// violation in the upstream data and aborts the run.
    pub fn from_result(result: &str, side: Side) -> anyhow::Result<Outcome> {
        Ok(match (result, side) {
            ("1-0", Side::White) | ("0-1", Side::Black) => Outcome::Win,
            ("1-0", Side::Black) | ("0-1", Side::White) => Outcome::Loss,
            ("1/2-1/2", _) => Outcome::Draw,
            _ => bail!("unrecognized Result tag value: {result:?}"),
        })
    }

    pub fn is_win(self) -> bool {
        self == Outcome::Win
    }

    pub fn is_draw(self) -> bool {
        self == Outcome::Draw
    }
}

/// The normalized unit of aggregation. Built once from a RawGameEntry and
/// its Header, consumed exactly once by the rollup, never mutated.
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub side: Side,
    /// 0 means "no rating" (unrated game), not a rating of zero.
    pub rating: u32,
    pub opponent_rating: u32,
    pub outcome: Outcome,
    /// Wall-clock seconds between start and end timestamps; 0 when either
    /// timestamp pair failed to parse.
    pub seconds: u64,
    pub time_class: String,
    pub rated: bool,
    pub year: i32,
    pub month: u32,
    /// Event tag equals the live-game marker.
    pub live: bool,
    /// `"{ECO}-{humanized name}"`, or None when the opening tags are absent.
    pub opening: Option<String>,
}

/// Per-game accuracy observation for a rated game that carried an accuracy
/// score. Kept in fetch order within a month, never re-sorted.
#[derive(Clone, Debug)]
pub struct CapsRecord {
    pub outcome: Outcome,
    pub termination: String,
    pub accuracy: f64,
    pub time_class: String,
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_follows_side() {
        assert_eq!(
            Outcome::from_result("1-0", Side::White).unwrap(),
            Outcome::Win
        );
        assert_eq!(
            Outcome::from_result("1-0", Side::Black).unwrap(),
            Outcome::Loss
        );
        assert_eq!(
            Outcome::from_result("0-1", Side::White).unwrap(),
            Outcome::Loss
        );
        assert_eq!(
            Outcome::from_result("0-1", Side::Black).unwrap(),
            Outcome::Win
        );
        assert_eq!(
            Outcome::from_result("1/2-1/2", Side::White).unwrap(),
            Outcome::Draw
        );
    }

    #[test]
    fn unknown_result_is_fatal() {
        assert!(Outcome::from_result("*", Side::White).is_err());
        assert!(Outcome::from_result("1-0 ", Side::White).is_err());
        assert!(Outcome::from_result("", Side::Black).is_err());
    }
}
