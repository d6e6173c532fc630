use std::collections::BTreeMap;

use crate::model::{GameRecord, Outcome};

/// Keyed accumulator of counts and rating extremes. Created lazily on the
/// first record observed for its key, then updated additively / by strict
/// min-max; the result is the same for any permutation of the records.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    pub seconds: u64,
    pub games: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub rating_min: u32,
    pub rating_max: u32,
    pub opponent_min: u32,
    pub opponent_max: u32,
    /// Highest opponent rating among games won; 0 until a win is seen.
    pub best_win: u32,
}

impl Bucket {
    fn from_record(rec: &GameRecord) -> Bucket {
        let mut b = Bucket {
            seconds: rec.seconds,
            games: 1,
            wins: 0,
            losses: 0,
            draws: 0,
            rating_min: rec.rating,
            rating_max: rec.rating,
            opponent_min: rec.opponent_rating,
            opponent_max: rec.opponent_rating,
            best_win: 0,
        };
        b.count_outcome(rec);
        b
    }

    fn update(&mut self, rec: &GameRecord) {
        self.seconds += rec.seconds;
        self.games += 1;
        self.rating_min = self.rating_min.min(rec.rating);
        self.rating_max = self.rating_max.max(rec.rating);
        self.opponent_min = self.opponent_min.min(rec.opponent_rating);
        self.opponent_max = self.opponent_max.max(rec.opponent_rating);
        self.count_outcome(rec);
    }

    fn count_outcome(&mut self, rec: &GameRecord) {
        match rec.outcome {
            Outcome::Win => {
                self.wins += 1;
                self.best_win = self.best_win.max(rec.opponent_rating);
            }
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }
}

/// Fixed-shape per-month time accumulator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonthTime {
    pub seconds: u64,
    pub games: u64,
}

/// Streaming reducer over game records. BTreeMap keys give the reports
/// their lexicographic iteration order directly.
#[derive(Debug, Default)]
pub struct Rollup {
    /// Keyed `"{time_class}{rated flag} {year}-{month:02}"`.
    pub time_rating: BTreeMap<String, Bucket>,
    /// Keyed `"{year}-{month:02}"`.
    pub months: BTreeMap<String, MonthTime>,
    /// Keyed by opening key, split by the side the player held.
    pub openings_white: BTreeMap<String, Bucket>,
    pub openings_black: BTreeMap<String, Bucket>,
    pub total_seconds: u64,
}

impl Rollup {
    /// Fold one record in. Only live games count; archived/daily games are
    /// excluded here as a policy filter, not a parsing concern.
    pub fn add(&mut self, rec: &GameRecord) {
        if !rec.live {
            return;
        }

        self.total_seconds += rec.seconds;

        upsert(&mut self.time_rating, time_rating_key(rec), rec);

        let mt = self.months.entry(month_key(rec)).or_default();
        mt.seconds += rec.seconds;
        mt.games += 1;

        if let Some(opening) = rec.opening.as_deref() {
            let per_side = match rec.side {
                crate::model::Side::White => &mut self.openings_white,
                crate::model::Side::Black => &mut self.openings_black,
            };
            upsert(per_side, opening.to_string(), rec);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

fn upsert(map: &mut BTreeMap<String, Bucket>, key: String, rec: &GameRecord) {
    map.entry(key)
        .and_modify(|b| b.update(rec))
        .or_insert_with(|| Bucket::from_record(rec));
}

fn time_rating_key(rec: &GameRecord) -> String {
    let flag = if rec.rated { "" } else { " unrated" };
    format!(
        "{}{} {}-{:02}",
        rec.time_class, flag, rec.year, rec.month
    )
}

fn month_key(rec: &GameRecord) -> String {
    format!("{}-{:02}", rec.year, rec.month)
}
