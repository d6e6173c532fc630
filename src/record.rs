use anyhow::Context;
use chrono::NaiveDate;
use rayon::prelude::*;

use crate::model::{CapsRecord, GameRecord, Outcome, RawGameEntry, Side};
use crate::pgn::{parse_header, Header, Tag};

/// Event tag value marking a real-time game. Daily/correspondence games
/// carry other markers and are excluded from the rollups.
pub const LIVE_EVENT: &str = "Live Chess";

const OPENINGS_URL_PREFIX: &str = "https://www.chess.com/openings/";

/// Everything one month's fetch contributes to aggregation.
#[derive(Debug, Default)]
pub struct MonthBatch {
    pub year: i32,
    pub month: u32,
    pub records: Vec<GameRecord>,
    pub caps_white: Vec<CapsRecord>,
    pub caps_black: Vec<CapsRecord>,
}

/// Build the normalized record for one fetched game.
pub fn build_record(
    username: &str,
    entry: &RawGameEntry,
    header: &Header,
) -> anyhow::Result<GameRecord> {
    let side = side_for(username, header);

    let (rating, opponent_rating) = if entry.rated {
        match side {
            Side::White => (entry.white_rating, entry.black_rating),
            Side::Black => (entry.black_rating, entry.white_rating),
        }
    } else {
        // 0 is the "no rating" sentinel; reports render it as a dash.
        (0, 0)
    };

    let result = header
        .get(Tag::Result)
        .with_context(|| format!("game from {} has no Result tag", entry.source))?;
    let outcome = Outcome::from_result(result, side)?;

    Ok(GameRecord {
        side,
        rating,
        opponent_rating,
        outcome,
        seconds: elapsed_seconds(header),
        time_class: entry.time_class.clone(),
        rated: entry.rated,
        year: entry.year,
        month: entry.month,
        live: header.get(Tag::Event) == Some(LIVE_EVENT),
        opening: opening_key(header),
    })
}

/// Accuracy observation, when the game is rated and carries a score for the
/// player's side.
pub fn caps_record(entry: &RawGameEntry, header: &Header, side: Side) -> Option<CapsRecord> {
    if !entry.rated {
        return None;
    }
    let accuracy = match side {
        Side::White => entry.white_accuracy?,
        Side::Black => entry.black_accuracy?,
    };
    let result = header.get(Tag::Result)?;
    let outcome = Outcome::from_result(result, side).ok()?;
    let date = header
        .get(Tag::Date)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y.%m.%d").ok());
    Some(CapsRecord {
        outcome,
        termination: header.get(Tag::Termination).unwrap_or("").to_string(),
        accuracy,
        time_class: entry.time_class.clone(),
        date,
    })
}

/// Parse and normalize one month's fetched games. Header parsing is
/// side-effect-free, so games fan out across the rayon pool.
pub fn build_month(
    username: &str,
    year: i32,
    month: u32,
    entries: Vec<RawGameEntry>,
) -> anyhow::Result<MonthBatch> {
    let built: Vec<(GameRecord, Option<CapsRecord>)> = entries
        .par_iter()
        .map(|entry| {
            let header = parse_header(&entry.pgn);
            let rec = build_record(username, entry, &header)?;
            let caps = caps_record(entry, &header, rec.side);
            Ok((rec, caps))
        })
        .collect::<anyhow::Result<_>>()?;

    let mut batch = MonthBatch {
        year,
        month,
        ..MonthBatch::default()
    };
    for (rec, caps) in built {
        if let Some(c) = caps {
            match rec.side {
                Side::White => batch.caps_white.push(c),
                Side::Black => batch.caps_black.push(c),
            }
        }
        batch.records.push(rec);
    }
    Ok(batch)
}

fn side_for(username: &str, header: &Header) -> Side {
    match header.get(Tag::White) {
        Some(white) if white.eq_ignore_ascii_case(username) => Side::White,
        _ => Side::Black,
    }
}

/// Wall-clock seconds between the start and end timestamp pairs; 0 when
/// either pair is missing or malformed.
fn elapsed_seconds(header: &Header) -> u64 {
    let start = header.get_datetime(Tag::Date, Tag::StartTime);
    let end = header.get_datetime(Tag::EndDate, Tag::EndTime);
    match (start, end) {
        (Some(s), Some(e)) => (e - s).num_seconds().unsigned_abs(),
        _ => 0,
    }
}

/// `"{ECO}-{name}"` where the name is the ECOUrl slug de-hyphenated and cut
/// at the first digit (move numbers follow the opening name in the slug).
/// None when either opening tag is absent.
fn opening_key(header: &Header) -> Option<String> {
    let eco = header.get(Tag::Eco)?;
    let url = header.get(Tag::EcoUrl)?;
    let slug = url.strip_prefix(OPENINGS_URL_PREFIX).unwrap_or(url);
    let slug = slug.replace('-', " ");
    let cut = slug
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(slug.len());
    let name = slug[..cut].trim();
    let name = if name.is_empty() { slug.trim() } else { name };
    Some(format!("{}-{}", eco, name))
}
