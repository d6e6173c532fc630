use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::aggregator::{Bucket, Rollup};
use crate::model::CapsRecord;

/// Ratings use 0 as the "no rating" sentinel; never print it as a number.
fn fmt_rating(r: u32) -> String {
    if r == 0 {
        "-".to_string()
    } else {
        r.to_string()
    }
}

/// Seconds as h:mm:ss.
pub fn fmt_duration(secs: u64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn bucket_row(key: &str, b: &Bucket) -> String {
    format!(
        "{:<40} {:>6} {:>5}/{:<5}/{:<5} {:>10}  {:>5}-{:<5} {:>5}-{:<5} {:>5}",
        key,
        b.games,
        b.wins,
        b.losses,
        b.draws,
        fmt_duration(b.seconds),
        fmt_rating(b.rating_min),
        fmt_rating(b.rating_max),
        fmt_rating(b.opponent_min),
        fmt_rating(b.opponent_max),
        fmt_rating(b.best_win),
    )
}

fn write_bucket_table<W: Write>(
    w: &mut W,
    title: &str,
    map: &BTreeMap<String, Bucket>,
) -> io::Result<()> {
    writeln!(w, "\n{title}")?;
    writeln!(
        w,
        "{:<40} {:>6} {:>17} {:>10}  {:>11} {:>11} {:>5}",
        "key", "games", "w/l/d", "time", "rating", "opponent", "best"
    )?;
    for (key, bucket) in map {
        writeln!(w, "{}", bucket_row(key, bucket))?;
    }
    Ok(())
}

/// Console report: every rollup table in lexicographic key order, the month
/// time table, accuracy trends, and the grand total. Read-only over the
/// aggregation results.
pub fn write_report<W: Write>(
    w: &mut W,
    rollup: &Rollup,
    caps_white: &[CapsRecord],
    caps_black: &[CapsRecord],
    caps_trend_white: &[f64],
    caps_trend_black: &[f64],
) -> io::Result<()> {
    if rollup.is_empty() {
        writeln!(w, "No live games found.")?;
        return Ok(());
    }

    writeln!(w, "\nTime played by month")?;
    for (label, hours) in month_series(rollup) {
        let games = rollup.months[&label].games;
        writeln!(w, "{:<10} {:>6} games {:>8.1} h", label, games, hours)?;
    }

    write_bucket_table(w, "Results by time class and month", &rollup.time_rating)?;
    write_bucket_table(w, "Openings as White", &rollup.openings_white)?;
    write_bucket_table(w, "Openings as Black", &rollup.openings_black)?;

    write_trend(w, "Accuracy as White", caps_white, caps_trend_white)?;
    write_trend(w, "Accuracy as Black", caps_black, caps_trend_black)?;

    writeln!(w, "\nTotal time played: {}", fmt_duration(rollup.total_seconds))?;
    Ok(())
}

fn write_trend<W: Write>(
    w: &mut W,
    title: &str,
    caps: &[CapsRecord],
    trend: &[f64],
) -> io::Result<()> {
    if trend.is_empty() {
        return Ok(());
    }
    let latest = trend[trend.len() - 1];
    writeln!(w, "\n{title}: {:.1} (over {} windows)", latest, trend.len())?;

    let mut by_class: BTreeMap<&str, u64> = BTreeMap::new();
    for c in caps {
        *by_class.entry(c.time_class.as_str()).or_default() += 1;
    }
    let classes: Vec<String> = by_class
        .iter()
        .map(|(class, n)| format!("{class} {n}"))
        .collect();
    let span = match (
        caps.iter().filter_map(|c| c.date).min(),
        caps.iter().filter_map(|c| c.date).max(),
    ) {
        (Some(first), Some(last)) => format!(", {first} to {last}"),
        _ => String::new(),
    };
    let won = caps.iter().filter(|c| c.outcome.is_win()).count();
    let drew = caps.iter().filter(|c| c.outcome.is_draw()).count();
    writeln!(
        w,
        "  {} scored games ({}), won {} drew {}{}",
        caps.len(),
        classes.join(", "),
        won,
        drew,
        span
    )?;

    let mut by_term: BTreeMap<&str, u64> = BTreeMap::new();
    for c in caps.iter().filter(|c| !c.termination.is_empty()) {
        *by_term.entry(c.termination.as_str()).or_default() += 1;
    }
    if let Some((term, n)) = by_term.iter().max_by_key(|(_, n)| **n) {
        writeln!(w, "  most common finish: {} ({}x)", term, n)?;
    }
    Ok(())
}

/// Chart feed: ordered (month label, hours played) pairs for the rendering
/// collaborator.
pub fn month_series(rollup: &Rollup) -> Vec<(String, f64)> {
    rollup
        .months
        .iter()
        .map(|(k, mt)| (k.clone(), mt.seconds as f64 / 3600.0))
        .collect()
}

/// CSV export of a keyed bucket table.
pub fn write_csv(map: &BTreeMap<String, Bucket>, out_path: &Path) -> io::Result<()> {
    let mut f = File::create(out_path)?;
    write_csv_to(map, &mut f)
}

fn write_csv_to<W: Write>(map: &BTreeMap<String, Bucket>, f: &mut W) -> io::Result<()> {
    writeln!(
        f,
        "key,games,wins,losses,draws,seconds,rating_min,rating_max,opponent_min,opponent_max,best_win"
    )?;
    for (k, b) in map {
        writeln!(
            f,
            "{},{},{},{},{},{},{},{},{},{},{}",
            escape_csv(k),
            b.games,
            b.wins,
            b.losses,
            b.draws,
            b.seconds,
            b.rating_min,
            b.rating_max,
            b.opponent_min,
            b.opponent_max,
            b.best_win
        )?;
    }
    Ok(())
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
