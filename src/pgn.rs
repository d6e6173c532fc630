use std::collections::HashMap;

use chrono::NaiveDateTime;

/// The closed set of PGN tags the pipeline cares about. Anything else in a
/// tag block is dropped at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Event,
    Site,
    Date,
    White,
    Black,
    Result,
    Eco,
    EcoUrl,
    UtcTime,
    TimeControl,
    Termination,
    StartTime,
    EndDate,
    EndTime,
    EventDate,
    EventTime,
}

impl Tag {
    /// Case-sensitive exact match against the tag names chess.com emits.
    fn from_name(name: &str) -> Option<Tag> {
        Some(match name {
            "Event" => Tag::Event,
            "Site" => Tag::Site,
            "Date" => Tag::Date,
            "White" => Tag::White,
            "Black" => Tag::Black,
            "Result" => Tag::Result,
            "ECO" => Tag::Eco,
            "ECOUrl" => Tag::EcoUrl,
            "UTCTime" => Tag::UtcTime,
            "TimeControl" => Tag::TimeControl,
            "Termination" => Tag::Termination,
            "StartTime" => Tag::StartTime,
            "EndDate" => Tag::EndDate,
            "EndTime" => Tag::EndTime,
            "EventDate" => Tag::EventDate,
            "EventTime" => Tag::EventTime,
            _ => return None,
        })
    }
}

/// Layout used by chess.com for combined date + time tags.
const TAG_DATETIME_FMT: &str = "%Y.%m.%d %H:%M:%S";

/// Parsed tag block of one game. Absence of a tag is a normal outcome,
/// never an error.
#[derive(Clone, Debug, Default)]
pub struct Header {
    tags: HashMap<Tag, String>,
}

impl Header {
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.tags.get(&tag).map(|s| s.as_str())
    }

    /// Typed view: small integer, `None` when missing or unparsable.
    pub fn get_u32(&self, tag: Tag) -> Option<u32> {
        self.get(tag).and_then(|s| s.parse::<u32>().ok())
    }

    /// Typed view: a date tag and a time tag combined into one timestamp.
    /// `None` when either tag is missing or the pair fails to parse.
    pub fn get_datetime(&self, date: Tag, time: Tag) -> Option<NaiveDateTime> {
        let joined = format!("{} {}", self.get(date)?, self.get(time)?);
        NaiveDateTime::parse_from_str(&joined, TAG_DATETIME_FMT).ok()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Parse the tag block out of a game's raw PGN text.
///
/// Only `[Name "Value"]`-shaped lines are considered; move text and prose
/// are skipped. A recognized tag appearing twice keeps its first value.
pub fn parse_header(pgn: &str) -> Header {
    let mut tags = HashMap::new();
    for line in pgn.lines() {
        let line = line.trim();
        if !(line.starts_with('[') && line.ends_with(']')) {
            // beyond headers
            continue;
        }
        // format: [Tag "Value"]
        let Some(space_idx) = line.find(' ') else {
            continue;
        };
        let Some(tag) = Tag::from_name(&line[1..space_idx]) else {
            continue;
        };
        if let (Some(fq_rel), Some(lq)) = (line[space_idx..].find('"'), line.rfind('"')) {
            let fq = space_idx + fq_rel;
            if lq > fq {
                let val = &line[(fq + 1)..lq];
                tags.entry(tag).or_insert_with(|| val.to_string());
            }
        }
    }
    Header { tags }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[Date "2024.03.09"]
[White "alice"]
[Black "bob"]
[Result "1-0"]
[WhiteElo "1500"]
[ECO "C50"]
[ECOUrl "https://www.chess.com/openings/Italian-Game-3-Nf6"]
[StartTime "10:00:00"]
[EndDate "2024.03.09"]
[EndTime "10:05:30"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Nf6 1-0"#;

    #[test]
    fn recognized_tags_survive_unrecognized_interleaving() {
        let h = parse_header(BLOCK);
        assert_eq!(h.get(Tag::Event), Some("Live Chess"));
        assert_eq!(h.get(Tag::Result), Some("1-0"));
        assert_eq!(h.get(Tag::Eco), Some("C50"));
        // WhiteElo is outside the closed set and must be dropped
        assert_eq!(h.len(), 11);

        let noisy = format!("[Foo \"bar\"]\n{}\n[Link \"x\"]", BLOCK);
        let h2 = parse_header(&noisy);
        assert_eq!(h2.len(), h.len());
        assert_eq!(h2.get(Tag::White), h.get(Tag::White));
    }

    #[test]
    fn first_occurrence_wins_on_duplicate_tag() {
        let h = parse_header("[Event \"Live Chess\"]\n[Event \"Casual\"]");
        assert_eq!(h.get(Tag::Event), Some("Live Chess"));
    }

    #[test]
    fn move_text_and_prose_are_not_tags() {
        let h = parse_header("some prose\n1. e4 e5 *\n[Result \"0-1\"]");
        assert_eq!(h.len(), 1);
        assert_eq!(h.get(Tag::Result), Some("0-1"));
    }

    #[test]
    fn typed_views_return_absent_not_error() {
        let h = parse_header(BLOCK);
        assert_eq!(h.get_u32(Tag::Result), None); // "1-0" is not an integer
        assert_eq!(h.get(Tag::Termination), None);
        let start = h.get_datetime(Tag::Date, Tag::StartTime).unwrap();
        let end = h.get_datetime(Tag::EndDate, Tag::EndTime).unwrap();
        assert_eq!((end - start).num_seconds(), 330);
        assert_eq!(h.get_datetime(Tag::EventDate, Tag::EventTime), None);
    }

    #[test]
    fn malformed_tag_lines_are_skipped() {
        let h = parse_header("[Event]\n[Site \"no close\n[Date \"2024.01.01\"]");
        assert_eq!(h.len(), 1);
        assert_eq!(h.get(Tag::Date), Some("2024.01.01"));
    }
}
