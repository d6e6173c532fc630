use std::time::Instant;

use regex::Regex;
use serde::Deserialize;
use tokio::task;

use crate::config::Config;
use crate::model::RawGameEntry;

/// One monthly archive to fetch.
#[derive(Clone, Debug)]
pub struct PlanItem {
    pub year: i32,
    pub month: u32,
    pub url: String,
}

impl PlanItem {
    pub fn month_key(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

#[derive(Deserialize)]
struct ArchivesResponse {
    archives: Vec<String>,
}

#[derive(Deserialize)]
struct GamesResponse {
    games: Vec<ApiGame>,
}

#[derive(Deserialize)]
struct ApiGame {
    pgn: Option<String>,
    #[serde(default)]
    rated: bool,
    #[serde(default)]
    time_control: String,
    #[serde(default)]
    time_class: String,
    #[serde(default)]
    rules: String,
    white: ApiPlayer,
    black: ApiPlayer,
    accuracies: Option<ApiAccuracies>,
}

#[derive(Deserialize)]
struct ApiPlayer {
    #[serde(default)]
    rating: u32,
}

#[derive(Deserialize)]
struct ApiAccuracies {
    white: f64,
    black: f64,
}

/// Turn the archives listing into oldest-first plan items, keeping months
/// inside the inclusive [since, until] bounds.
fn parse_archives(urls: &[String], since: Option<&str>, until: Option<&str>) -> Vec<PlanItem> {
    let re = Regex::new(r"/(\d{4})/(\d{2})$").unwrap();
    let mut items: Vec<PlanItem> = urls
        .iter()
        .filter_map(|url| {
            let url = url.trim();
            let caps = re.captures(url)?;
            let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
            let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
            Some(PlanItem {
                year,
                month,
                url: url.to_string(),
            })
        })
        .collect();

    if let Some(since_m) = since {
        items.retain(|it| it.month_key().as_str() >= since_m);
    }
    if let Some(until_m) = until {
        items.retain(|it| it.month_key().as_str() <= until_m);
    }

    items.sort_by_key(|it| (it.year, it.month));
    items
}

fn client(cfg: &Config) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .build()
}

/// Fetch the archive list for a user and build the fetch plan.
pub async fn build_plan(
    cfg: &Config,
    username: &str,
    since: Option<&str>,
    until: Option<&str>,
) -> anyhow::Result<Vec<PlanItem>> {
    let list_url = format!("{}/player/{}/games/archives", cfg.api_base, username);
    vprintln!("remote: GET {}", list_url);
    let t0 = Instant::now();
    let cfg_cloned = cfg.clone();
    let resp = task::spawn_blocking(move || -> anyhow::Result<ArchivesResponse> {
        let resp = client(&cfg_cloned)?
            .get(&list_url)
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    })
    .await??;
    vprintln!(
        "remote: archive list fetched in {:.3}s ({} months)",
        t0.elapsed().as_secs_f64(),
        resp.archives.len()
    );

    let items = parse_archives(&resp.archives, since, until);
    vprintln!("remote: months in plan = {}", items.len());
    Ok(items)
}

/// Fetch one month's games and map them to raw entries. A failure here is
/// recoverable at the month granularity; the caller decides what to do.
pub async fn fetch_month(cfg: &Config, item: &PlanItem) -> anyhow::Result<Vec<RawGameEntry>> {
    let url = item.url.clone();
    let year = item.year;
    let month = item.month;
    let cfg_cloned = cfg.clone();

    let entries = task::spawn_blocking(move || -> anyhow::Result<Vec<RawGameEntry>> {
        let t_net = Instant::now();
        vprintln!("remote: GET {}", url);
        let resp: GamesResponse = client(&cfg_cloned)?
            .get(&url)
            .send()?
            .error_for_status()?
            .json()?;
        vprintln!(
            "remote: {}-{:02} fetched in {:.3}s ({} games)",
            year,
            month,
            t_net.elapsed().as_secs_f64(),
            resp.games.len()
        );

        let entries = resp
            .games
            .into_iter()
            .filter_map(|g| {
                // a game without PGN text has no tag block to parse
                let pgn = g.pgn?;
                Some(RawGameEntry {
                    pgn,
                    source: url.clone(),
                    rules: g.rules,
                    rated: g.rated,
                    time_control: g.time_control,
                    time_class: g.time_class,
                    white_rating: g.white.rating,
                    black_rating: g.black.rating,
                    white_accuracy: g.accuracies.as_ref().map(|a| a.white),
                    black_accuracy: g.accuracies.as_ref().map(|a| a.black),
                    year,
                    month,
                })
            })
            .collect();
        Ok(entries)
    })
    .await??;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> Vec<String> {
        vec![
            "https://api.chess.com/pub/player/alice/games/2024/11".to_string(),
            "https://api.chess.com/pub/player/alice/games/2023/01".to_string(),
            "https://api.chess.com/pub/player/alice/games/2024/02".to_string(),
            "not an archive url".to_string(),
        ]
    }

    #[test]
    fn plan_is_oldest_first_and_skips_junk() {
        let items = parse_archives(&urls(), None, None);
        let keys: Vec<String> = items.iter().map(|i| i.month_key()).collect();
        assert_eq!(keys, ["2023-01", "2024-02", "2024-11"]);
    }

    #[test]
    fn since_until_bounds_are_inclusive() {
        let items = parse_archives(&urls(), Some("2024-02"), Some("2024-02"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].month_key(), "2024-02");
    }

    #[test]
    fn games_json_maps_to_entries() {
        let body = r#"{"games":[
            {"pgn":"[Event \"Live Chess\"]","rated":true,"time_control":"300",
             "time_class":"blitz","rules":"chess",
             "white":{"rating":1500},"black":{"rating":1480},
             "accuracies":{"white":90.1,"black":85.2}},
            {"rules":"chess","white":{},"black":{}}
        ]}"#;
        let resp: GamesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.games.len(), 2);
        assert_eq!(resp.games[0].white.rating, 1500);
        assert!(resp.games[0].accuracies.is_some());
        // second game has no PGN and default-zero ratings
        assert!(resp.games[1].pgn.is_none());
        assert_eq!(resp.games[1].white.rating, 0);
    }
}
