use std::path::PathBuf;

pub struct Cli {
    pub username: Option<String>,
    pub since: Option<String>, // "YYYY-MM" (lower bound, inclusive)
    pub until: Option<String>, // "YYYY-MM" (upper bound, inclusive)
    pub out: Option<PathBuf>,  // CSV export of the time/rating rollup
    pub window: Option<usize>, // accuracy-trend window override
    pub verbose: bool,
    pub help: bool,
}

pub fn parse() -> Cli {
    let mut username: Option<String> = None;
    let mut since: Option<String> = None;
    let mut until: Option<String> = None;
    let mut out: Option<PathBuf> = None;
    let mut window: Option<usize> = None;
    let mut verbose = false;
    let mut help = false;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--since" | "--from" => {
                if let Some(m) = it.next() { since = Some(m); }
            }
            "--until" => {
                if let Some(m) = it.next() { until = Some(m); }
            }
            "--out" | "-o" => {
                if let Some(p) = it.next() { out = Some(PathBuf::from(p)); }
            }
            "--window" | "-w" => {
                if let Some(n) = it.next() { window = n.parse().ok(); }
            }
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => help = true,
            _ => {
                if username.is_none() && !arg.starts_with('-') {
                    username = Some(arg);
                }
            }
        }
    }

    Cli { username, since, until, out, window, verbose, help }
}

pub fn print_help() {
    eprintln!(
r#"chessmetrics — per-player chess.com game statistics

Usage:
  chessmetrics USERNAME [--since YYYY-MM] [--until YYYY-MM] [--out CSV] [-w N] [-v]

Options:
  --since YYYY-MM, --from     First archive month to fetch (inclusive).
  --until YYYY-MM             Last archive month to fetch (inclusive).
  --out, -o PATH              Also export the time/rating rollup as CSV.
  --window, -w N              Accuracy moving-average window (default from config.toml).
  -v, --verbose               Detailed timings/logs.
  -h, --help                  Show this help.

Notes:
  • Archives are fetched concurrently; months that fail are skipped and counted.
  • API base, User-Agent and fetch concurrency live in config.toml
    (CHESSMETRICS_API_BASE / CHESSMETRICS_UA override via environment or .env).
"#);
}
