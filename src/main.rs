#[macro_use]
mod progress;

mod aggregator;
mod cli;
mod config;
mod model;
mod pgn;
mod record;
mod remote;
mod report;
mod series;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::bail;
use tokio::sync::{mpsc, Semaphore};
use tokio::task;

use crate::model::CapsRecord;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = cli::parse();
    if args.help {
        cli::print_help();
        return Ok(());
    }
    let Some(username) = args.username else {
        cli::print_help();
        bail!("username is required");
    };

    progress::set_verbose(args.verbose);
    let cfg = config::Config::load();
    if let Some(n) = cfg.rayon_threads {
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    }
    let window = args.window.unwrap_or(cfg.caps_window);

    let plan = remote::build_plan(&cfg, &username, args.since.as_deref(), args.until.as_deref())
        .await?;
    if plan.is_empty() {
        eprintln!("No archives to fetch.");
        return Ok(());
    }

    // One task per archive month, bounded by the semaphore; built batches
    // funnel into the single consumer below, which owns all bucket state.
    let progress = Arc::new(progress::Progress::default());
    let sem = Arc::new(Semaphore::new(cfg.fetch_concurrency.max(1)));
    let (tx, mut rx) = mpsc::channel::<anyhow::Result<record::MonthBatch>>(16);

    for item in plan {
        let cfg = cfg.clone();
        let username = username.clone();
        let progress = Arc::clone(&progress);
        let sem = Arc::clone(&sem);
        let tx = tx.clone();
        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return;
            };
            // a failed month is counted and skipped; siblings keep going
            let games = match remote::fetch_month(&cfg, &item).await {
                Ok(g) => g,
                Err(e) => {
                    progress.month_failed();
                    vprintln!("remote: {} skipped: {e:#}", item.month_key());
                    return;
                }
            };
            let (year, month) = (item.year, item.month);
            let built =
                task::spawn_blocking(move || record::build_month(&username, year, month, games))
                    .await;
            let msg = match built {
                Ok(res) => res,
                Err(e) => Err(anyhow::anyhow!("record builder task failed: {e}")),
            };
            if let Ok(batch) = &msg {
                progress.month_done(batch.records.len());
            }
            let _ = tx.send(msg).await;
        });
    }
    drop(tx);

    let mut rollup = aggregator::Rollup::default();
    let mut caps_by_month: BTreeMap<(i32, u32), (Vec<CapsRecord>, Vec<CapsRecord>)> =
        BTreeMap::new();
    while let Some(msg) = rx.recv().await {
        let batch = msg?; // a contract violation in the data aborts the run
        for rec in &batch.records {
            rollup.add(rec);
        }
        let slot = caps_by_month.entry((batch.year, batch.month)).or_default();
        slot.0.extend(batch.caps_white);
        slot.1.extend(batch.caps_black);
    }

    // months complete in arbitrary order; flatten caps in calendar order so
    // the trend series are deterministic
    let mut caps_white = Vec::new();
    let mut caps_black = Vec::new();
    for (white, black) in caps_by_month.into_values() {
        caps_white.extend(white);
        caps_black.extend(black);
    }
    let acc_white: Vec<f64> = caps_white.iter().map(|c| c.accuracy).collect();
    let acc_black: Vec<f64> = caps_black.iter().map(|c| c.accuracy).collect();
    let trend_white = series::moving_average(&acc_white, window)?;
    let trend_black = series::moving_average(&acc_black, window)?;

    let mut stdout = std::io::stdout().lock();
    report::write_report(
        &mut stdout,
        &rollup,
        &caps_white,
        &caps_black,
        &trend_white,
        &trend_black,
    )?;
    eprintln!("{}", progress.summary());

    if let Some(out) = args.out.as_deref() {
        report::write_csv(&rollup.time_rating, out)?;
        vprintln!("report: CSV written to {}", out.display());
    }

    Ok(())
}
