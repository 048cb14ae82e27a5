use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use wc26_pickem::config::{AppConfig, load_env_files};
use wc26_pickem::export::{bracket_rows, export_report, leaderboard_rows, standings_rows};
use wc26_pickem::fake_tournament::{FakeTournamentOptions, generate_snapshot};
use wc26_pickem::group_scoring::PositionOutcome;
use wc26_pickem::knockout_scoring::PickOutcome;
use wc26_pickem::model::TournamentSnapshot;
use wc26_pickem::report::{ParticipantCard, TournamentReport, evaluate};
use wc26_pickem::snapshot::{default_snapshot_path, load_snapshot, save_snapshot};
use wc26_pickem::store::RemoteStore;

const USAGE: &str = "usage: wc26_pickem [standings|leaderboard|bracket|participant <id>|export <path>] \
[--snapshot <file> | --demo [seed]] [--json]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Standings,
    Leaderboard,
    Bracket,
    Participant(String),
    Export(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    File(PathBuf),
    Demo(u64),
    Configured,
}

#[derive(Debug)]
struct Args {
    command: Command,
    source: Source,
    json: bool,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut command: Option<Command> = None;
    let mut source = Source::Configured;
    let mut json = false;

    let mut iter = raw.into_iter().peekable();
    while let Some(arg) = iter.next() {
        if let Some(path) = arg.strip_prefix("--snapshot=") {
            source = Source::File(PathBuf::from(path));
        } else if arg == "--snapshot" {
            let path = iter.next().context("--snapshot needs a file")?;
            source = Source::File(PathBuf::from(path));
        } else if let Some(seed) = arg.strip_prefix("--demo=") {
            source = Source::Demo(seed.parse().context("--demo seed must be a number")?);
        } else if arg == "--demo" {
            let seed = match iter.peek().and_then(|next| next.parse::<u64>().ok()) {
                Some(seed) => {
                    iter.next();
                    seed
                }
                None => FakeTournamentOptions::default().seed,
            };
            source = Source::Demo(seed);
        } else if arg == "--json" {
            json = true;
        } else if arg == "-h" || arg == "--help" {
            anyhow::bail!(USAGE);
        } else if command.is_none() {
            command = Some(match arg.as_str() {
                "standings" => Command::Standings,
                "leaderboard" => Command::Leaderboard,
                "bracket" => Command::Bracket,
                "participant" => Command::Participant(
                    iter.next().context("participant needs an id")?,
                ),
                "export" => Command::Export(PathBuf::from(
                    iter.next().context("export needs an output path")?,
                )),
                other => anyhow::bail!("unknown command {other:?}\n{USAGE}"),
            });
        } else {
            anyhow::bail!("unexpected argument {arg:?}\n{USAGE}");
        }
    }

    Ok(Args {
        command: command.unwrap_or(Command::Leaderboard),
        source,
        json,
    })
}

/// Explicit flags first, then `PICKEM_SNAPSHOT`, then the remote store (cached
/// on success), then the last cached snapshot.
fn load_source(source: &Source, config: &AppConfig) -> Result<TournamentSnapshot> {
    match source {
        Source::File(path) => load_snapshot(path),
        Source::Demo(seed) => Ok(generate_snapshot(&FakeTournamentOptions {
            seed: *seed,
            ..FakeTournamentOptions::default()
        })),
        Source::Configured => {
            if let Some(path) = config.snapshot_path.as_deref() {
                return load_snapshot(path);
            }
            let cache_path = default_snapshot_path();
            if let Some(store) = config.store.clone() {
                match RemoteStore::new(store).fetch_snapshot() {
                    Ok(snapshot) => {
                        if let Some(path) = cache_path.as_deref() {
                            if let Err(err) = save_snapshot(path, &snapshot) {
                                warn!(error = %err, "could not cache snapshot");
                            }
                        }
                        return Ok(snapshot);
                    }
                    Err(err) => warn!(error = %err, "store fetch failed, trying cached snapshot"),
                }
            }
            match cache_path {
                Some(path) if path.exists() => {
                    info!(path = %path.display(), "using cached snapshot");
                    load_snapshot(&path)
                }
                _ => anyhow::bail!(
                    "no snapshot source: pass --snapshot or --demo, or set PICKEM_STORE_URL and PICKEM_STORE_KEY"
                ),
            }
        }
    }
}

fn print_table(rows: &[Vec<String>]) {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(col, cell)| format!("{cell:<width$}", width = widths[col]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

fn position_mark(outcome: PositionOutcome) -> &'static str {
    match outcome {
        PositionOutcome::Exact => "ok",
        PositionOutcome::QualifiedWrongOrder => "~",
        PositionOutcome::Miss => "x",
        PositionOutcome::Missing => "-",
    }
}

fn print_card(snapshot: &TournamentSnapshot, report: &TournamentReport, card: &ParticipantCard) {
    let entry = report
        .leaderboard
        .iter()
        .find(|e| e.participant_id == card.participant_id);
    match entry {
        Some(e) => println!("{} (#{}, {} pts)", card.display_name, e.rank, e.total),
        None => println!("{}", card.display_name),
    }

    println!();
    println!("Group picks: {} pts, {} perfect", card.group.total, card.group.perfect_groups);
    for group in &card.group.per_group {
        let picks = group
            .positions
            .iter()
            .map(|p| {
                format!(
                    "{}.{} [{}]",
                    p.position,
                    snapshot.team_label(p.picked_team_id.as_deref()),
                    position_mark(p.outcome)
                )
            })
            .collect::<Vec<_>>()
            .join("  ");
        let note = if group.provisional { " (provisional)" } else { "" };
        println!("  {:<4} {:>2} pts{note}  {picks}", group.group_id, group.points);
    }

    println!();
    println!(
        "Knockout picks: {} pts ({} correct, {} wrong, {} pending)",
        card.knockout.total, card.knockout.correct, card.knockout.incorrect, card.knockout.pending
    );
    for pick in &card.knockout.per_match {
        let place = pick
            .address
            .map(|a| format!("{} {}", a.round, a.slot))
            .unwrap_or_else(|| pick.match_id.clone());
        let mark = match pick.outcome {
            PickOutcome::Correct => "correct",
            PickOutcome::Incorrect => "wrong",
            PickOutcome::Pending => "pending",
        };
        println!(
            "  {place:<7} {:<20} {mark}",
            snapshot.team_label(Some(&pick.picked_team_id))
        );
    }
}

fn run(args: Args) -> Result<()> {
    let config = AppConfig::from_env();
    let snapshot = load_source(&args.source, &config)?;
    let report = evaluate(&snapshot, &config.scoring);

    match &args.command {
        Command::Standings if args.json => print_json(&report.standings)?,
        Command::Standings => print_table(&standings_rows(&report)),
        Command::Leaderboard if args.json => print_json(&report.leaderboard)?,
        Command::Leaderboard => {
            println!("{}", config.scoring.group.scheme.describe(config.scoring.group.perfect_bonus));
            print_table(&leaderboard_rows(&report));
        }
        Command::Bracket if args.json => print_json(&report.bracket)?,
        Command::Bracket => {
            print_table(&bracket_rows(&snapshot, &report));
            if let Some(champion) = report.champion.as_deref() {
                println!("Champion: {}", snapshot.team_label(Some(champion)));
            }
        }
        Command::Participant(id) => {
            let card = report
                .card(id)
                .with_context(|| format!("no submitted participant {id}"))?;
            if args.json {
                print_json(card)?;
            } else {
                print_card(&snapshot, &report, card);
            }
        }
        Command::Export(path) => {
            let summary = export_report(path, &snapshot, &report)?;
            info!(
                path = %path.display(),
                leaderboard = summary.leaderboard_rows,
                standings = summary.standings_rows,
                bracket = summary.bracket_rows,
                "exported workbook"
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    load_env_files();
    wc26_pickem::init_tracing();
    let args = parse_args(std::env::args().skip(1))?;
    run(args)
}
