use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use wc26_pickem::fake_tournament::{FakeTournamentOptions, generate_snapshot};
use wc26_pickem::model::Round;
use wc26_pickem::snapshot::save_snapshot;

fn main() -> anyhow::Result<()> {
    wc26_pickem::init_tracing();

    let mut out: Option<PathBuf> = None;
    let mut options = FakeTournamentOptions::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let (key, inline) = match arg.split_once('=') {
            Some((key, value)) => (key.to_string(), Some(value.to_string())),
            None => (arg.clone(), None),
        };
        let mut value = || -> anyhow::Result<String> {
            match inline.clone() {
                Some(v) => Ok(v),
                None => args.next().with_context(|| format!("{key} needs a value")),
            }
        };
        match key.as_str() {
            "--seed" => options.seed = value()?.parse().context("--seed must be a number")?,
            "--participants" => {
                options.participants = value()?.parse().context("--participants must be a number")?
            }
            "--drafts" => options.drafts = value()?.parse().context("--drafts must be a number")?,
            "--group-matches" => {
                options.group_matches_played =
                    value()?.parse().context("--group-matches must be a number")?
            }
            "--through" => {
                let raw = value()?;
                options.knockout_through = if raw.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(Round::from_tag(&raw).with_context(|| format!("unknown round {raw}"))?)
                };
            }
            _ if out.is_none() && !arg.starts_with("--") => out = Some(PathBuf::from(&arg)),
            _ => anyhow::bail!("unexpected argument {arg}"),
        }
    }

    let path = out.unwrap_or_else(|| PathBuf::from("data/fake_snapshot.json"));
    let snapshot = generate_snapshot(&options);
    save_snapshot(&path, &snapshot)?;
    info!(
        path = %path.display(),
        seed = options.seed,
        teams = snapshot.teams.len(),
        participants = snapshot.participants.len(),
        "wrote fake snapshot"
    );
    Ok(())
}
