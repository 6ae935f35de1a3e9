//! Subcommand execution

use crate::cli::{Cli, Command};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use vault_core::{VaultConfig, VaultPass};
use vault_gtd::RemindersCache;
use vault_links::RepairMap;
use vault_model::Diagnostics;

/// Exit code when diagnostics contain errors (`check`, `repair`)
pub(crate) const EXIT_ERRORS: u8 = 2;

/// Config file, then `VAULT_ROOT`, then `--vault`
pub(crate) fn resolve_config(cli: &Cli) -> Result<VaultConfig> {
    let config = match &cli.config {
        Some(path) => VaultConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VaultConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(root) = &cli.vault {
        config = config.with_vault_root(root);
    }
    Ok(config)
}

fn print_diagnostics(out: &mut impl Write, diagnostics: &Diagnostics) -> Result<()> {
    for diagnostic in diagnostics {
        writeln!(out, "{diagnostic}")?;
    }
    Ok(())
}

fn print_json(out: &mut impl Write, value: &serde_json::Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn run(cli: &Cli, out: &mut impl Write) -> Result<u8> {
    let mut config = resolve_config(cli)?;
    if let Command::Gtd { infer_due: true, .. } = cli.command {
        config = config.with_due_inference(true);
    }
    let root = config.vault_root.clone();
    let pass = VaultPass::open(config).with_context(|| format!("opening vault {}", root.display()))?;

    match &cli.command {
        Command::People { snapshot } => people(&pass, snapshot.as_deref(), cli.json, out),
        Command::Gtd { reminders, .. } => gtd(&pass, reminders, cli.json, out),
        Command::Links { broken_only } => links(&pass, *broken_only, cli.json, out),
        Command::Repair { map, dry_run } => repair(&pass, map, *dry_run, cli.json, out),
        Command::Check => check(&pass, cli.json, out),
    }
}

fn people(pass: &VaultPass, snapshot: Option<&Path>, as_json: bool, out: &mut impl Write) -> Result<u8> {
    let report = pass.people()?;
    let people = report.index.to_snapshot();

    if let Some(path) = snapshot {
        let text = serde_json::to_string_pretty(&people)?;
        std::fs::write(path, text).with_context(|| format!("writing snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote people snapshot");
    }

    if as_json {
        print_json(out, &json!({ "people": people, "diagnostics": report.diagnostics }))?;
    } else {
        writeln!(out, "{} people indexed from {} pages", report.index.len(), report.documents)?;
        print_diagnostics(out, &report.diagnostics)?;
    }
    Ok(0)
}

fn gtd(pass: &VaultPass, reminders: &Path, as_json: bool, out: &mut impl Write) -> Result<u8> {
    let cache = RemindersCache::load(reminders)?;
    let people = pass.people()?;
    let report = pass.gtd(&cache.into_raw_tasks(), &people.index, Utc::now().date_naive());

    if as_json {
        print_json(
            out,
            &json!({
                "summary": report.board.summary(),
                "board": report.board,
                "diagnostics": report.diagnostics,
            }),
        )?;
    } else {
        write!(out, "{}", report.board.to_markdown())?;
    }
    Ok(0)
}

fn links(pass: &VaultPass, broken_only: bool, as_json: bool, out: &mut impl Write) -> Result<u8> {
    let people = pass.people()?;
    let report = pass.links(Some(&people.index))?;
    let references: Vec<_> = report
        .references
        .iter()
        .filter(|r| !broken_only || r.is_broken())
        .collect();

    if as_json {
        print_json(
            out,
            &json!({ "references": references, "counts": report.graph.counts(), "skipped": report.skipped }),
        )?;
    } else {
        for r in &references {
            writeln!(out, "{}:{} {} `{}` {}", r.source, r.line, r.kind, r.raw_target, r.resolution)?;
        }
        let counts = report.graph.counts();
        writeln!(
            out,
            "{} references: {} valid, {} broken, {} external",
            counts.total(),
            counts.valid,
            counts.broken(),
            counts.external
        )?;
    }
    Ok(0)
}

fn repair(pass: &VaultPass, map: &Path, dry_run: bool, as_json: bool, out: &mut impl Write) -> Result<u8> {
    let map = RepairMap::load(map)?;
    let report = pass.repair(&map, dry_run)?;

    if as_json {
        print_json(out, &serde_json::to_value(&report)?)?;
    } else {
        for change in &report.changes {
            writeln!(out, "{}:{} {} -> {}", change.path, change.line, change.old, change.new)?;
        }
        let verb = if dry_run { "would rewrite" } else { "rewrote" };
        writeln!(out, "{verb} {} references in {} documents", report.changes.len(), report.rewritten.len())?;
        print_diagnostics(out, &report.diagnostics)?;
    }
    Ok(if report.diagnostics.has_errors() { EXIT_ERRORS } else { 0 })
}

fn check(pass: &VaultPass, as_json: bool, out: &mut impl Write) -> Result<u8> {
    let report = pass.check()?;
    let diagnostics = report.diagnostics();

    if as_json {
        print_json(
            out,
            &json!({
                "people": report.people.index.len(),
                "references": report.links.graph.counts(),
                "diagnostics": diagnostics,
            }),
        )?;
    } else {
        print_diagnostics(out, &diagnostics)?;
        writeln!(
            out,
            "{} errors, {} warnings",
            diagnostics.errors().count(),
            diagnostics.warnings().count()
        )?;
    }

    Ok(if report.has_errors() { EXIT_ERRORS } else { 0 })
}
