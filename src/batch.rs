use crate::catalog::ReferenceCatalog;
use crate::observations::{load_observations, ObservationInput};
use crate::scoring::{score_supply, FinalResult, ScoringOptions};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::path::PathBuf;

/// One observation set waiting to be scored.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub label: String,
    pub input: ObservationInput,
}

/// Load every file, skipping the ones that fail.
///
/// Fails only when no file could be loaded at all.
pub fn load_entries(paths: &[PathBuf], verbose: bool) -> Result<Vec<BatchEntry>> {
    let mut entries = Vec::with_capacity(paths.len());

    for path in paths {
        match load_observations(path) {
            Ok(input) => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let label = input.label(&stem).to_string();
                if verbose {
                    eprintln!("  Loaded {} ({} codes)", label, input.parameters.len());
                }
                entries.push(BatchEntry { label, input });
            }
            Err(e) => {
                eprintln!("Skipping {}: {:#}", path.display(), e);
            }
        }
    }

    if entries.is_empty() && !paths.is_empty() {
        anyhow::bail!("No observation file could be loaded.");
    }

    Ok(entries)
}

/// Score every entry in parallel and rank the results.
///
/// `override_now` wins over each entry's own `now`; entries with neither are
/// scored at `fallback`. Results are sorted by score descending, then
/// reliability descending, then label.
pub fn score_all(
    catalog: &ReferenceCatalog,
    entries: &[BatchEntry],
    override_now: Option<DateTime<Utc>>,
    fallback: DateTime<Utc>,
    options: &ScoringOptions,
) -> Vec<(String, FinalResult)> {
    let mut scored: Vec<(String, FinalResult)> = entries
        .par_iter()
        .map(|entry| {
            let now = entry.input.reference_time(override_now, fallback);
            let result = score_supply(
                catalog,
                &entry.input.observations(),
                now,
                entry.input.source.as_ref(),
                options,
            );
            (entry.label.clone(), result)
        })
        .collect();

    scored.sort_by(rank_order);
    scored
}

fn rank_order(a: &(String, FinalResult), b: &(String, FinalResult)) -> Ordering {
    b.1.score
        .cmp(&a.1.score)
        .then_with(|| b.1.reliability.cmp(&a.1.reliability))
        .then_with(|| a.0.cmp(&b.0))
}
