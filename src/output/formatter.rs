use std::io::IsTerminal;
use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::catalog::{Criticality, ReferenceCatalog, ScoringKind};
use crate::scoring::{CategoryScore, FinalResult, ParameterScore, QualityTier};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a 0-100 score as "NN/100"
pub fn format_score(score: f64) -> String {
    format!("{:.0}/100", score)
}

/// Color a score string by the tier it falls in
fn paint_score(text: &str, score: f64, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match QualityTier::from_score(score) {
        QualityTier::Excellent | QualityTier::VeryGood => text.green().bold().to_string(),
        QualityTier::Good | QualityTier::Correct => text.yellow().bold().to_string(),
        _ => text.red().bold().to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a duration into a human-readable age string
/// "3d" for days, "5w" for weeks, "2y" beyond a year
pub fn format_age(duration: Duration) -> String {
    let days = duration.num_days();
    let weeks = days / 7;

    if days >= 365 {
        format!("{}y", days / 365)
    } else if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else {
        "today".to_string()
    }
}

fn format_value(value: f64, unit: &str) -> String {
    let number = if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.3}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    };
    if unit.is_empty() {
        number
    } else {
        format!("{} {}", number, unit)
    }
}

/// Format one parameter on a single line (for verbose reports)
pub fn format_parameter_detail(
    param: &ParameterScore,
    now: DateTime<Utc>,
    use_colors: bool,
) -> String {
    let marker = match param.criticality {
        Criticality::Critical => "!!",
        Criticality::Moderate => "! ",
        Criticality::Minor => "  ",
    };

    let reading = match (param.value, &param.summary, param.method) {
        (Some(value), Some(summary), Some(method)) => format!(
            "{} via {} ({} samples, latest {} ago)",
            format_value(value, &param.unit),
            method,
            summary.valid_count,
            format_age(now - summary.most_recent_date)
        ),
        _ => "not tested".to_string(),
    };

    let score = format!("{:>3.0}", param.score);
    let line = format!(
        "{} {} {}  {} - {}",
        marker,
        paint_score(&score, param.score, use_colors && param.tested),
        param.name,
        reading,
        param.interpretation
    );
    if use_colors && !param.tested {
        line.dimmed().to_string()
    } else {
        line
    }
}

fn format_category_line(category: &CategoryScore, use_colors: bool) -> String {
    let score = format!("{:>3.0}", category.score);
    format!(
        "  {:<18} {}  {:>3.0}% reliable  {}/{} tested  (weight {:.0}%)",
        category.name,
        paint_score(&score, category.score, use_colors),
        category.reliability,
        category.tested_count,
        category.total_count,
        category.weight * 100.0
    )
}

/// Format a full report for one supply
pub fn format_report(
    result: &FinalResult,
    label: &str,
    verbose: bool,
    use_colors: bool,
) -> String {
    let mut lines = Vec::new();

    let score = format_score(result.score as f64);
    let header = if use_colors {
        format!(
            "{}: {} {} - {}",
            label.bold(),
            paint_score(&score, result.score as f64, true),
            result.tier.bold(),
            result.tier.message()
        )
    } else {
        format!("{}: {} {} - {}", label, score, result.tier, result.tier.message())
    };
    lines.push(header);

    if result.is_missing_data() {
        lines.push(String::new());
        lines.extend(result.alerts.iter().map(|a| format!("  {}", a)));
        lines.push(String::new());
        lines.push("Recommendations:".to_string());
        lines.extend(result.recommendations.iter().map(|r| format!("  - {}", r)));
        return lines.join("\n");
    }

    let meta = &result.metadata;
    lines.push(format!(
        "Reliability: {}% ({}) - {}",
        result.reliability,
        meta.reliability_level,
        meta.reliability_level.message()
    ));
    lines.push(format!(
        "Parameters: {}/{} tested ({}% simple coverage), recency bonus +{:.1}",
        meta.tested_parameters, meta.total_parameters, meta.simple_reliability, meta.temporal_bonus
    ));

    lines.push(String::new());
    lines.push("Categories:".to_string());
    for category in &result.categories {
        lines.push(format_category_line(category, use_colors));
        if verbose {
            for param in &category.parameters {
                lines.push(format!(
                    "      {}",
                    format_parameter_detail(param, meta.scored_at, use_colors)
                ));
            }
        }
    }

    if !result.substitutions.is_empty() {
        lines.push(String::new());
        lines.push("Merged equivalent codes:".to_string());
        for sub in &result.substitutions {
            lines.push(format!(
                "  {}: kept {}, dropped {}",
                sub.group,
                sub.kept,
                sub.dropped.join(", ")
            ));
        }
    }

    let breaches: Vec<&String> = result
        .categories
        .iter()
        .flat_map(|c| c.critical_breaches.iter())
        .collect();
    if !breaches.is_empty() {
        lines.push(String::new());
        for breach in breaches {
            if use_colors {
                lines.push(breach.red().bold().to_string());
            } else {
                lines.push(breach.clone());
            }
        }
    }

    if !result.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations:".to_string());
        lines.extend(result.recommendations.iter().map(|r| format!("  - {}", r)));
    }

    lines.join("\n")
}

/// Format ranked results as a table with columns: Index, Score, Reliability, Tier, Label
/// No headers (minimal format)
/// Index column: 3 chars (fits "99."), right-aligned
pub fn format_ranked_table(results: &[(String, FinalResult)], use_colors: bool) -> String {
    if results.is_empty() {
        return "No observation sets scored.".to_string();
    }

    let term_width = get_terminal_width();

    // Index: 3 + 1, score: 7, reliability: 5, tier: 12, separators: 2 x 3
    let fixed_width = 3 + 1 + 7 + 5 + 12 + 2 * 3;
    let separator = "  ";

    results
        .iter()
        .enumerate()
        .map(|(idx, (label, result))| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_padded = format!("{:>7}", format_score(result.score as f64));
            let reliability = format!("{:>4}%", result.reliability);
            let tier = format!("{:<12}", result.tier.label());

            let label = match term_width {
                Some(width) if width > fixed_width + 10 => truncate_label(label, width - fixed_width),
                // Very narrow terminal, show truncated
                Some(_) => truncate_label(label, 20),
                // No terminal (pipe), don't truncate
                None => label.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    paint_score(&score_padded, result.score as f64, true),
                    separator,
                    reliability,
                    separator,
                    tier,
                    separator,
                    label
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str, score_padded, separator, reliability, separator, tier, separator, label
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked results as tab-separated values for scripting
/// Columns: score, reliability, tier, label (no headers, no colors)
pub fn format_tsv(results: &[(String, FinalResult)]) -> String {
    results
        .iter()
        .map(|(label, result)| {
            format!(
                "{}\t{}\t{}\t{}",
                result.score, result.reliability, result.tier, label
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one result's categories as tab-separated values
/// Columns: key, score, reliability, tested, total
pub fn format_category_tsv(result: &FinalResult) -> String {
    result
        .categories
        .iter()
        .map(|c| {
            format!(
                "{}\t{:.0}\t{:.0}\t{}\t{}",
                c.key, c.score, c.reliability, c.tested_count, c.total_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_scoring(kind: &ScoringKind) -> String {
    match kind {
        ScoringKind::ThresholdMax { ideal, max, alpha } => {
            format!("threshold ideal {} max {} alpha {}", ideal, max, alpha)
        }
        ScoringKind::OptimalCentral {
            ideal,
            min_acceptable,
            max_acceptable,
            ..
        } => {
            let bound = |b: &Option<f64>| b.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
            format!(
                "optimal {} within [{}, {}]",
                ideal,
                bound(min_acceptable),
                bound(max_acceptable)
            )
        }
    }
}

/// List catalog categories, optionally restricted to one, with their parameters
pub fn format_catalog(catalog: &ReferenceCatalog, only: Option<&str>, use_colors: bool) -> String {
    let mut lines = Vec::new();

    for category in catalog
        .categories()
        .iter()
        .filter(|c| only.is_none_or(|key| c.key == key))
    {
        let title = format!("{} ({}, {:.0}%)", category.name, category.key, category.weight * 100.0);
        if use_colors {
            lines.push(title.bold().to_string());
        } else {
            lines.push(title);
        }
        if !category.description.is_empty() {
            lines.push(format!("  {}", category.description));
        }
        for (code, tier) in category.all_codes() {
            if let Some(param) = catalog.parameter(code) {
                lines.push(format!(
                    "  {:<8} {:<9} {:<28} {}",
                    code,
                    tier.to_string(),
                    truncate_label(&param.name, 28),
                    describe_scoring(&param.scoring)
                ));
            }
        }
        lines.push(String::new());
    }

    if lines.is_empty() {
        return format!("No category named '{}'.", only.unwrap_or_default());
    }
    lines.pop();
    lines.join("\n")
}
