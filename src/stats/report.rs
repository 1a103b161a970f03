use crate::stats::names::{map_display_name, player_display_name};
use crate::stats::session::SessionStats;
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use warzone_api::{MatchSummary, TeamStats};

const TIME_FORMAT: &str = "%m/%d %H:%M:%S";

pub const TRIPLE_DUB: &str = "Ah shit, that's a triple dub. Good work team";

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// `numerator / denominator` rounded to 2 places, or the numerator itself when
/// the denominator is zero (a deathless game has a K/D equal to its kills).
pub fn calc_ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        numerator as f64
    } else {
        round2(numerator as f64 / denominator as f64)
    }
}

/// Two-place rounding, always showing at least one decimal: 4 → "4.0", 1.333 → "1.33".
pub fn format_decimal(value: f64) -> String {
    let rounded = round2(value);
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Superlatives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Rank {
    Highest,
    Lowest,
}

/// Single-pass "best value and everyone who reached it".
///
/// The first offer always wins outright, so no sentinel baseline is needed for
/// either direction. Ties accumulate into a set.
#[derive(Debug)]
struct Leader<'a, T> {
    rank: Rank,
    best: Option<T>,
    ids: BTreeSet<&'a str>,
}

impl<'a, T: PartialOrd + Copy> Leader<'a, T> {
    fn highest() -> Self {
        Self { rank: Rank::Highest, best: None, ids: BTreeSet::new() }
    }

    fn lowest() -> Self {
        Self { rank: Rank::Lowest, best: None, ids: BTreeSet::new() }
    }

    fn offer(&mut self, id: &'a str, value: T) {
        let beats = match (self.best, self.rank) {
            (None, _) => true,
            (Some(best), Rank::Highest) => value > best,
            (Some(best), Rank::Lowest) => value < best,
        };

        if beats {
            self.best = Some(value);
            self.ids.clear();
            self.ids.insert(id);
        } else if self.best == Some(value) {
            self.ids.insert(id);
        }
    }

    fn names(&self) -> String {
        self.ids
            .iter()
            .map(|id| player_display_name(id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub fn win_message(summary: &MatchSummary, team: &TeamStats) -> String {
    let start = summary.start_time.with_timezone(&Local).format(TIME_FORMAT);

    let lines: String = team
        .iter()
        .map(|(player, stats)| {
            let kills = u64::from(stats.kills);
            let deaths = u64::from(stats.deaths);
            format!(
                "    • {}: {kills}-{deaths} ({} K/D), {} damage.\n",
                player_display_name(player),
                format_decimal(calc_ratio(kills, deaths)),
                stats.damage,
            )
        })
        .collect();

    format!(
        "Congratulations on a recent Warzone win!\n\
         **Match Start Time**: {start}\n\
         **Match Duration**: {} minutes\n\
         **Map**: {}\n\
         **Team Stats**:\n{lines}",
        format_decimal(summary.duration_minutes),
        map_display_name(&summary.map),
    )
}

pub fn high_kill_notice(player_id: &str, kills: u32) -> String {
    format!(
        "Congrats to {} who has achieved **{kills} kills** in a single Warzone match!",
        player_display_name(player_id)
    )
}

/// Team-wide summary of the session so far. `None` until a match is recorded.
pub fn session_summary(stats: &SessionStats, now: DateTime<Local>) -> Option<String> {
    let matches = stats.match_count();
    if matches == 0 {
        return None;
    }

    let start = stats.session_start().unwrap_or(now);
    let duration = (now - start).num_seconds() as f64 / 60.0;
    let wins = stats.win_count();
    let win_label = if wins == 1 { "win" } else { "wins" };
    let avg_placement = (stats.team_placements() as f64 / f64::from(matches)).round() as u64;

    let mut total_kills = 0;
    let mut total_deaths = 0;
    let mut max_kills = Leader::highest();
    let mut max_deaths = Leader::highest();
    for (id, player) in stats.players() {
        total_kills += player.kills;
        total_deaths += player.deaths;
        max_kills.offer(id, player.max_kills);
        max_deaths.offer(id, player.max_deaths);
    }

    Some(format!(
        "**Session Start**: {}\n\
         **Matches Played**: {matches}\n\
         **Team K/D**: {total_kills}-{total_deaths} ({})\n\
         **Average Team Placement**: {avg_placement} ({wins} {win_label})\n\
         **Max Kills**: {} ({})\n\
         **Max Deaths**: {} ({})\n\
         **Total Session Duration**: {} minutes\n",
        start.format(TIME_FORMAT),
        format_decimal(calc_ratio(total_kills, total_deaths)),
        max_kills.best.unwrap_or(0),
        max_kills.names(),
        max_deaths.best.unwrap_or(0),
        max_deaths.names(),
        format_decimal(duration),
    ))
}

/// Averages and maxima for one player. `None` if they have not played.
pub fn player_summary(stats: &SessionStats, player_id: &str) -> Option<String> {
    let player = stats.player(player_id)?;
    let matches = player.individual_matches;
    if matches == 0 {
        return None;
    }

    let average = |total: u64| format_decimal(total as f64 / f64::from(matches));

    Some(format!(
        "Stats for **{player_id}**:\n\
         **Matches Played**: {matches}\n\
         **K/D**: {}-{} ({})\n\
         **Average Kills**: {} (Max: {})\n\
         **Average Deaths**: {} (Max: {})\n\
         **Average Damage**: {} ({} total)\n",
        player.kills,
        player.deaths,
        format_decimal(calc_ratio(player.kills, player.deaths)),
        average(player.kills),
        player.max_kills,
        average(player.deaths),
        player.max_deaths,
        average(player.damage),
        player.damage,
    ))
}

/// Session superlatives. `None` until a match with player data is recorded.
pub fn awards(stats: &SessionStats) -> Option<String> {
    if stats.match_count() == 0 || stats.player_ids().next().is_none() {
        return None;
    }

    let mut mvp = Leader::highest();
    let mut carried = Leader::lowest();
    let mut bloodthirsty = Leader::highest();
    let mut cannon_fodder = Leader::highest();
    let mut commando = Leader::highest();

    for (id, player) in stats.players() {
        let kd = calc_ratio(player.kills, player.deaths);
        mvp.offer(id, kd);
        carried.offer(id, kd);
        bloodthirsty.offer(id, player.kills);
        cannon_fodder.offer(id, player.deaths);
        commando.offer(id, calc_ratio(player.damage, player.damage_taken));
    }

    Some(format!(
        "**Awards**\n    \
         •**MVP**: {} ({} K/D)\n    \
         •**Carried**: {} ({} K/D)\n    \
         •**Bloodthirsty**: {} ({} kills)\n    \
         •**Cannon Fodder**: {} ({} deaths)\n    \
         •**Commando**: {} ({} damage ratio)",
        mvp.names(),
        format_decimal(mvp.best.unwrap_or_default()),
        carried.names(),
        format_decimal(carried.best.unwrap_or_default()),
        bloodthirsty.names(),
        bloodthirsty.best.unwrap_or_default(),
        cannon_fodder.names(),
        cannon_fodder.best.unwrap_or_default(),
        commando.names(),
        format_decimal(commando.best.unwrap_or_default()),
    ))
}
