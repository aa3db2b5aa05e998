//! # Outcome Reporting
//!
//! When a game reaches a terminal state the controller summarises it as an
//! [`OutcomeReport`] and the session hands the report to a [`StatsRecorder`].
//! Recording is a side effect of the orchestration layer; the engines never
//! see it.

use crate::game_wrapper::GameKind;
use log::info;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub game_type: GameKind,
    pub player1_id: String,
    pub player2_id: String,
    /// `None` for a draw.
    pub winner_id: Option<String>,
    pub is_draw: bool,
    pub duration_seconds: f64,
    /// Game-specific tallies such as captures, hits or turns.
    pub counters: BTreeMap<String, u64>,
}

/// Receives outcome reports.
pub trait StatsRecorder: Send + Sync {
    fn record(&self, report: &OutcomeReport);
}

/// Writes each report to the log at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatsRecorder;

impl StatsRecorder for LogStatsRecorder {
    fn record(&self, report: &OutcomeReport) {
        let result = match &report.winner_id {
            Some(winner) => format!("{} won", winner),
            None => "draw".to_string(),
        };
        let counters: Vec<String> = report.counters.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        info!(
            "{} {} vs {}: {} after {:.1}s [{}]",
            report.game_type.name(),
            report.player1_id,
            report.player2_id,
            result,
            report.duration_seconds,
            counters.join(" ")
        );
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct MemoryStatsRecorder {
    reports: Mutex<Vec<OutcomeReport>>,
}

impl MemoryStatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<OutcomeReport> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl StatsRecorder for MemoryStatsRecorder {
    fn record(&self, report: &OutcomeReport) {
        self.reports.lock().push(report.clone());
    }
}

/// Win/draw tallies over many reports of one game kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub games: u32,
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub draws: u32,
}

impl Tally {
    pub fn add(&mut self, report: &OutcomeReport) {
        self.games += 1;
        match &report.winner_id {
            None => self.draws += 1,
            Some(w) if *w == report.player1_id => self.player1_wins += 1,
            Some(_) => self.player2_wins += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(winner: Option<&str>) -> OutcomeReport {
        OutcomeReport {
            game_type: GameKind::Connect4,
            player1_id: "player".to_string(),
            player2_id: "bot".to_string(),
            winner_id: winner.map(str::to_string),
            is_draw: winner.is_none(),
            duration_seconds: 1.5,
            counters: BTreeMap::from([("discs".to_string(), 7)]),
        }
    }

    #[test]
    fn test_memory_recorder_keeps_reports() {
        let recorder = MemoryStatsRecorder::new();
        assert!(recorder.is_empty());
        recorder.record(&report(Some("bot")));
        recorder.record(&report(None));
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.reports()[0].winner_id.as_deref(), Some("bot"));
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        for r in [report(Some("player")), report(Some("bot")), report(None), report(Some("bot"))] {
            tally.add(&r);
        }
        assert_eq!(
            tally,
            Tally {
                games: 4,
                player1_wins: 1,
                player2_wins: 2,
                draws: 1
            }
        );
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_string(&report(None)).unwrap();
        assert!(json.contains("\"game_type\":\"connect4\""));
        assert!(json.contains("\"is_draw\":true"));
    }
}
