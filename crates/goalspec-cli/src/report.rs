//! Summary statistics for `goalspec compare`.

use std::fmt::{self, Write};

use anyhow::{ensure, Result};

use crate::results::ResultsFile;

/// Min/max/median/mean/std of a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mean: f64,
    pub std: f64,
}

impl Stats {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

        Some(Self {
            min: sorted[0],
            max: sorted[n - 1],
            median,
            mean,
            std: var.sqrt(),
        })
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Min/Max/Median/Mean(Std) {:.6}/{:.6}/{:.6}/{:.6}({:.6})",
            self.min, self.max, self.median, self.mean, self.std
        )
    }
}

fn mean(values: &[f64]) -> f64 {
    Stats::of(values).map_or(0.0, |s| s.mean)
}

fn stats_line(values: &[f64]) -> String {
    match Stats::of(values) {
        Some(stats) => stats.to_string(),
        None => "No solved states".to_string(),
    }
}

/// Statistics of one result set, restricted to solved states.
pub fn summarize(results: &ResultsFile) -> String {
    let solved: Vec<_> = results.results.iter().filter(|r| r.solved).collect();
    let lengths: Vec<f64> = solved
        .iter()
        .filter_map(|r| r.length())
        .map(|l| l as f64)
        .collect();
    let nodes: Vec<f64> = solved.iter().map(|r| r.nodes_generated as f64).collect();
    let times: Vec<f64> = solved.iter().map(|r| r.time).collect();
    let rates: Vec<f64> = solved
        .iter()
        .filter(|r| r.time > 0.0)
        .map(|r| r.nodes_generated as f64 / r.time)
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "-Lengths-\n{}", stats_line(&lengths));
    let _ = writeln!(out, "-% Solved-\n{:.2}", results.percent_solved());
    let _ = writeln!(out, "-Nodes Generated-\n{}", stats_line(&nodes));
    let _ = writeln!(out, "-Times-\n{}", stats_line(&times));
    let _ = writeln!(out, "-Nodes/Sec-\n{}", stats_line(&rates));

    // Means: length, solved fraction, 0, nodes, time, nodes per second.
    let means = [
        mean(&lengths),
        results.percent_solved() / 100.0,
        0.0,
        mean(&nodes),
        mean(&times),
        mean(&rates),
    ];
    let _ = write!(
        out,
        "{}",
        means.iter().map(f64::to_string).collect::<Vec<_>>().join(",")
    );
    out
}

/// Side-by-side report of two result sets over the same start states.
pub fn compare(first: &ResultsFile, second: &ResultsFile) -> Result<String> {
    ensure!(
        first.states == second.states,
        "Result sets cover different start states ({} vs {})",
        first.states.len(),
        second.states.len()
    );

    let paired: Vec<_> = first.results.iter().zip(&second.results).collect();
    let diffs: Vec<f64> = paired
        .iter()
        .filter_map(|(a, b)| Some(b.length()? as f64 - a.length()? as f64))
        .collect();
    let equal = paired
        .iter()
        .filter(|(a, b)| a.length() == b.length())
        .count();
    let percent_equal = if paired.is_empty() {
        0.0
    } else {
        100.0 * equal as f64 / paired.len() as f64
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} states", first.states.len());
    let _ = writeln!(out, "\n--SOLUTION 1---\n{}", summarize(first));
    let _ = writeln!(out, "\n--SOLUTION 2---\n{}", summarize(second));
    let _ = writeln!(out, "\n\n------Solution 2 - Solution 1 Lengths-----");
    let _ = writeln!(out, "{}", stats_line(&diffs));
    let _ = write!(out, "{percent_equal:.2}% soln2 equal to soln1");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use goalspec_grid::{GridAction, GridState};

    use super::*;
    use crate::results::StateResult;

    fn result(length: Option<usize>, nodes: usize, time: f64) -> StateResult {
        StateResult {
            solved: length.is_some(),
            actions: length.map(|l| vec![GridAction::Down; l]),
            path_cost: length.map(|l| l as f64),
            nodes_generated: nodes,
            attempts: 1,
            time,
            ..StateResult::default()
        }
    }

    fn results(entries: Vec<StateResult>) -> ResultsFile {
        let states = (0..entries.len() as i64).map(|x| GridState::new(x, 0)).collect();
        let mut file = ResultsFile::new("goal :- at(0,0)", "abc", states);
        file.results = entries;
        file
    }

    #[test]
    fn stats_of_even_and_odd_samples() {
        let odd = Stats::of(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!((odd.min, odd.max, odd.median, odd.mean), (1.0, 3.0, 2.0, 2.0));

        let even = Stats::of(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.median, 2.5);
        assert!((even.std - 1.25f64.sqrt()).abs() < 1e-12);

        assert_eq!(Stats::of(&[]), None);
        assert_eq!(
            Stats::of(&[2.0]).unwrap().to_string(),
            "Min/Max/Median/Mean(Std) 2.000000/2.000000/2.000000/2.000000(0.000000)"
        );
    }

    #[test]
    fn summary_skips_unsolved_states() {
        let file = results(vec![result(Some(4), 100, 2.0), result(None, 900, 9.0)]);
        let summary = summarize(&file);
        assert!(summary.contains("-Lengths-\nMin/Max/Median/Mean(Std) 4.000000/4.000000"));
        assert!(summary.contains("-% Solved-\n50.00"));
        assert!(summary.contains("-Nodes/Sec-\nMin/Max/Median/Mean(Std) 50.000000"));
        assert!(summary.ends_with("\n4,0.5,0,100,2,50"));
    }

    #[test]
    fn length_differences_cover_states_solved_by_both() {
        let first = results(vec![
            result(Some(4), 10, 1.0),
            result(Some(6), 10, 1.0),
            result(None, 10, 1.0),
            result(Some(3), 10, 1.0),
        ]);
        let second = results(vec![
            result(Some(4), 10, 1.0),
            result(Some(5), 10, 1.0),
            result(None, 10, 1.0),
            result(None, 10, 1.0),
        ]);

        let report = compare(&first, &second).unwrap();
        assert!(report.starts_with("4 states"));
        assert!(report.contains(
            "Solution 2 - Solution 1 Lengths-----\nMin/Max/Median/Mean(Std) -1.000000/0.000000"
        ));
        assert!(report.ends_with("50.00% soln2 equal to soln1"));
    }

    #[test]
    fn different_start_states_are_rejected() {
        let first = results(vec![result(Some(1), 1, 1.0)]);
        let second = results(vec![result(Some(1), 1, 1.0), result(Some(1), 1, 1.0)]);
        assert!(compare(&first, &second).is_err());
    }
}
