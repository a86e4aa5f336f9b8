// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Output Table

//! Flat per-timestep output.
//!
//! One [`Row`] per (subset, run, timestep). The identifying columns come first
//! and every [`State`] field follows as its own column, so a JSON line per row
//! is directly loadable as a data frame.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::state::{Field, State};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub simulation: usize,
    /// Sweep point index.
    pub subset: usize,
    /// Monte Carlo sample index.
    pub run: usize,
    pub timestep: u64,
    /// Number of blocks executed to produce this row; `0` for the initial row.
    pub substep: usize,
    pub label: String,
    pub environmental_label: String,
    #[serde(flatten)]
    pub state: State,
}

impl Row {
    pub fn get(&self, field: Field) -> f64 {
        self.state.get(field)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationTable {
    rows: Vec<Row>,
}

impl SimulationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut table = Self { rows };
        table.sort();
        table
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.rows.extend(rows);
    }

    /// Append another table, e.g. a shard produced by a separate worker.
    pub fn merge(&mut self, other: SimulationTable) {
        self.rows.extend(other.rows);
        self.sort();
    }

    pub fn sort(&mut self) {
        self.rows
            .sort_by(|a, b| (a.simulation, a.subset, a.run, a.timestep).cmp(&(b.simulation, b.subset, b.run, b.timestep)));
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one trajectory, in timestep order.
    pub fn trajectory(&self, subset: usize, run: usize) -> impl Iterator<Item = &Row> + '_ {
        self.rows.iter().filter(move |r| r.subset == subset && r.run == run)
    }

    /// Distinct `(subset, run)` pairs in table order.
    pub fn trajectories(&self) -> Vec<(usize, usize)> {
        let mut ids: Vec<(usize, usize)> = Vec::new();
        for row in &self.rows {
            if ids.last() != Some(&(row.subset, row.run)) {
                ids.push((row.subset, row.run));
            }
        }
        ids
    }

    pub fn column(&self, field: Field) -> Vec<f64> {
        self.rows.iter().map(|r| r.get(field)).collect()
    }

    /// Final row of every trajectory.
    pub fn last_rows(&self) -> Vec<&Row> {
        self.trajectories()
            .into_iter()
            .filter_map(|(subset, run)| self.trajectory(subset, run).last())
            .collect()
    }

    /// One JSON object per line.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for row in &self.rows {
            let line = serde_json::to_string(row).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subset: usize, run: usize, timestep: u64, holders: f64) -> Row {
        Row {
            simulation: 0,
            subset,
            run,
            timestep,
            substep: if timestep == 0 { 0 } else { 16 },
            label: "standard".to_string(),
            environmental_label: "standard".to_string(),
            state: State { holders_balance: holders, ..State::default() },
        }
    }

    #[test]
    fn test_rows_sorted_by_trajectory_then_timestep() {
        let table = SimulationTable::from_rows(vec![row(1, 0, 1, 4.0), row(0, 0, 1, 2.0), row(1, 0, 0, 3.0), row(0, 0, 0, 1.0)]);
        assert_eq!(table.column(Field::HoldersBalance), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(table.trajectories(), vec![(0, 0), (1, 0)]);
        assert_eq!(table.last_rows().iter().map(|r| r.timestep).collect::<Vec<_>>(), vec![1, 1]);
    }

    #[test]
    fn test_jsonl_has_flat_state_columns() {
        let table = SimulationTable::from_rows(vec![row(0, 0, 0, 5.0), row(0, 0, 1, 6.0)]);
        let mut buffer = Vec::new();
        table.write_jsonl(&mut buffer).expect("test: write");
        let text = String::from_utf8(buffer).expect("test: utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[1]).expect("test: parse");
        assert_eq!(parsed["holders_balance"], 6.0);
        assert_eq!(parsed["timestep"], 1);
        assert_eq!(parsed["substep"], 16);
        assert!(parsed.get("state").is_none());
    }

    #[test]
    fn test_merge_interleaves_shards() {
        let mut a = SimulationTable::from_rows(vec![row(0, 0, 0, 1.0), row(2, 0, 0, 3.0)]);
        a.merge(SimulationTable::from_rows(vec![row(1, 0, 0, 2.0)]));
        assert_eq!(a.column(Field::HoldersBalance), vec![1.0, 2.0, 3.0]);
        assert_eq!(a.trajectory(1, 0).count(), 1);
    }
}
