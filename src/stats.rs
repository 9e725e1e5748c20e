//! Probe sequence length statistics.
//!
//! These read-only scans gauge how well a hash function spreads keys over the
//! table. The maximum PSL bounds the worst-case probe count of every
//! operation; the mean is the typical probe count; a high variance means keys
//! cluster, i.e. the hash is far from uniform for this key set.
//!
//! All of them require a non-empty table.

use crate::contract::contract;
use crate::robin_table::RobinTable;

/// Summary of the PSL distribution over occupied slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PslStats {
    pub max: usize,
    pub mean: f64,
    /// Population variance (divided by the entry count).
    pub variance: f64,
}

impl<'k, V, H> RobinTable<'k, V, H> {
    pub fn psl_max(&self) -> usize {
        contract!(!self.is_empty(), "psl statistics of an empty table");
        self.entries().map(|e| e.psl).max().unwrap_or(0)
    }

    pub fn psl_mean(&self) -> f64 {
        contract!(!self.is_empty(), "psl statistics of an empty table");
        let sum: f64 = self.entries().map(|e| e.psl as f64).sum();
        sum / self.len() as f64
    }

    pub fn psl_variance(&self) -> f64 {
        let mean = self.psl_mean();
        let sum: f64 = self
            .entries()
            .map(|e| {
                let d = e.psl as f64 - mean;
                d * d
            })
            .sum();
        sum / self.len() as f64
    }

    /// All three statistics.
    pub fn psl_stats(&self) -> PslStats {
        PslStats {
            max: self.psl_max(),
            mean: self.psl_mean(),
            variance: self.psl_variance(),
        }
    }
}
