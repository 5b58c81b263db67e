// Injected key/value tuning store (dashboard-backed gain hot-reload)
//
// The chassis re-reads its compensation gains from here every cycle the
// loops run, so a dashboard write takes effect on the very next cycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Numeric key/value store shared between the runtime (dashboard writes) and
/// the chassis (per-cycle gain reads). Last write wins, visible next read.
pub trait TuningStore: Send {
    /// Read a value, falling back to `default` when the key is absent.
    /// Absent keys must never fail the control cycle.
    fn get(&self, key: &str, default: f32) -> f32;

    fn put(&mut self, key: &str, value: f32);
}

/// In-memory store backing the operator dashboard.
#[derive(Debug, Default)]
pub struct DashboardTable {
    values: HashMap<String, f32>,
}

impl DashboardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh table in the shared handle the chassis expects.
    pub fn shared() -> SharedTuning {
        Arc::new(Mutex::new(Self::new()))
    }
}

impl TuningStore for DashboardTable {
    fn get(&self, key: &str, default: f32) -> f32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn put(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }
}

/// Shared handle to a tuning store, passed to the chassis at construction.
pub type SharedTuning = Arc<Mutex<dyn TuningStore>>;
