//! Human-readable per-file summaries printed after generation or
//! validation.

use std::path::Path;

pub struct FileSummary {
    pub path: String,
    pub slos_ok: usize,
    pub slos_failed: usize,
    pub failures: Vec<String>,
}

impl FileSummary {
    pub fn ok(path: &Path, slos_ok: usize) -> Self {
        Self {
            path: path.display().to_string(),
            slos_ok,
            slos_failed: 0,
            failures: Vec::new(),
        }
    }

    pub fn print(&self) {
        if self.slos_failed == 0 {
            println!("{}: {} SLO(s) ok", self.path, self.slos_ok);
        } else {
            println!(
                "{}: {} SLO(s) ok, {} failed",
                self.path, self.slos_ok, self.slos_failed
            );
            for failure in &self.failures {
                println!("  - {failure}");
            }
        }
    }
}
