use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Named progress bars drawn together on stderr
pub struct ProgressManager {
    mp: MultiProgress,
    bars: Arc<Mutex<HashMap<String, ProgressBar>>>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            mp: MultiProgress::new(),
            bars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a bar
    /// - `id`: unique name used by the other methods
    /// - `total`: length of the bar (SNR points for a sweep)
    /// - `template`: one of [`templates`]
    /// - `message`: initial message
    pub fn create_bar(
        &self,
        id: &str,
        total: u64,
        template: &str,
        message: &str,
    ) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;

        if bars.contains_key(id) {
            return Err(format!("Progress bar '{}' already exists", id));
        }

        let style = ProgressStyle::default_bar()
            .template(template)
            .map_err(|e| format!("Bad template: {}", e))?
            .progress_chars("█▉▊▋▌▍▎▏ ");
        let pb = self
            .mp
            .add(ProgressBar::new(total));
        pb.set_style(style);
        pb.set_message(message.to_string());

        bars.insert(id.to_string(), pb);
        Ok(())
    }

    pub fn inc(&self, id: &str, value: u64) -> Result<(), String> {
        self.with_bar(id, |pb| pb.inc(value))
    }

    pub fn set_message(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.set_message(message.to_string()))
    }

    /// Finish a bar and keep it on screen
    pub fn finish(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.finish_with_message(message.to_string()))
    }

    pub fn clear_all(&self) {
        if let Ok(mut bars) = self.bars.lock() {
            for (_, pb) in bars.drain() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, id: &str, f: impl FnOnce(&ProgressBar)) -> Result<(), String> {
        let bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        if let Some(pb) = bars.get(id) {
            f(pb);
            Ok(())
        } else {
            Err(format!("Progress bar '{}' not found", id))
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

pub mod templates {
    pub const SWEEP: &str =
        "SWEEP [{bar:30.cyan}] {percent}% ({pos}/{len} points) {msg}";
    pub const PARALLEL_SWEEP: &str =
        "SWEEP [{bar:30.green}] {percent}% ({pos}/{len} points, {elapsed}) {msg}";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_lifecycle() {
        let pm = ProgressManager::new();
        pm.create_bar("sweep", 3, templates::SWEEP, "start").unwrap();
        assert!(pm.create_bar("sweep", 3, templates::SWEEP, "again").is_err());
        pm.inc("sweep", 1).unwrap();
        pm.set_message("sweep", "4.0 dB").unwrap();
        pm.finish("sweep", "done").unwrap();
        assert!(pm.inc("missing", 1).is_err());
        pm.clear_all();
        assert!(pm.inc("sweep", 1).is_err());
        pm.create_bar("sweep", 3, templates::SWEEP, "again").unwrap();
    }

    #[test]
    fn test_templates_parse() {
        for template in [templates::SWEEP, templates::PARALLEL_SWEEP] {
            assert!(ProgressStyle::default_bar().template(template).is_ok());
        }
    }
}
