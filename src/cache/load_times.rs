use dashmap::DashMap;
use std::collections::HashMap;
use std::time::Duration;

/// Elapsed time of the last successful fetch per URL
#[derive(Debug, Default)]
pub struct LoadTimeRecorder {
    times: DashMap<String, Duration>,
}

impl LoadTimeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the measurement for `url`, replacing any earlier one
    pub fn record(&self, url: impl Into<String>, elapsed: Duration) {
        self.times.insert(url.into(), elapsed);
    }

    pub fn get(&self, url: &str) -> Option<Duration> {
        self.times.get(url).map(|elapsed| *elapsed)
    }

    pub fn all(&self) -> HashMap<String, Duration> {
        self.times
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites() {
        let recorder = LoadTimeRecorder::new();
        recorder.record("/a.js", Duration::from_millis(5));
        recorder.record("/a.js", Duration::from_millis(7));

        assert_eq!(recorder.get("/a.js"), Some(Duration::from_millis(7)));
        assert_eq!(recorder.get("/b.js"), None);
        assert_eq!(recorder.all().len(), 1);
    }
}
