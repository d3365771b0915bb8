/// Counts gathered while processing one domain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DomainStats {
    pub raw_urls: usize,
    pub malformed: usize,
    pub excluded: usize,
    pub cleaned: usize,
    pub merged: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub urls_written: usize,
}

impl RunSummary {
    pub fn record(&mut self, stats: &DomainStats) {
        self.processed += 1;
        self.urls_written += stats.merged;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }
}
