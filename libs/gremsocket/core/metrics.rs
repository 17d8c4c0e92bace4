use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free frame counters of a session
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
    pings_sent: AtomicU64,
    connects: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_pings(&self) {
        self.pings_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_connects(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn pings_sent(&self) -> u64 {
        self.pings_sent.load(Ordering::Relaxed)
    }

    pub fn connects(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }
}

/// Session metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMetrics {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub pings_sent: u64,
    pub connects: u64,
    pub connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_increments() {
        let metrics = Arc::new(AtomicMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.increment_sent();
                        metrics.increment_received();
                    }
                    metrics.increment_pings();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.frames_sent(), 4000);
        assert_eq!(metrics.frames_received(), 4000);
        assert_eq!(metrics.pings_sent(), 4);
        assert_eq!(metrics.connects(), 0);
    }
}
