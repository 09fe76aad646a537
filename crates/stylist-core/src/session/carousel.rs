//! Rotating loading message

use std::time::{Duration, Instant};

use super::prompts::LOADING_MESSAGES;

/// Cycles through [`LOADING_MESSAGES`] at a fixed interval
#[derive(Debug, Clone)]
pub struct LoadingCarousel {
    interval: Duration,
    index: usize,
    last_advance: Instant,
}

impl LoadingCarousel {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            index: 0,
            last_advance: now,
        }
    }

    /// Start over at the first message
    pub fn restart(&mut self, now: Instant) {
        self.index = 0;
        self.last_advance = now;
    }

    /// Advance by however many intervals have elapsed; true if the message changed
    pub fn tick(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_advance);
        let steps = (elapsed.as_millis() / self.interval.as_millis()) as usize;
        if steps == 0 {
            return false;
        }
        self.index = (self.index + steps) % LOADING_MESSAGES.len();
        self.last_advance += self.interval * steps as u32;
        true
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn message(&self) -> &'static str {
        LOADING_MESSAGES[self.index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_SECONDS: Duration = Duration::from_secs(3);

    #[test]
    fn test_starts_at_first_message() {
        let carousel = LoadingCarousel::new(THREE_SECONDS, Instant::now());
        assert_eq!(carousel.message(), "AI is creating your look...");
    }

    #[test]
    fn test_advances_every_interval() {
        let start = Instant::now();
        let mut carousel = LoadingCarousel::new(THREE_SECONDS, start);

        assert!(!carousel.tick(start + Duration::from_millis(2999)));
        assert_eq!(carousel.index(), 0);

        assert!(carousel.tick(start + THREE_SECONDS));
        assert_eq!(carousel.message(), "Consulting the color palette...");

        assert!(carousel.tick(start + Duration::from_secs(6)));
        assert_eq!(carousel.message(), "Stitching the virtual seams...");
    }

    #[test]
    fn test_wraps_around() {
        let start = Instant::now();
        let mut carousel = LoadingCarousel::new(THREE_SECONDS, start);

        carousel.tick(start + Duration::from_secs(15));
        assert_eq!(carousel.index(), 0);

        carousel.tick(start + Duration::from_secs(27));
        assert_eq!(carousel.message(), "Adding the finishing touches...");
    }

    #[test]
    fn test_restart_resets_message_and_clock() {
        let start = Instant::now();
        let mut carousel = LoadingCarousel::new(THREE_SECONDS, start);
        carousel.tick(start + Duration::from_secs(7));
        assert_ne!(carousel.index(), 0);

        let later = start + Duration::from_secs(8);
        carousel.restart(later);
        assert_eq!(carousel.index(), 0);
        assert!(!carousel.tick(later + Duration::from_secs(2)));
        assert!(carousel.tick(later + THREE_SECONDS));
    }
}
