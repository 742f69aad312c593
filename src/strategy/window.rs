use std::collections::VecDeque;

/// Bounded FIFO of the most recent close prices for one symbol
///
/// Pushing past capacity evicts the oldest close, so the window holds at most
/// `capacity` entries in arrival order.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    closes: VecDeque<f64>,
    capacity: usize,
}

impl CandleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            closes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a close, evicting the oldest entry if already at capacity
    pub fn push(&mut self, close: f64) {
        if self.closes.len() == self.capacity {
            self.closes.pop_front();
        }
        self.closes.push_back(close);
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.closes.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Closes in arrival order (oldest first)
    pub fn closes(&self) -> Vec<f64> {
        self.closes.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_up_to_capacity() {
        let mut window = CandleWindow::new(3);
        assert!(window.is_empty());

        window.push(1.0);
        window.push(2.0);
        assert_eq!(window.len(), 2);
        assert!(!window.is_full());

        window.push(3.0);
        assert!(window.is_full());
        assert_eq!(window.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_push_past_capacity_evicts_oldest() {
        let mut window = CandleWindow::new(3);
        for close in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(close);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.closes(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut window = CandleWindow::new(44);
        for i in 0..1000 {
            window.push(i as f64);
            assert!(window.len() <= 44);
        }
        assert_eq!(window.closes()[0], 956.0);
    }
}
