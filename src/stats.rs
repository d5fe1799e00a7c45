/// Running aggregate for one station.
///
/// `mean` is never stored; it is derived from `sum` and `count` when the
/// report is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationStats {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: u64,
}

impl StationStats {
    /// Seeds an accumulator from its first observation.
    pub fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    /// Folds one more observation in.
    pub fn observe(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.sum += value;
        self.count += 1;
    }

    /// Folds another accumulator in. Associative and commutative, so partial
    /// aggregates can be combined in any order or grouping.
    pub fn merge(&mut self, other: &StationStats) {
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}
