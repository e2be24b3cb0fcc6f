use crate::matrix::{Cost, CostMatrix};
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::Geometric;
use std::ops::Range;

/// Iterates over the integers of `begin..end` in increasing order, where each element is
/// included i.i.d. with probability `prob`. Gaps are drawn from a geometric distribution, so
/// the running time is proportional to the number of returned elements.
pub struct BernoulliSamplingRange<'a, R: Rng> {
    current: u64,
    end: u64,
    distr: Geometric,
    rng: &'a mut R,
    started: bool,
}

impl<'a, R: Rng> BernoulliSamplingRange<'a, R> {
    pub fn new(rng: &'a mut R, begin: u64, end: u64, prob: f64) -> Self {
        assert!(begin <= end);
        assert!((0.0..=1.0).contains(&prob));
        Self {
            rng,
            current: begin,
            end,
            distr: Geometric::new(prob).unwrap(),
            started: false,
        }
    }
}

impl<'a, R: Rng> Iterator for BernoulliSamplingRange<'a, R> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.end {
            return None;
        }

        let skip = self.rng.sample(self.distr);
        let step = if self.started { skip.saturating_add(1) } else { skip };
        self.started = true;

        self.current = self.current.saturating_add(step).min(self.end);
        (self.current < self.end).then(|| self.current)
    }
}

/// Generates an `n` by `n` matrix with entries drawn independently and uniformly from `range`
pub fn generate_uniform<R: Rng>(rng: &mut R, n: usize, range: Range<Cost>) -> CostMatrix {
    let distr = Uniform::from(range);
    CostMatrix::from_fn(n, |_, _| rng.sample(distr))
}

/// Generates an `n` by `n` matrix with integral entries drawn uniformly from `0..=max`. For
/// small `max` many matchings share the same cost, which makes these matrices a stress test
/// for tie handling.
pub fn generate_integral<R: Rng>(rng: &mut R, n: usize, max: u32) -> CostMatrix {
    CostMatrix::from_fn(n, |_, _| rng.gen_range(0..=max) as Cost)
}

/// Same as [`generate_uniform`] but every entry is forbidden independently with probability
/// `forbidden_prob`. The result may admit no perfect matching.
pub fn generate_with_forbidden<R: Rng>(
    rng: &mut R,
    n: usize,
    forbidden_prob: f64,
    range: Range<Cost>,
) -> CostMatrix {
    let mut matrix = generate_uniform(rng, n, range);

    let cells = (n * n) as u64;
    for k in BernoulliSamplingRange::new(rng, 0, cells, forbidden_prob) {
        let k = k as usize;
        matrix.forbid(k / n, k % n);
    }

    matrix
}
