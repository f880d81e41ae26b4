/// Depth-indexed cache of `gamma^d` and of the optimistic tail bound
/// `gamma^d / (1 - gamma)`.
///
/// The table grows on demand, so the depth ceiling can be any runtime value
/// without paying for a full precomputation up front.
#[derive(Debug, Clone)]
pub struct DiscountTable {
    gamma: f64,
    powers: Vec<f64>,
}

impl DiscountTable {
    /// Create a table for the given discount factor.
    pub fn new(gamma: f64) -> Self {
        DiscountTable {
            gamma,
            powers: vec![1.0],
        }
    }

    /// The discount factor this table was built for.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// `gamma^depth`
    pub fn power(&mut self, depth: usize) -> f64 {
        while self.powers.len() <= depth {
            let last = self.powers[self.powers.len() - 1];
            self.powers.push(last * self.gamma);
        }
        self.powers[depth]
    }

    /// Upper bound on the return still obtainable below a node of this depth
    /// when every reward lies in `[0, 1]`.
    pub fn tail_bound(&mut self, depth: usize) -> f64 {
        self.power(depth) / (1.0 - self.gamma)
    }
}
