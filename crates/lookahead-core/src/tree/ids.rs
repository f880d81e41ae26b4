/// A wrapper for an integer index used to address nodes in the arena
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the value of the actual node without having to access and risk overriding the internal value
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    /// Allow for explicit conversion from usize to NodeId
    fn from(value: usize) -> Self {
        NodeId(value)
    }
}

/// A wrapper for an integer index in `[0, K)` naming one of the fixed actions
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(usize);

impl ActionId {
    /// Get the value of the actual action without having to access and risk overriding the internal value
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ActionId {
    /// Allow for explicit conversion from usize to ActionId
    fn from(value: usize) -> Self {
        ActionId(value)
    }
}
