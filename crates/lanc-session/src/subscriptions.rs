/// Sensor ids to re-subscribe after a reconnect, in first-registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscriptions {
    pdids: Vec<u32>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `pdid`. Returns false when it was already present.
    pub fn insert(&mut self, pdid: u32) -> bool {
        if self.pdids.contains(&pdid) {
            return false;
        }
        self.pdids.push(pdid);
        true
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.pdids.clone()
    }

    pub fn clear(&mut self) {
        self.pdids.clear();
    }

    pub fn len(&self) -> usize {
        self.pdids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pdids.is_empty()
    }
}
