/// Insertion-ordered vote table for one classification attribute.
///
/// The leader is the first value, in first-seen order, whose count equals the
/// maximum. Ties therefore go to whichever value was observed first.
#[derive(Debug, Clone)]
pub struct EvidenceTable<T> {
    votes: Vec<(T, u32)>,
}

impl<T> Default for EvidenceTable<T> {
    fn default() -> Self {
        Self { votes: Vec::new() }
    }
}

impl<T: Copy + PartialEq> EvidenceTable<T> {
    pub fn vote(&mut self, value: T) {
        match self.votes.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => self.votes.push((value, 1)),
        }
    }

    pub fn count(&self, value: T) -> u32 {
        self.votes
            .iter()
            .find(|(v, _)| *v == value)
            .map_or(0, |(_, c)| *c)
    }

    pub fn leader(&self) -> Option<T> {
        let max = self.votes.iter().map(|(_, c)| *c).max()?;
        self.votes.iter().find(|(_, c)| *c == max).map(|(v, _)| *v)
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
