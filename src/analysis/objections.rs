//! Objection frequency ranking.

use crate::models::ObjectionTag;

/// Tags ranked by descending frequency.
///
/// Ties keep the order in which tags were first encountered, so the
/// ranking is stable rather than alphabetic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectionTally {
    ranked: Vec<(ObjectionTag, usize)>,
}

impl ObjectionTally {
    /// Build a tally from a flattened multiset of tags.
    pub fn from_tags<I>(tags: I) -> Self
    where
        I: IntoIterator<Item = ObjectionTag>,
    {
        let mut ranked: Vec<(ObjectionTag, usize)> = Vec::new();

        for tag in tags {
            match ranked.iter_mut().find(|(seen, _)| *seen == tag) {
                Some((_, count)) => *count += 1,
                None => ranked.push((tag, 1)),
            }
        }

        // sort_by_key is stable: equal counts stay in first-seen order
        ranked.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

        Self { ranked }
    }

    /// The `n` most frequent tags with their counts.
    pub fn top(&self, n: usize) -> Vec<(ObjectionTag, usize)> {
        self.ranked.iter().take(n).copied().collect()
    }

    /// The most frequent tag, or `None` when no objections were seen.
    pub fn primary(&self) -> Option<ObjectionTag> {
        self.ranked.first().map(|(tag, _)| *tag)
    }

    /// The full ranking.
    pub fn ranked(&self) -> &[(ObjectionTag, usize)] {
        &self.ranked
    }
}
