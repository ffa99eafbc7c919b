//! Query algebra over [`Grouped`] snapshots.
//!
//! Every operation takes `&self` and builds a new snapshot. Member lists
//! that survive unchanged are shared; lists that lose members are copied.

use super::coalesce::{Group, Grouped};
use log::debug;
use std::rc::Rc;

impl Grouped {
    /// Snapshot with the same dump and mode but no groups
    pub fn empty(&self) -> Grouped {
        Grouped {
            dump: Rc::clone(&self.dump),
            groups: Vec::new(),
            exact: self.exact,
        }
    }

    fn with_groups(&self, groups: Vec<Group>) -> Grouped {
        Grouped::from_groups(Rc::clone(&self.dump), groups, self.exact)
    }

    /// Keep the `n` largest groups
    pub fn top(&self, n: usize) -> Grouped {
        if n >= self.groups.len() {
            return self.clone();
        }
        self.with_groups(self.groups[..n].to_vec())
    }

    /// Drop goroutines that have been in their state for fewer than `threshold` minutes
    ///
    /// Groups left without members disappear.
    pub fn filter_minutes_under(&self, threshold: u32) -> Grouped {
        let dump = &self.dump;
        let groups: Vec<Group> = self
            .groups
            .iter()
            .filter_map(|group| {
                let kept: Vec<usize> = group
                    .members
                    .iter()
                    .copied()
                    .filter(|&i| dump.get(i).is_some_and(|g| g.minutes >= threshold))
                    .collect();
                if kept.is_empty() {
                    None
                } else if kept.len() == group.members.len() {
                    Some(group.clone())
                } else {
                    Some(Group::new(dump, kept.into()))
                }
            })
            .collect();

        debug!(
            "filter_minutes_under({}): {} -> {} groups",
            threshold,
            self.groups.len(),
            groups.len()
        );
        self.with_groups(groups)
    }

    /// Remove the group at `index`; out of range leaves the snapshot as is
    pub fn drop_group(&self, index: usize) -> Grouped {
        if index >= self.groups.len() {
            return self.clone();
        }
        let groups = self
            .groups
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, g)| g.clone())
            .collect();
        self.with_groups(groups)
    }

    /// Remove every group with fewer than `min_size` members
    pub fn drop_groups_by_size(&self, min_size: usize) -> Grouped {
        let groups = self
            .groups
            .iter()
            .filter(|g| g.members.len() >= min_size)
            .cloned()
            .collect();
        self.with_groups(groups)
    }

    /// Snapshot holding only the group at `index`; empty when out of range
    pub fn get_group(&self, index: usize) -> Grouped {
        match self.groups.get(index) {
            Some(group) => self.with_groups(vec![group.clone()]),
            None => self.empty(),
        }
    }
}
