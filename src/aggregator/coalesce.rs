//! Coalesce a dump into groups of equivalent goroutines.
//!
//! A [`Grouped`] snapshot never owns goroutines. It shares the parsed
//! [`Dump`] and stores index lists into it, so deriving a new snapshot
//! copies indices at most and leaves every earlier snapshot untouched.

use crate::parser::schema::{Dump, Goroutine};
use log::debug;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// One group: indices into the dump, in parse order, never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Group {
    pub(crate) members: Rc<[usize]>,
    pub(crate) min_id: u64,
}

impl Group {
    pub(crate) fn new(dump: &Dump, members: Rc<[usize]>) -> Self {
        let min_id = members
            .iter()
            .filter_map(|&i| dump.get(i))
            .map(|g| g.id)
            .min()
            .unwrap_or(u64::MAX);
        Self { members, min_id }
    }
}

/// Immutable, sorted view of groups at one point of a session
#[derive(Debug, Clone)]
pub struct Grouped {
    pub(crate) dump: Rc<Dump>,
    pub(crate) groups: Vec<Group>,
    pub(crate) exact: bool,
}

impl PartialEq for Grouped {
    fn eq(&self, other: &Self) -> bool {
        self.exact == other.exact
            && self.groups == other.groups
            && (Rc::ptr_eq(&self.dump, &other.dump) || self.dump == other.dump)
    }
}

/// Borrowed view of a single group
#[derive(Debug, Clone, Copy)]
pub struct GroupRef<'a> {
    dump: &'a Dump,
    members: &'a [usize],
}

impl<'a> GroupRef<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in parse order
    pub fn goroutines(&self) -> impl Iterator<Item = &'a Goroutine> + 'a {
        let dump = self.dump;
        let members = self.members;
        members.iter().filter_map(move |&i| dump.get(i))
    }

    /// First stored member; all members are equivalent under the grouping key
    pub fn representative(&self) -> &'a Goroutine {
        &self.dump.goroutines()[self.members[0]]
    }
}

impl Grouped {
    pub(crate) fn from_groups(dump: Rc<Dump>, mut groups: Vec<Group>, exact: bool) -> Self {
        sort_groups(&mut groups);
        Self { dump, groups, exact }
    }

    /// Whether groups were keyed by full signature
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn dump(&self) -> &Dump {
        &self.dump
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, index: usize) -> Option<GroupRef<'_>> {
        self.groups.get(index).map(|g| GroupRef {
            dump: &self.dump,
            members: &g.members,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = GroupRef<'_>> + '_ {
        self.groups.iter().map(move |g| GroupRef {
            dump: &self.dump,
            members: &g.members,
        })
    }

    /// Member counts in group order
    pub fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.members.len()).collect()
    }
}

/// Partition a dump into groups
///
/// **Public** - main entry point for coalescing
///
/// # Arguments
/// * `dump` - Parsed dump, shared with every snapshot derived from the result
/// * `exact` - Key by full signature when true, by [`Goroutine::ends`] otherwise
///
/// # Returns
/// Groups sorted by descending size; equal sizes ordered by smallest goroutine id
pub fn coalesce(dump: Rc<Dump>, exact: bool) -> Grouped {
    let buckets = if exact {
        bucket_by(dump.goroutines(), |g| g.full_signature())
    } else {
        bucket_by(dump.goroutines(), |g| g.ends())
    };

    let groups = buckets
        .into_iter()
        .map(|members| Group::new(&dump, members.into()))
        .collect();

    let grouped = Grouped::from_groups(dump, groups, exact);
    debug!(
        "Coalesced {} goroutines into {} groups (exact: {})",
        grouped.dump.len(),
        grouped.len(),
        exact
    );
    grouped
}

// Buckets come back in first-seen order; sorting happens afterwards.
fn bucket_by<'a, K, F>(goroutines: &'a [Goroutine], key: F) -> Vec<Vec<usize>>
where
    K: Hash + Eq,
    F: Fn(&'a Goroutine) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::with_capacity(100);
    let mut buckets: Vec<Vec<usize>> = Vec::new();

    for (index, goroutine) in goroutines.iter().enumerate() {
        let slot = *slots.entry(key(goroutine)).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(index);
    }

    buckets
}

/// Descending size, then ascending smallest id, then first member
pub(crate) fn sort_groups(groups: &mut [Group]) {
    groups.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then(a.min_id.cmp(&b.min_id))
            .then(a.members.first().cmp(&b.members.first()))
    });
}
