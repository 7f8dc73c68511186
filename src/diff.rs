use std::collections::{BTreeMap, BTreeSet};

use crate::hash::Hash;
use crate::object::Toc;

/// whole-file change status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Add,
    Modify,
    Delete,
    Conflict,
}

impl FileStatus {
    /// single-letter code for name-status listings
    pub fn code(&self) -> char {
        match self {
            FileStatus::Add => 'A',
            FileStatus::Modify => 'M',
            FileStatus::Delete => 'D',
            FileStatus::Conflict => 'U',
        }
    }
}

/// one entry of a two-way diff; `right` carries the content to materialize
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Change {
    pub status: FileStatus,
    pub right: Option<Hash>,
}

/// semantic diff between two flat tocs
///
/// paths with equal hashes on both sides are omitted; `add` means present
/// right only, `delete` present left only, `modify` differing hashes.
pub fn toc_diff(left: &Toc, right: &Toc) -> BTreeMap<String, Change> {
    let paths: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
    let mut changes = BTreeMap::new();

    for path in paths {
        let l = left.get(path);
        let r = right.get(path);

        let status = match (l, r) {
            (None, Some(_)) => FileStatus::Add,
            (Some(_), None) => FileStatus::Delete,
            (Some(a), Some(b)) if a != b => FileStatus::Modify,
            _ => continue,
        };

        changes.insert(
            path.clone(),
            Change {
                status,
                right: r.copied(),
            },
        );
    }

    changes
}

/// one entry of a three-way diff across (base, receiver, giver)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeChange {
    pub status: FileStatus,
    pub base: Option<Hash>,
    pub receiver: Option<Hash>,
    pub giver: Option<Hash>,
    /// resolved content for non-conflict entries; none means deletion
    pub resolved: Option<Hash>,
}

/// three-way diff between receiver and giver with a common base
///
/// per path: agreement means no change; a change on exactly one side takes
/// that side; divergent changes (including deletion against modification)
/// conflict. only paths requiring action against the receiver are emitted.
pub fn merge_diff(base: &Toc, receiver: &Toc, giver: &Toc) -> BTreeMap<String, MergeChange> {
    let paths: BTreeSet<&String> = base
        .keys()
        .chain(receiver.keys())
        .chain(giver.keys())
        .collect();
    let mut changes = BTreeMap::new();

    for path in paths {
        let b = base.get(path).copied();
        let r = receiver.get(path).copied();
        let g = giver.get(path).copied();

        if r == g {
            continue;
        }

        let change = if b == r {
            // giver side changed
            let status = match (r, g) {
                (None, Some(_)) => FileStatus::Add,
                (Some(_), None) => FileStatus::Delete,
                _ => FileStatus::Modify,
            };
            MergeChange {
                status,
                base: b,
                receiver: r,
                giver: g,
                resolved: g,
            }
        } else if b == g {
            // receiver side changed; nothing to apply on top of the receiver
            continue;
        } else {
            MergeChange {
                status: FileStatus::Conflict,
                base: b,
                receiver: r,
                giver: g,
                resolved: None,
            }
        };

        changes.insert(path.clone(), change);
    }

    changes
}

/// render changes as a name-status listing
pub fn name_status(changes: &BTreeMap<String, Change>) -> String {
    changes
        .iter()
        .map(|(path, change)| format!("{} {}", change.status.code(), path))
        .collect::<Vec<_>>()
        .join("\n")
}
