use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::error::Result;
use crate::hash::Hash;
use crate::object::{self, Object};
use crate::repo::Repo;

/// parent hashes of a commit; a hash absent from the local store (a peer
/// head that was never fetched) is treated as a frontier with no parents
fn parent_hashes(repo: &Repo, commit_hash: &Hash) -> Result<Vec<Hash>> {
    match object::read(repo, commit_hash)? {
        Some(Object::Commit { parents, .. }) => Ok(parents),
        _ => Ok(Vec::new()),
    }
}

/// reflexive transitive closure over parent links
pub fn ancestors(repo: &Repo, commit_hash: &Hash) -> Result<BTreeSet<Hash>> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([*commit_hash]);

    while let Some(hash) = queue.pop_front() {
        if !seen.insert(hash) {
            continue;
        }
        for parent in parent_hashes(repo, &hash)? {
            queue.push_back(parent);
        }
    }

    Ok(seen)
}

/// does `a` appear among the ancestors of `b`
pub fn is_ancestor(repo: &Repo, a: &Hash, b: &Hash) -> Result<bool> {
    Ok(ancestors(repo, b)?.contains(a))
}

/// is the receiver already at or past the giver
///
/// true when the giver is absent, when both are equal, and when the giver
/// is an ancestor of the receiver.
pub fn is_up_to_date(
    repo: &Repo,
    receiver: Option<&Hash>,
    giver: Option<&Hash>,
) -> Result<bool> {
    match (receiver, giver) {
        (_, None) => Ok(true),
        (None, Some(_)) => Ok(false),
        (Some(r), Some(g)) => Ok(r == g || is_ancestor(repo, g, r)?),
    }
}

/// a common ancestor of both commits that is not a proper ancestor of any
/// other common ancestor
///
/// when several maximal candidates exist (criss-cross histories) an
/// arbitrary one is returned. ancestor sets are compared as sets; the walk
/// order carries no meaning.
pub fn common_ancestor(repo: &Repo, a: &Hash, b: &Hash) -> Result<Option<Hash>> {
    let common: BTreeSet<Hash> = ancestors(repo, a)?
        .intersection(&ancestors(repo, b)?)
        .copied()
        .collect();

    let mut memo: HashMap<Hash, BTreeSet<Hash>> = HashMap::new();
    for candidate in &common {
        let mut is_proper_ancestor_of_other = false;
        for other in &common {
            if other == candidate {
                continue;
            }
            if !memo.contains_key(other) {
                let set = ancestors(repo, other)?;
                memo.insert(*other, set);
            }
            let in_other = memo
                .get(other)
                .map(|set| set.contains(candidate))
                .unwrap_or(false);
            if in_other {
                is_proper_ancestor_of_other = true;
                break;
            }
        }
        if !is_proper_ancestor_of_other {
            return Ok(Some(*candidate));
        }
    }

    Ok(None)
}
