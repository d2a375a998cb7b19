//! Structural diff between two successive views
//!
//! Ops are meant to be applied in order to the previous view. Positions in
//! `Insert` and `Move` refer to the list as it stands when that op is applied.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::Item;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ChangeOp {
    Insert { id: String, position: usize },
    Remove { id: String },
    /// Take the item out at `from`, then put it back at `to`
    Move { id: String, from: usize, to: usize },
    /// Same identity, different content
    Update { id: String },
}

/// Compute ops turning `old` into `new`.
///
/// Removals come first. Surviving items that keep their relative order
/// (a longest increasing run of their old positions) stay put; every other
/// survivor costs one `Move`. An `Update` follows any survivor whose content
/// changed, whether it stayed put or was just moved.
pub fn diff(old: &[Item], new: &[Item]) -> Vec<ChangeOp> {
    let new_ids: HashSet<&str> = new.iter().map(|i| i.id.as_str()).collect();
    let mut ops: Vec<ChangeOp> = old
        .iter()
        .filter(|i| !new_ids.contains(i.id.as_str()))
        .map(|i| ChangeOp::Remove { id: i.id.clone() })
        .collect();

    let mut working: Vec<&str> = old
        .iter()
        .map(|i| i.id.as_str())
        .filter(|id| new_ids.contains(id))
        .collect();
    let before: HashMap<&str, &Item> = old.iter().map(|i| (i.id.as_str(), i)).collect();
    let old_pos: HashMap<&str, usize> = working.iter().enumerate().map(|(p, id)| (*id, p)).collect();

    // Survivors in target order, tagged with where they sat before
    let survivors: Vec<(usize, usize)> = new
        .iter()
        .enumerate()
        .filter_map(|(target, item)| old_pos.get(item.id.as_str()).map(|&p| (target, p)))
        .collect();
    let stable: HashSet<usize> = longest_increasing(&survivors.iter().map(|&(_, p)| p).collect::<Vec<_>>())
        .into_iter()
        .map(|k| survivors[k].0)
        .collect();

    for (target, item) in new.iter().enumerate() {
        let id = item.id.as_str();
        // Slot right after whatever was placed last
        let anchor = |working: &[&str]| {
            if target == 0 {
                0
            } else {
                let prev = new[target - 1].id.as_str();
                working.iter().position(|w| *w == prev).map_or(0, |p| p + 1)
            }
        };

        match before.get(id) {
            None => {
                let position = anchor(&working[..]);
                working.insert(position, id);
                ops.push(ChangeOp::Insert { id: id.to_string(), position });
            }
            Some(prior) => {
                if !stable.contains(&target) {
                    if let Some(from) = working.iter().position(|w| *w == id) {
                        working.remove(from);
                        let to = anchor(&working[..]);
                        working.insert(to, id);
                        if from != to {
                            ops.push(ChangeOp::Move { id: id.to_string(), from, to });
                        }
                    }
                }
                if *prior != item {
                    ops.push(ChangeOp::Update { id: id.to_string() });
                }
            }
        }
    }

    ops
}

/// Indices (into `seq`) of one longest strictly increasing subsequence
fn longest_increasing(seq: &[usize]) -> Vec<usize> {
    // tails[k] = index in seq of the smallest tail of an increasing run of length k+1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (i, &value) in seq.iter().enumerate() {
        let k = tails.partition_point(|&t| seq[t] < value);
        if k > 0 {
            prev[i] = Some(tails[k - 1]);
        }
        if k == tails.len() {
            tails.push(i);
        } else {
            tails[k] = i;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        run.push(i);
        cursor = prev[i];
    }
    run.reverse();
    run
}

/// Replay ops onto a list of ids. Used by tests and by renderers that keep
/// only ids.
pub fn apply(ids: &[String], ops: &[ChangeOp]) -> Vec<String> {
    let mut out = ids.to_vec();
    for op in ops {
        match op {
            ChangeOp::Remove { id } => out.retain(|x| x != id),
            ChangeOp::Insert { id, position } => out.insert((*position).min(out.len()), id.clone()),
            ChangeOp::Move { id, from, to } => {
                if *from < out.len() && out[*from] == *id {
                    let moved = out.remove(*from);
                    out.insert((*to).min(out.len()), moved);
                }
            }
            ChangeOp::Update { .. } => {}
        }
    }
    out
}
