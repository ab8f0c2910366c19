use std::collections::BTreeSet;

use super::*;
use itertools::Itertools;

fn apply(ops: &[Operation<TestPrefix>]) -> Option<(LpmTrie<TestPrefix>, BTreeSet<TestPrefix>)> {
    let mut trie = LpmTrie::new();
    let mut set = BTreeSet::new();
    for op in ops {
        match *op {
            Operation::Add(p) => {
                if trie.insert(p) != set.insert(p) {
                    return None;
                }
            }
            Operation::Remove(p) => {
                if trie.remove(&p).is_some() != set.remove(&p) {
                    return None;
                }
            }
        }
        trie.check_invariants().ok()?;
    }
    Some((trie, set))
}

qc!(new, _new);
fn _new(list: Vec<TestPrefix>) -> bool {
    let trie: LpmTrie<TestPrefix> = list.iter().copied().collect();
    let set: BTreeSet<TestPrefix> = list.into_iter().collect();

    // pre-order is the same as sorting by address, then length.
    trie.check_invariants().is_ok()
        && trie.count() == set.len()
        && trie.iter().eq(set.iter())
}

qc!(new_mods, _new_mods);
fn _new_mods(ops: Vec<Operation<TestPrefix>>) -> bool {
    match apply(&ops) {
        Some((trie, set)) => trie.count() == set.len() && trie.dump().into_iter().eq(set.iter()),
        None => false,
    }
}

qc!(shape_independent_of_history, _shape_independent_of_history);
fn _shape_independent_of_history(ops: Vec<Operation<TestPrefix>>) -> bool {
    let Some((trie, set)) = apply(&ops) else {
        return false;
    };
    let fresh: LpmTrie<TestPrefix> = set.into_iter().rev().collect();
    format!("{trie:?}") == format!("{fresh:?}") && trie == fresh
}

qc!(idempotent_insert, _idempotent_insert);
fn _idempotent_insert((list, again): (Vec<TestPrefix>, TestPrefix)) -> bool {
    let mut trie: LpmTrie<TestPrefix> = list.into_iter().collect();
    trie.insert(again);
    let before = format!("{trie:?}");
    let count = trie.count();
    !trie.insert(again) && format!("{trie:?}") == before && trie.count() == count
}

qc!(longest_prefix_match, _longest_prefix_match);
fn _longest_prefix_match((list, needle): (Vec<TestPrefix>, TestPrefix)) -> bool {
    let trie: LpmTrie<TestPrefix> = list.iter().copied().collect();
    let expected: Vec<&TestPrefix> = list
        .iter()
        .filter(|p| p.contains(&needle))
        .unique()
        .sorted_by_key(|p| p.1)
        .collect();
    trie.longest_match(&needle) == expected.last().copied()
        && trie.longest_prefix_match(&needle) == expected
}

qc!(get, _get);
fn _get((list, query): (Vec<TestPrefix>, TestPrefix)) -> bool {
    let trie: LpmTrie<TestPrefix> = list.iter().copied().collect();
    let set: BTreeSet<TestPrefix> = list.into_iter().collect();
    if !set.contains(&query) {
        return trie.get(&query, false).is_none()
            && trie.get(&query, true).is_none()
            && !trie.contains(&query);
    }
    let more_specifics: Vec<&TestPrefix> = set.iter().filter(|p| query.contains(p)).collect();
    trie.get(&query, false) == Some(vec![&query])
        && trie.get(&query, true) == Some(more_specifics)
        && trie.contains(&query)
}

qc!(remove_reverts_insert, _remove_reverts_insert);
fn _remove_reverts_insert((list, extra): (Vec<TestPrefix>, TestPrefix)) -> bool {
    let mut trie: LpmTrie<TestPrefix> = list.into_iter().filter(|p| *p != extra).collect();
    let before = format!("{trie:?}");
    trie.insert(extra)
        && trie.remove(&extra) == Some(extra)
        && trie.check_invariants().is_ok()
        && format!("{trie:?}") == before
}
