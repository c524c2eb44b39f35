//! Provenance graph queries over the token ledger.
//!
//! Tokens form a DAG through `parents`. Deleted tokens simply end a walk;
//! they are not an error.

use std::collections::{BTreeMap, BTreeSet};

use restriction_engine::{Token, TokenId};

use crate::ledger::TokenLedger;

// ---------------------------------------------------------------------------
// Ancestry
// ---------------------------------------------------------------------------

/// Every token reachable through `parents` from `id`, excluding `id`
/// itself. Sorted.
pub fn ancestors(ledger: &TokenLedger, id: TokenId) -> Vec<TokenId> {
    let mut seen: BTreeSet<TokenId> = BTreeSet::new();
    let mut stack: Vec<TokenId> = ledger
        .token(id)
        .map(|t| t.parents.clone())
        .unwrap_or_default();
    while let Some(next) = stack.pop() {
        if next == id || !seen.insert(next) {
            continue;
        }
        if let Some(token) = ledger.token(next) {
            stack.extend(token.parents.iter().copied());
        }
    }
    seen.into_iter().collect()
}

/// Tokens that carried the same `original_id` as `id`, ordered by id.
/// This is the history of a single asset across process runs.
pub fn original_chain(ledger: &TokenLedger, id: TokenId) -> Vec<TokenId> {
    let Some(original) = ledger.token(id).map(|t| t.original_id) else {
        return Vec::new();
    };
    ledger
        .tokens()
        .filter(|t| t.original_id == original)
        .map(|t| t.id)
        .collect()
}

// ---------------------------------------------------------------------------
// Cycle detection
// ---------------------------------------------------------------------------

/// Detect cycles in the parent graph of `tokens`. A well-formed ledger
/// never has any; a non-empty result means corrupted lineage.
///
/// Iterative DFS with colour tracking, sorted traversal for determinism.
pub fn detect_cycles<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> Vec<Vec<TokenId>> {
    let mut adjacency: BTreeMap<TokenId, Vec<TokenId>> = BTreeMap::new();
    for token in tokens {
        let mut parents = token.parents.clone();
        parents.sort();
        adjacency.insert(token.id, parents);
    }

    const WHITE: u8 = 0;
    const GREY: u8 = 1;
    const BLACK: u8 = 2;

    let mut colour: BTreeMap<TokenId, u8> = adjacency.keys().map(|id| (*id, WHITE)).collect();
    let mut cycles: Vec<Vec<TokenId>> = Vec::new();
    let no_parents: Vec<TokenId> = Vec::new();

    for start in adjacency.keys() {
        if colour.get(start).copied().unwrap_or(WHITE) != WHITE {
            continue;
        }
        let mut stack: Vec<(TokenId, usize)> = vec![(*start, 0)];
        colour.insert(*start, GREY);

        while let Some((node, idx)) = stack.last().copied() {
            let parents = adjacency.get(&node).unwrap_or(&no_parents);
            match parents.get(idx) {
                Some(&parent) => {
                    if let Some(top) = stack.last_mut() {
                        top.1 = idx + 1;
                    }
                    match colour.get(&parent).copied().unwrap_or(WHITE) {
                        GREY => {
                            let mut cycle = vec![parent];
                            for (on_stack, _) in stack.iter().rev() {
                                cycle.push(*on_stack);
                                if *on_stack == parent {
                                    break;
                                }
                            }
                            cycles.push(cycle);
                        }
                        // parents outside the token set (deleted) are leaves
                        WHITE if adjacency.contains_key(&parent) => {
                            colour.insert(parent, GREY);
                            stack.push((parent, 0));
                        }
                        _ => {}
                    }
                }
                None => {
                    colour.insert(node, BLACK);
                    stack.pop();
                }
            }
        }
    }

    cycles
}

/// Parent/child links must agree: every listed parent that still exists
/// names the token among its children. Returns the offending
/// `(parent, child)` pairs.
pub fn find_broken_links(ledger: &TokenLedger) -> Vec<(TokenId, TokenId)> {
    let mut broken = Vec::new();
    for token in ledger.tokens() {
        for parent_id in &token.parents {
            let Some(parent) = ledger.token(*parent_id) else {
                continue;
            };
            let linked = parent
                .children
                .as_ref()
                .is_some_and(|children| children.contains(&token.id));
            if !linked {
                broken.push((*parent_id, token.id));
            }
        }
    }
    broken
}
