//! Clause correction
//!
//! In the treebank a clause-linking conjunction often hangs off the clause
//! it follows. Once words are in reference order, a conjunction whose
//! clause differs from the next word's clause is moved into the next
//! word's clause and phrase.
//!
//! Pairs are visited from the end backwards, so a conjunction is compared
//! with its successor after that successor has itself been corrected.
//! Chains of leading conjunctions therefore all land in the clause they
//! introduce, and a second pass changes nothing. A conjunction in last
//! position has no successor and is left alone.

use crate::word::Word;

/// Reassign misattached conjunctions; returns how many words moved
pub fn correct_clauses(words: &mut [Word]) -> usize {
    let mut corrected = 0;

    for i in (0..words.len().saturating_sub(1)).rev() {
        let (head, tail) = words.split_at_mut(i + 1);
        let (current, next) = (&mut head[i], &tail[0]);

        if current.is_conjunction() && current.clause_id != next.clause_id {
            tracing::debug!(
                "Moving conjunction at {:?} from clause {:?} to {:?}",
                current.reference,
                current.clause_id,
                next.clause_id
            );
            current.clause_id = next.clause_id.clone();
            current.phrase_id = next.phrase_id.clone();
            corrected += 1;
        }
    }

    corrected
}
