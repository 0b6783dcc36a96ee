use crate::entity::{
    normalize_range, EntityCandidate, EntityType, ResolvedEntities, ResolvedEntity,
};
use crate::error::ResolutionError;
use crate::token::{TokenId, TokenIndex};
use ahash::AHashSet;
use std::{cmp::Reverse, collections::BTreeSet, mem::replace};
use tracing::{debug, trace};

/// Entity being built during the sweep. It absorbs every following candidate that intersects it.
struct Accumulator {
    entity_id: String,
    entity_type: EntityType,
    /// Normalized identifiers, sorted by value.
    ids: Vec<TokenId>,
    /// Identifiers referenced by the annotations, as opposed to the ones added by gap filling.
    referenced: BTreeSet<TokenId>,
}

impl From<EntityCandidate> for Accumulator {
    fn from(value: EntityCandidate) -> Self {
        Accumulator {
            entity_id: value.entity_id,
            entity_type: value.entity_type,
            ids: normalize_range(value.token_ids.iter().copied()),
            referenced: value.token_ids,
        }
    }
}

impl Accumulator {
    fn intersects(&self, candidate: &EntityCandidate) -> bool {
        candidate
            .token_ids
            .iter()
            .any(|id| self.ids.binary_search(id).is_ok())
    }

    /// Absorbs `candidate`. The id and the type of the accumulator are kept.
    fn merge(&mut self, candidate: EntityCandidate) {
        trace!(
            into = %self.entity_id,
            merged = %candidate.entity_id,
            "merging intersecting entities"
        );
        let union = self.ids.iter().chain(candidate.token_ids.iter()).copied();
        self.ids = normalize_range(union);
        self.referenced.extend(candidate.token_ids);
    }

    /// Orders the identifiers by document position and pushes the entity into `resolved`.
    /// Identifiers already claimed by a previous entity are left out, and an entity left with no
    /// identifier at all is dropped.
    fn finalize(
        self,
        index: &TokenIndex,
        claimed: &mut AHashSet<TokenId>,
        resolved: &mut ResolvedEntities,
    ) -> Result<(), ResolutionError> {
        let mut positioned = Vec::with_capacity(self.ids.len());
        for id in self.ids {
            match index.get(id) {
                Some(position) => positioned.push((position, id)),
                None if self.referenced.contains(&id) => {
                    return Err(ResolutionError::UnknownTokenId(id))
                }
                // Gap filling can produce identifiers the document does not have.
                None => continue,
            }
        }
        positioned.sort_unstable_by_key(|(position, _)| *position);
        let mut token_ids = Vec::with_capacity(positioned.len());
        for (_, id) in positioned {
            if claimed.insert(id) {
                token_ids.push(id);
            }
        }
        if token_ids.is_empty() {
            debug!(entity = %self.entity_id, "entity covered by previous entities, dropped");
            return Ok(());
        }
        resolved.push(ResolvedEntity {
            entity_id: self.entity_id,
            entity_type: self.entity_type,
            token_ids,
        });
        Ok(())
    }
}

/// Resolves the (possibly overlapping) candidates of a document into disjoint entities.
///
/// Candidates are swept by smallest token id, the widest first when two start together. Each
/// candidate intersecting the entity being built is merged into it: the first candidate seen
/// gives its id and type to the merged entity. The resulting entities are gap filled (see
/// [`normalize_range`]) and their identifiers are ordered by document position.
///
/// * `candidates`: The annotated entities of the document.
/// * `index`: Index of the tokens of the same document.
pub fn resolve_entities<I>(
    candidates: I,
    index: &TokenIndex,
) -> Result<ResolvedEntities, ResolutionError>
where
    I: IntoIterator<Item = EntityCandidate>,
{
    let mut sorted: Vec<EntityCandidate> = candidates
        .into_iter()
        .filter(|c| !c.token_ids.is_empty())
        .collect();
    // Stable sort: candidates with the same bounds keep their input order.
    sorted.sort_by_key(|c| {
        (
            c.token_ids.first().copied(),
            Reverse(c.token_ids.last().copied()),
        )
    });

    let mut resolved = ResolvedEntities::default();
    let mut claimed = AHashSet::new();
    let mut candidates_iter = sorted.into_iter();
    let Some(first) = candidates_iter.next() else {
        return Ok(resolved);
    };
    let mut accumulator = Accumulator::from(first);
    for candidate in candidates_iter {
        if accumulator.intersects(&candidate) {
            accumulator.merge(candidate);
        } else {
            let done = replace(&mut accumulator, Accumulator::from(candidate));
            done.finalize(index, &mut claimed, &mut resolved)?;
        }
    }
    accumulator.finalize(index, &mut claimed, &mut resolved)?;
    Ok(resolved)
}
