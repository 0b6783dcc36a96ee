use crate::bilou::{Prefix, TagLabel, TaggedToken};
use crate::entity::ResolvedEntity;
use crate::error::ResolutionError;
use crate::token::{Token, TokenIndex};

/// Tags every token of a document. Tokens covered by no entity are tagged `O`; the tokens of an
/// entity of `n` tokens are tagged `U` when `n == 1` and `B`, `I`..., `L` otherwise.
///
/// * `tokens`: The tokens of the document, in document order.
/// * `index`: Index built from `tokens`.
/// * `entities`: The resolved entities of the same document.
pub fn encode_entities<'a, I>(
    tokens: &[Token],
    index: &TokenIndex,
    entities: I,
) -> Result<Vec<TaggedToken>, ResolutionError>
where
    I: IntoIterator<Item = &'a ResolvedEntity>,
{
    let mut tags = vec![TagLabel::Outside; tokens.len()];
    for entity in entities {
        let category = entity.category();
        let n = entity.token_ids.len();
        for (i, id) in entity.token_ids.iter().enumerate() {
            let position = index.position_of(*id)?;
            // An index built from another token list can point past the end.
            let tag = tags
                .get_mut(position)
                .ok_or(ResolutionError::UnknownTokenId(*id))?;
            *tag = TagLabel::Entity(Prefix::for_position(i, n), category);
        }
    }
    Ok(tags
        .into_iter()
        .zip(tokens.iter().cloned())
        .map(|(tag, token)| TaggedToken::new(tag, token))
        .collect())
}
