use crate::error::ResolutionError;
use crate::token::TokenId;
use ahash::AHashMap;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::Display,
    ops::Deref,
    str::FromStr,
};

mod normalize;
mod resolver;

// Re-exporting
pub use normalize::{normalize_range, GAP_FILL_THRESHOLD};
pub use resolver::resolve_entities;

/// Type of an annotated object, as written in the annotation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum EntityType {
    Person,
    Org,
    Location,
    LocOrg,
    Project,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "Person",
            EntityType::Org => "Org",
            EntityType::Location => "Location",
            EntityType::LocOrg => "LocOrg",
            EntityType::Project => "Project",
        }
    }

    /// The output category this type collapses into.
    pub fn category(&self) -> Category {
        Category::from(*self)
    }
}

impl FromStr for EntityType {
    type Err = ResolutionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Person" => Ok(EntityType::Person),
            "Org" => Ok(EntityType::Org),
            "Location" => Ok(EntityType::Location),
            "LocOrg" => Ok(EntityType::LocOrg),
            "Project" => Ok(EntityType::Project),
            _ => Err(ResolutionError::UnknownEntityType(String::from(s))),
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three-way classification used in the tags: persons, organizations and locations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "PER")]
    Per,
    #[serde(rename = "ORG")]
    Org,
    #[serde(rename = "LOC")]
    Loc,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Per => "PER",
            Category::Org => "ORG",
            Category::Loc => "LOC",
        }
    }
}

impl From<EntityType> for Category {
    fn from(value: EntityType) -> Self {
        match value {
            EntityType::Person => Category::Per,
            EntityType::Org | EntityType::Project => Category::Org,
            EntityType::Location | EntityType::LocOrg => Category::Loc,
        }
    }
}

impl FromStr for Category {
    type Err = ResolutionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PER" => Ok(Category::Per),
            "ORG" => Ok(Category::Org),
            "LOC" => Ok(Category::Loc),
            _ => Err(ResolutionError::UnknownEntityType(String::from(s))),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a raw type tag (e.g. `"LocOrg"`) to its output category (e.g. `LOC`).
pub fn category_of(type_tag: &str) -> Result<Category, ResolutionError> {
    type_tag.parse::<EntityType>().map(Category::from)
}

/// An entity as annotated: the union of the token ids of every span it references. Candidates
/// of the same document may overlap or nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCandidate {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub token_ids: BTreeSet<TokenId>,
}

impl EntityCandidate {
    pub fn new<S, I>(entity_id: S, entity_type: EntityType, token_ids: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = TokenId>,
    {
        EntityCandidate {
            entity_id: entity_id.into(),
            entity_type,
            token_ids: token_ids.into_iter().collect(),
        }
    }
}

/// An entity after resolution. Its token ids are sorted by document position and are disjoint
/// from those of every other resolved entity of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEntity {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub token_ids: Vec<TokenId>,
}

impl ResolvedEntity {
    pub fn category(&self) -> Category {
        self.entity_type.category()
    }
}

impl Display for ResolvedEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {:?})",
            self.entity_id,
            self.category(),
            self.token_ids.iter().map(|id| id.value()).collect::<Vec<_>>()
        )
    }
}

/// The resolved entities of one document, in resolution order, with a lookup by entity id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedEntities {
    entities: Vec<ResolvedEntity>,
    by_id: AHashMap<String, usize>,
}

impl ResolvedEntities {
    pub(crate) fn push(&mut self, entity: ResolvedEntity) {
        self.by_id
            .insert(entity.entity_id.clone(), self.entities.len());
        self.entities.push(entity);
    }

    pub fn get<S: AsRef<str>>(&self, entity_id: S) -> Option<&ResolvedEntity> {
        self.by_id
            .get(entity_id.as_ref())
            .map(|i| &self.entities[*i])
    }
}

impl Deref for ResolvedEntities {
    type Target = [ResolvedEntity];

    fn deref(&self) -> &Self::Target {
        &self.entities
    }
}

impl IntoIterator for ResolvedEntities {
    type Item = ResolvedEntity;
    type IntoIter = std::vec::IntoIter<ResolvedEntity>;
    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedEntities {
    type Item = &'a ResolvedEntity;
    type IntoIter = std::slice::Iter<'a, ResolvedEntity>;
    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
