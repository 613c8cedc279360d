//! Vertex-kind prefix byte.
//!
//! One byte names whether a vertex is a type (schema) vertex or a thing
//! (instance) vertex, and which of the four shapes it is. Tag values are
//! part of the on-disk format — do not reorder (mirrors the teacher's
//! `// Variant tags (do not reorder)` convention in `key/mod.rs`).

use std::fmt;

pub type PrefixByte = u8;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum VertexKind {
    EntityType,
    AttributeType,
    RelationType,
    RoleType,
    Entity,
    Attribute,
    Relation,
    Role,
}

impl VertexKind {
    // ── Prefix tags (do not reorder) ─────────────────
    const TAG_ENTITY_TYPE: PrefixByte = 0;
    const TAG_ATTRIBUTE_TYPE: PrefixByte = 1;
    const TAG_RELATION_TYPE: PrefixByte = 2;
    const TAG_ROLE_TYPE: PrefixByte = 3;
    const TAG_ENTITY: PrefixByte = 4;
    const TAG_ATTRIBUTE: PrefixByte = 5;
    const TAG_RELATION: PrefixByte = 6;
    const TAG_ROLE: PrefixByte = 7;

    #[must_use]
    pub const fn tag(self) -> PrefixByte {
        match self {
            Self::EntityType => Self::TAG_ENTITY_TYPE,
            Self::AttributeType => Self::TAG_ATTRIBUTE_TYPE,
            Self::RelationType => Self::TAG_RELATION_TYPE,
            Self::RoleType => Self::TAG_ROLE_TYPE,
            Self::Entity => Self::TAG_ENTITY,
            Self::Attribute => Self::TAG_ATTRIBUTE,
            Self::Relation => Self::TAG_RELATION,
            Self::Role => Self::TAG_ROLE,
        }
    }

    #[must_use]
    pub const fn from_tag(tag: PrefixByte) -> Option<Self> {
        Some(match tag {
            Self::TAG_ENTITY_TYPE => Self::EntityType,
            Self::TAG_ATTRIBUTE_TYPE => Self::AttributeType,
            Self::TAG_RELATION_TYPE => Self::RelationType,
            Self::TAG_ROLE_TYPE => Self::RoleType,
            Self::TAG_ENTITY => Self::Entity,
            Self::TAG_ATTRIBUTE => Self::Attribute,
            Self::TAG_RELATION => Self::Relation,
            Self::TAG_ROLE => Self::Role,
            _ => return None,
        })
    }

    /// Whether this kind names a type (schema) vertex as opposed to a thing.
    #[must_use]
    pub const fn is_type(self) -> bool {
        matches!(
            self,
            Self::EntityType | Self::AttributeType | Self::RelationType | Self::RoleType
        )
    }

    /// Whether instances of this kind are content-addressed (attribute values
    /// collapse to one vertex per distinct `(type, value)` pair).
    #[must_use]
    pub const fn is_content_addressed(self) -> bool {
        matches!(self, Self::Attribute)
    }

    /// The thing kind instantiated by this type kind, e.g. `EntityType` →
    /// `Entity`. `None` when `self` is already a thing kind. Used by the
    /// traversal executor to build a lookahead template vertex from a
    /// procedure vertex's allowed type.
    #[must_use]
    pub const fn instance_kind(self) -> Option<Self> {
        Some(match self {
            Self::EntityType => Self::Entity,
            Self::AttributeType => Self::Attribute,
            Self::RelationType => Self::Relation,
            Self::RoleType => Self::Role,
            Self::Entity | Self::Attribute | Self::Relation | Self::Role => return None,
        })
    }
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EntityType => "entity_type",
            Self::AttributeType => "attribute_type",
            Self::RelationType => "relation_type",
            Self::RoleType => "role_type",
            Self::Entity => "entity",
            Self::Attribute => "attribute",
            Self::Relation => "relation",
            Self::Role => "role",
        };
        write!(f, "{label}")
    }
}
