//! Vertex attributes (spec.md §3 "Vertices").
//!
//! A vertex is either a *type* vertex (schema) or a *thing* vertex
//! (instance); [`Vertex`] is the sum of the two, mirroring the way
//! [`crate::iid::VertexKind`] splits into `is_type()` and not. Grounded in
//! the teacher's row-plus-key split (`db/store/row.rs` carries the value,
//! `db/store/key.rs` carries identity) generalised to a typed attribute
//! struct rather than an opaque serialized row, since the attributes here
//! (label, scope, value type, …) are individually addressed properties
//! under `IID | infix`, not one blob.

use crate::iid::VertexIID;

/// One of the five value types an attribute type may declare (spec.md §6,
/// "Type value type" key, "single byte code").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueType {
    Boolean,
    Long,
    Double,
    String,
    Datetime,
}

impl ValueType {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Boolean => 0,
            Self::Long => 1,
            Self::Double => 2,
            Self::String => 3,
            Self::Datetime => 4,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Boolean),
            1 => Some(Self::Long),
            2 => Some(Self::Double),
            3 => Some(Self::String),
            4 => Some(Self::Datetime),
            _ => None,
        }
    }
}

/// Schema vertex: entity type, attribute type, relation type, or role type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeVertex {
    pub iid: VertexIID,
    pub label: String,
    /// Role types carry the label of their relation type as scope; every
    /// other kind leaves this `None`.
    pub scope: Option<String>,
    pub is_abstract: bool,
    pub value_type: Option<ValueType>,
    pub regex: Option<String>,
}

impl TypeVertex {
    #[must_use]
    pub fn new(iid: VertexIID, label: impl Into<String>) -> Self {
        Self {
            iid,
            label: label.into(),
            scope: None,
            is_abstract: false,
            value_type: None,
            regex: None,
        }
    }

    /// `scopedLabel` per spec.md §3: `scope ":" label` when scope is
    /// present, else `label`.
    #[must_use]
    pub fn scoped_label(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{scope}:{}", self.label),
            None => self.label.clone(),
        }
    }
}

/// Instance vertex: entity, attribute, relation, or role.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThingVertex {
    pub iid: VertexIID,
    pub type_iid: VertexIID,
    /// Set whenever this vertex's properties have been mutated this
    /// transaction; commit uses this to decide what to flush.
    pub modified: bool,
}

impl ThingVertex {
    #[must_use]
    pub const fn new(iid: VertexIID, type_iid: VertexIID) -> Self {
        Self {
            iid,
            type_iid,
            modified: false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Vertex {
    Type(TypeVertex),
    Thing(ThingVertex),
}

impl Vertex {
    #[must_use]
    pub const fn iid(&self) -> &VertexIID {
        match self {
            Self::Type(type_vertex) => &type_vertex.iid,
            Self::Thing(thing_vertex) => &thing_vertex.iid,
        }
    }

    #[must_use]
    pub const fn as_type(&self) -> Option<&TypeVertex> {
        match self {
            Self::Type(type_vertex) => Some(type_vertex),
            Self::Thing(_) => None,
        }
    }

    #[must_use]
    pub const fn as_thing(&self) -> Option<&ThingVertex> {
        match self {
            Self::Thing(thing_vertex) => Some(thing_vertex),
            Self::Type(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_label_includes_scope_only_for_role_types() {
        let mut role = TypeVertex::new(VertexIID::type_vertex(crate::iid::VertexKind::RoleType, 1), "friend");
        role.scope = Some("friendship".to_string());
        assert_eq!(role.scoped_label(), "friendship:friend");

        let entity = TypeVertex::new(VertexIID::type_vertex(crate::iid::VertexKind::EntityType, 2), "person");
        assert_eq!(entity.scoped_label(), "person");
    }
}
