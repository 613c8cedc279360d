//! Per-transaction buffered+persisted vertex overlay (spec.md §4.3).
//!
//! Keyed two ways: by IID directly, and by `scopedLabel` for type vertices
//! via the `TYPE_INDEX` key. Grounded in the teacher's store-registry overlay
//! shape (`db/registry.rs`'s `StoreHandle` wrapping row+index access behind
//! one handle) generalised from a static registry to a per-transaction one
//! holding real buffered state rather than just borrowed thread-locals.

use crate::{
    error::{ErrorOrigin, GraphError, GraphResult},
    iid::{KeyGenerator, VertexIID, VertexKind},
    model::vertex::{ThingVertex, TypeVertex, ValueType, Vertex},
    storage::Storage,
};
use std::collections::{HashMap, HashSet};

const LABEL_INFIX: u8 = 0xF0;
const SCOPE_INFIX: u8 = 0xF1;
const ABSTRACT_INFIX: u8 = 0xF2;
const VALUETYPE_INFIX: u8 = 0xF3;
const REGEX_INFIX: u8 = 0xF4;
const TYPE_INDEX_PREFIX: u8 = 0xFF;

fn property_key(iid: &VertexIID, infix: u8) -> Vec<u8> {
    let mut key = iid.as_bytes().to_vec();
    key.push(infix);
    key
}

fn type_index_key(scoped_label: &str) -> Vec<u8> {
    let mut key = vec![TYPE_INDEX_PREFIX];
    key.extend_from_slice(scoped_label.as_bytes());
    key
}

/// Buffered mutable state for one type vertex's label/scope/value-type
/// properties, tracked separately from [`TypeVertex`] so a rename can be
/// staged and then applied atomically.
pub struct VertexCatalogue {
    buffered_vertices: HashMap<VertexIID, Vertex>,
    /// Subset of `buffered_vertices` whose IID cannot yet be present in
    /// storage (spec.md §4.4 "new vertex"), used by the adjacency layer to
    /// pick its posture.
    new_vertices: HashSet<VertexIID>,
    buffered_label_index: HashMap<String, VertexIID>,
    deleted: HashSet<VertexIID>,
    /// Scoped label a deleted type vertex held at the moment of deletion,
    /// captured up front because the vertex record itself is dropped from
    /// the buffer immediately (spec.md §8.2 "Delete completeness").
    deleted_type_labels: HashMap<VertexIID, String>,
    key_gen: KeyGenerator,
}

impl VertexCatalogue {
    #[must_use]
    pub fn new(key_gen: KeyGenerator) -> Self {
        Self {
            buffered_vertices: HashMap::new(),
            new_vertices: HashSet::new(),
            buffered_label_index: HashMap::new(),
            deleted: HashSet::new(),
            deleted_type_labels: HashMap::new(),
            key_gen,
        }
    }

    #[must_use]
    pub fn is_new(&self, iid: &VertexIID) -> bool {
        self.new_vertices.contains(iid)
    }

    #[must_use]
    pub fn is_deleted(&self, iid: &VertexIID) -> bool {
        self.deleted.contains(iid)
    }

    /// Buffered vertex count, read-only introspection for
    /// [`crate::txn::diagnostics`].
    #[must_use]
    pub fn buffered_vertex_count(&self) -> u64 {
        self.buffered_vertices.len() as u64
    }

    /// Every buffered thing vertex currently assigned to `type_iid`. Used
    /// by traversal's starting-vertex materialization to supplement a
    /// storage prefix scan with instances created this transaction, which
    /// the scan cannot yet see (spec.md §4.6).
    pub(crate) fn buffered_things_of_type(&self, type_iid: &VertexIID) -> Vec<VertexIID> {
        self.buffered_vertices
            .values()
            .filter_map(Vertex::as_thing)
            .filter(|thing| &thing.type_iid == type_iid)
            .map(|thing| thing.iid.clone())
            .collect()
    }

    fn check_label_collision<S: Storage>(
        &self,
        storage: &S,
        scoped_label: &str,
        except: Option<&VertexIID>,
    ) -> GraphResult<()> {
        if let Some(existing) = self.type_by_label(storage, scoped_label)? {
            if Some(&existing.iid) != except {
                return Err(GraphError::illegal_schema_mutation(format!(
                    "scoped label {scoped_label:?} is already assigned to {:?}",
                    existing.iid
                )));
            }
        }
        Ok(())
    }

    /// Create a buffered type vertex (spec.md §3 "Type vertex").
    pub fn create_type<S: Storage>(
        &mut self,
        storage: &S,
        kind: VertexKind,
        label: impl Into<String>,
        scope: Option<String>,
    ) -> GraphResult<TypeVertex> {
        let label = label.into();
        let mut vertex = TypeVertex::new(VertexIID::type_vertex(kind, 0), label);
        vertex.scope = scope;
        self.check_label_collision(storage, &vertex.scoped_label(), None)?;

        let type_id = self.key_gen.next_type_id(kind);
        vertex.iid = VertexIID::type_vertex(kind, type_id);

        self.buffered_label_index
            .insert(vertex.scoped_label(), vertex.iid.clone());
        self.new_vertices.insert(vertex.iid.clone());
        self.buffered_vertices
            .insert(vertex.iid.clone(), Vertex::Type(vertex.clone()));
        Ok(vertex)
    }

    /// Create a buffered thing vertex with a freshly generated instance id.
    pub fn create_thing(&mut self, kind: VertexKind, type_iid: VertexIID) -> ThingVertex {
        assert!(
            !kind.is_content_addressed(),
            "attribute vertices must go through create_attribute"
        );
        let instance_id = self.key_gen.next_instance_id(kind, type_iid.type_id());
        let vertex = ThingVertex::new(
            VertexIID::thing_vertex(kind, type_iid.type_id(), instance_id),
            type_iid,
        );
        self.new_vertices.insert(vertex.iid.clone());
        self.buffered_vertices
            .insert(vertex.iid.clone(), Vertex::Thing(vertex.clone()));
        vertex
    }

    /// Create, or idempotently rediscover, a content-addressed attribute
    /// vertex (spec.md §3: "two attribute writes of the same value and type
    /// collapse to one vertex").
    pub fn create_attribute<S: Storage>(
        &mut self,
        storage: &S,
        type_iid: &VertexIID,
        value_bytes: &[u8],
    ) -> GraphResult<ThingVertex> {
        let iid = VertexIID::attribute_vertex(type_iid.type_id(), value_bytes);
        if let Some(existing) = self.get(storage, &iid)? {
            return Ok(existing
                .as_thing()
                .cloned()
                .expect("attribute_vertex IID always addresses a thing vertex"));
        }
        let vertex = ThingVertex::new(iid.clone(), type_iid.clone());
        self.new_vertices.insert(iid.clone());
        self.buffered_vertices
            .insert(iid, Vertex::Thing(vertex.clone()));
        Ok(vertex)
    }

    /// Look up a vertex by IID, consulting the buffer before storage.
    pub fn get<S: Storage>(&self, storage: &S, iid: &VertexIID) -> GraphResult<Option<Vertex>> {
        if self.deleted.contains(iid) {
            return Ok(None);
        }
        if let Some(vertex) = self.buffered_vertices.get(iid) {
            return Ok(Some(vertex.clone()));
        }
        self.load_persisted(storage, iid)
    }

    fn load_persisted<S: Storage>(
        &self,
        storage: &S,
        iid: &VertexIID,
    ) -> GraphResult<Option<Vertex>> {
        let exists = storage
            .get(iid.as_bytes())
            .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?
            .is_some();
        if !exists {
            return Ok(None);
        }

        if iid.kind().is_type() {
            let label = self.read_utf8_property(storage, iid, LABEL_INFIX)?.unwrap_or_default();
            let scope = self.read_utf8_property(storage, iid, SCOPE_INFIX)?;
            let is_abstract = storage
                .get(&property_key(iid, ABSTRACT_INFIX))
                .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?
                .is_some();
            let value_type = storage
                .get(&property_key(iid, VALUETYPE_INFIX))
                .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?
                .and_then(|bytes| bytes.first().copied())
                .and_then(ValueType::from_code);
            let regex = self.read_utf8_property(storage, iid, REGEX_INFIX)?;

            Ok(Some(Vertex::Type(TypeVertex {
                iid: iid.clone(),
                label,
                scope,
                is_abstract,
                value_type,
                regex,
            })))
        } else {
            Ok(Some(Vertex::Thing(ThingVertex::new(
                iid.clone(),
                VertexIID::type_vertex(type_kind_of(iid.kind()), iid.type_id()),
            ))))
        }
    }

    fn read_utf8_property<S: Storage>(
        &self,
        storage: &S,
        iid: &VertexIID,
        infix: u8,
    ) -> GraphResult<Option<String>> {
        let raw = storage
            .get(&property_key(iid, infix))
            .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
        match raw {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| GraphError::new(
                    crate::error::ErrorClass::Corruption,
                    ErrorOrigin::VertexCatalogue,
                    "non-UTF-8 bytes in a UTF-8 property key",
                )),
            None => Ok(None),
        }
    }

    /// Look up a type vertex by its scoped label (spec.md §4.3), buffer
    /// first then `TYPE_INDEX`.
    pub fn type_by_label<S: Storage>(
        &self,
        storage: &S,
        scoped_label: &str,
    ) -> GraphResult<Option<TypeVertex>> {
        if let Some(iid) = self.buffered_label_index.get(scoped_label) {
            return Ok(self.get(storage, iid)?.and_then(|vertex| vertex.as_type().cloned()));
        }
        let raw = storage
            .get(&type_index_key(scoped_label))
            .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
        let Some(raw_iid) = raw else {
            return Ok(None);
        };
        let iid = VertexIID::try_from_bytes(&raw_iid).map_err(|message| {
            GraphError::new(crate::error::ErrorClass::Corruption, ErrorOrigin::VertexCatalogue, message)
        })?;
        Ok(self.get(storage, &iid)?.and_then(|vertex| vertex.as_type().cloned()))
    }

    /// Rename (and/or re-scope) a type vertex's label (spec.md §4.3): a
    /// four-step transaction — write new label property, delete old index
    /// entry, write new index entry, update in-memory label — staged so a
    /// concurrent reader inside the same transaction observes either the
    /// old pair or the new one, never a split state. Collision rejects with
    /// `IllegalSchemaMutation` before anything is staged (spec.md §8.2
    /// scenario 1).
    pub fn rename_type<S: Storage>(
        &mut self,
        storage: &S,
        iid: &VertexIID,
        new_label: impl Into<String>,
        new_scope: Option<String>,
    ) -> GraphResult<()> {
        let new_label = new_label.into();
        let Some(mut type_vertex) = self
            .get(storage, iid)?
            .and_then(|vertex| vertex.as_type().cloned())
        else {
            return Err(GraphError::invalid_state(
                ErrorOrigin::VertexCatalogue,
                format!("rename_type called on non-existent or non-type vertex {iid:?}"),
            ));
        };

        let old_scoped_label = type_vertex.scoped_label();
        let candidate = TypeVertex {
            label: new_label.clone(),
            scope: new_scope.clone(),
            ..type_vertex.clone()
        };
        let new_scoped_label = candidate.scoped_label();

        if new_scoped_label != old_scoped_label {
            self.check_label_collision(storage, &new_scoped_label, Some(iid))?;
        }

        // Stage all four steps together in the buffer: nothing here is
        // individually observable until this function returns, so there is
        // no window where the index reflects only part of the rename.
        type_vertex.label = new_label;
        type_vertex.scope = new_scope;
        self.buffered_label_index.remove(&old_scoped_label);
        self.buffered_label_index
            .insert(new_scoped_label, iid.clone());
        self.buffered_vertices
            .insert(iid.clone(), Vertex::Type(type_vertex));
        Ok(())
    }

    /// Mark a vertex deleted. Actual key removal happens at [`Self::commit`].
    pub fn delete<S: Storage>(&mut self, storage: &S, iid: &VertexIID) -> GraphResult<()> {
        if let Some(type_vertex) = self.get(storage, iid)?.and_then(|vertex| vertex.as_type().cloned()) {
            let scoped_label = type_vertex.scoped_label();
            self.buffered_label_index.remove(&scoped_label);
            self.deleted_type_labels.insert(iid.clone(), scoped_label);
        }
        self.buffered_vertices.remove(iid);
        self.new_vertices.remove(iid);
        self.deleted.insert(iid.clone());
        Ok(())
    }

    /// Flush buffered vertex properties and index entries into storage.
    /// Deleted vertices have every key under their IID prefix removed along
    /// with their type-index entry, if any (spec.md §8.2 "Delete
    /// completeness").
    pub fn commit<S: Storage>(&mut self, storage: &mut S) -> GraphResult<()> {
        for iid in self.deleted.drain().collect::<Vec<_>>() {
            let mut scan = storage
                .iterate(iid.as_bytes())
                .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
            let mut keys_under_prefix = Vec::new();
            while let Some(entry) = scan.next() {
                keys_under_prefix.push(entry.key);
            }
            for key in keys_under_prefix {
                storage
                    .delete(&key)
                    .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
            }
            if let Some(scoped_label) = self.deleted_type_labels.remove(&iid) {
                storage
                    .delete(&type_index_key(&scoped_label))
                    .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
            }
        }

        for (iid, vertex) in self.buffered_vertices.drain().collect::<Vec<_>>() {
            storage
                .put(iid.as_bytes().to_vec(), Vec::new())
                .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
            if let Vertex::Type(type_vertex) = &vertex {
                storage
                    .put(property_key(&iid, LABEL_INFIX), type_vertex.label.clone().into_bytes())
                    .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
                if let Some(scope) = &type_vertex.scope {
                    storage
                        .put(property_key(&iid, SCOPE_INFIX), scope.clone().into_bytes())
                        .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
                }
                if type_vertex.is_abstract {
                    storage
                        .put(property_key(&iid, ABSTRACT_INFIX), Vec::new())
                        .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
                }
                if let Some(value_type) = type_vertex.value_type {
                    storage
                        .put(property_key(&iid, VALUETYPE_INFIX), vec![value_type.code()])
                        .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
                }
                if let Some(regex) = &type_vertex.regex {
                    storage
                        .put(property_key(&iid, REGEX_INFIX), regex.clone().into_bytes())
                        .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
                }
                storage
                    .put(type_index_key(&type_vertex.scoped_label()), iid.as_bytes().to_vec())
                    .map_err(|err| GraphError::storage_failure(ErrorOrigin::VertexCatalogue, err))?;
            }
        }
        self.new_vertices.clear();
        self.buffered_label_index.clear();
        Ok(())
    }

}

fn type_kind_of(kind: VertexKind) -> VertexKind {
    match kind {
        VertexKind::Entity => VertexKind::EntityType,
        VertexKind::Attribute => VertexKind::AttributeType,
        VertexKind::Relation => VertexKind::RelationType,
        VertexKind::Role => VertexKind::RoleType,
        type_kind => type_kind,
    }
}
