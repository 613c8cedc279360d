//! Scenario 1 (spec.md §8.2): a rename that collides with an existing
//! scoped label is rejected, and the prior state of both vertices and the
//! label index survives the rejected attempt untouched.

use hypergraph_core::prelude::*;
use hypergraph_core::storage::memory::MemoryStorage;

#[test]
fn rename_onto_an_existing_label_is_rejected_and_leaves_both_vertices_intact() {
    let graph = Graph::new(MemoryStorage::new(), hypergraph_core::iid::KeyGenerator::new());

    let person = graph
        .create_type(VertexKind::EntityType, "person", None)
        .expect("creating person should succeed");
    let dog = graph
        .create_type(VertexKind::EntityType, "dog", None)
        .expect("creating dog should succeed");

    let err = graph
        .rename_type(&dog.iid, "person", None)
        .expect_err("renaming dog to an already-taken label must fail");
    assert!(err.is_illegal_schema_mutation(), "collision must surface as IllegalSchemaMutation, got {err:?}");

    let resolved = graph
        .type_by_label("person")
        .expect("label lookup should succeed")
        .expect("label \"person\" must still resolve to something");
    assert_eq!(resolved.iid, person.iid, "the label index must still point at the original person vertex");

    let dog_after = graph
        .vertex(&dog.iid)
        .expect("vertex lookup should succeed")
        .expect("dog vertex must still exist")
        .as_type()
        .cloned()
        .expect("dog is a type vertex");
    assert_eq!(dog_after.label, "dog", "the rejected rename must not have mutated dog's label");
}
