//! Scenario 4 (spec.md §8.2): an edge appearing both in the buffer (via a
//! re-`put` inside a new transaction) and in storage must appear exactly
//! once in the merged, deduplicated forwardable stream — alongside any
//! edge that exists only in the buffer so far.

use hypergraph_core::prelude::*;
use hypergraph_core::storage::memory::MemoryStorage;
use hypergraph_core::txn::{Transaction, TransactionMode};

#[test]
fn a_re_put_persisted_edge_and_a_fresh_buffered_edge_each_appear_once() {
    let mut first_txn = Transaction::open(MemoryStorage::new(), TransactionMode::Write);
    let (person, name, a, b1, b2) = {
        let graph = first_txn.graph();
        let person = graph.create_type(VertexKind::EntityType, "person", None).expect("create person type");
        let name = graph.create_type(VertexKind::AttributeType, "name", None).expect("create name type");
        let a = graph.create_thing(VertexKind::Entity, person.iid.clone()).expect("create thing");
        let b1 = graph.create_attribute(&name.iid, b"Alex").expect("create attribute 1");
        let b2 = graph.create_attribute(&name.iid, b"Smith").expect("create attribute 2");
        graph.put_out_edge(&a.iid, Encoding::Has, &b1.iid, None, false).expect("persist first edge");
        graph.put_out_edge(&a.iid, Encoding::Has, &b2.iid, None, false).expect("persist second edge");
        (person, name, a, b1, b2)
    };
    first_txn.commit().expect("first transaction should commit");
    let storage = first_txn.into_storage();

    let mut second_txn = Transaction::open(storage, TransactionMode::Write);
    let b3 = {
        let graph = second_txn.graph();
        // Re-put of an already-persisted edge: must collapse, not duplicate.
        graph.put_out_edge(&a.iid, Encoding::Has, &b1.iid, None, false).expect("re-put persisted edge");
        // A genuinely new, still-buffered-only edge.
        let b3 = graph.create_attribute(&name.iid, b"Doe").expect("create attribute 3");
        graph.put_out_edge(&a.iid, Encoding::Has, &b3.iid, None, false).expect("put fresh edge");
        b3
    };

    let scan = second_txn
        .graph()
        .out_edges(&a.iid, Encoding::Has, &VertexIID::thing_vertex(VertexKind::Attribute, name.iid.type_id(), 0), None, 2)
        .expect("scan should succeed");

    let targets: std::collections::HashSet<_> = scan.iter().map(|e| e.to().clone()).collect();
    assert_eq!(scan.len(), 3, "merged stream must hold exactly 3 distinct edges, not 4");
    assert!(targets.contains(&b1.iid));
    assert!(targets.contains(&b2.iid));
    assert!(targets.contains(&b3.iid));

    let _ = person;
}
