//! Scenario 2 (spec.md §8.2): re-`put`ting an edge that is already
//! persisted, in a genuinely new transaction over the same storage, returns
//! an edge whose view equals the persisted one, commits as a no-op, and a
//! subsequent scan still yields exactly one edge view.

use hypergraph_core::prelude::*;
use hypergraph_core::storage::memory::MemoryStorage;
use hypergraph_core::txn::{Transaction, TransactionMode};

#[test]
fn repeated_put_of_a_persisted_edge_in_a_new_transaction_does_not_duplicate_it() {
    let mut first_txn = Transaction::open(MemoryStorage::new(), TransactionMode::Write);
    let (person, name, a, b, first_view) = {
        let graph = first_txn.graph();
        let person = graph.create_type(VertexKind::EntityType, "person", None).expect("create person type");
        let name = graph.create_type(VertexKind::AttributeType, "name", None).expect("create name type");
        let a = graph.create_thing(VertexKind::Entity, person.iid.clone()).expect("create thing");
        let b = graph.create_attribute(&name.iid, b"Alex").expect("create attribute");
        let edge = graph.put_out_edge(&a.iid, Encoding::Has, &b.iid, None, false).expect("first put");
        (person, name, a, b, edge.forward_view())
    };
    first_txn.commit().expect("first transaction should commit");
    let storage = first_txn.into_storage();

    let mut second_txn = Transaction::open(storage, TransactionMode::Write);
    let second = second_txn
        .graph()
        .put_out_edge(&a.iid, Encoding::Has, &b.iid, None, false)
        .expect("re-put over a persisted edge should succeed");
    assert_eq!(second.forward_view(), first_view, "re-put must return the same edge identity as the persisted edge");

    second_txn.commit().expect("second (no-op) commit should succeed");

    let scan = second_txn
        .graph()
        .out_edges(&a.iid, Encoding::Has, &b.iid, None, 2)
        .expect("scan should succeed");
    assert_eq!(scan.len(), 1, "exactly one edge view must survive the re-put, not two");
    assert_eq!(scan[0].to(), &b.iid);

    let _ = (person, name);
}
