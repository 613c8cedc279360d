//! spec.md §5 "Parallel producers": partitioning the starting candidates
//! across several workers and pulling round-robin must find the exact
//! same set of distinct answers as a single, unpartitioned procedure
//! iterator — only the order may differ.

use hypergraph_core::model::vertex::TypeVertex;
use hypergraph_core::prelude::*;
use hypergraph_core::storage::memory::MemoryStorage;
use hypergraph_core::traversal::{Procedure, ProcedureEdge, ProcedureVertex, ProcedureVertexId, VertexProperties};
use std::collections::{HashMap, HashSet};

fn build_procedure(person: &TypeVertex, name: &TypeVertex) -> (ProcedureVertexId, ProcedureVertexId, Procedure) {
    let v_person = ProcedureVertexId(0);
    let v_name = ProcedureVertexId(1);

    let mut vertices = HashMap::new();
    vertices.insert(
        v_person,
        ProcedureVertex::Thing(VertexKind::Entity, VertexProperties { allowed_type_iids: vec![person.iid.clone()], value_predicate: None }),
    );
    vertices.insert(
        v_name,
        ProcedureVertex::Thing(VertexKind::Attribute, VertexProperties { allowed_type_iids: vec![name.iid.clone()], value_predicate: None }),
    );

    let edges = vec![ProcedureEdge {
        step: 1,
        source: v_person,
        target: v_name,
        encoding: Encoding::Has,
        direction: hypergraph_core::iid::Direction::Forward,
        role_type: None,
        scope: None,
    }];

    (v_person, v_name, Procedure::new(vertices, edges, v_person))
}

#[test]
fn producer_partitioned_across_workers_finds_the_same_answers_as_a_single_iterator() {
    let graph = Graph::new(MemoryStorage::new(), hypergraph_core::iid::KeyGenerator::new());

    let person = graph.create_type(VertexKind::EntityType, "person", None).expect("create person type");
    let name = graph.create_type(VertexKind::AttributeType, "name", None).expect("create name type");

    let mut people = Vec::new();
    for label in [b"Alice".as_slice(), b"Bob", b"Carol", b"Dave", b"Erin"] {
        let p = graph.create_thing(VertexKind::Entity, person.iid.clone()).expect("create thing");
        let n = graph.create_attribute(&name.iid, label).expect("create name attribute");
        graph.put_out_edge(&p.iid, Encoding::Has, &n.iid, None, false).expect("put edge");
        people.push(p.iid);
    }

    let (v_person, v_name, procedure) = build_procedure(&person, &name);

    let mut single = procedure.iterator(&graph, people.clone(), vec![v_person, v_name]);
    let mut single_answers = HashSet::new();
    while let Some(answer) = single.next().expect("single iterator should not error") {
        single_answers.insert((answer.get(v_person).cloned(), answer.get(v_name).cloned()));
    }
    assert_eq!(single_answers.len(), people.len(), "every person must have exactly one name edge");

    let mut producer = procedure.producer(&graph, people.clone(), vec![v_person, v_name], 3);
    assert_eq!(producer.worker_count(), 3, "producer must honor the requested parallelisation");

    let mut producer_answers = HashSet::new();
    while let Some(answer) = producer.next().expect("producer should not error") {
        let inserted = producer_answers.insert((answer.get(v_person).cloned(), answer.get(v_name).cloned()));
        assert!(inserted, "producer must not yield the same binding twice across workers");
    }

    assert_eq!(producer_answers, single_answers, "partitioning across workers must not change the set of answers found");
}

#[test]
fn producer_with_no_starting_candidates_is_immediately_exhausted() {
    let graph = Graph::new(MemoryStorage::new(), hypergraph_core::iid::KeyGenerator::new());
    let person = graph.create_type(VertexKind::EntityType, "person", None).expect("create person type");
    let name = graph.create_type(VertexKind::AttributeType, "name", None).expect("create name type");
    let (_, _, procedure) = build_procedure(&person, &name);

    let mut producer = procedure.producer(&graph, Vec::new(), vec![], 4);
    assert!(producer.next().expect("producer should not error").is_none());
}
