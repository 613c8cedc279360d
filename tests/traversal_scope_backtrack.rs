//! Scenario 5 (spec.md §8.2): a procedure that closes a relation through
//! the same player twice (a reflexive role-player pair) before moving on
//! to a second relation must still find its answer. Getting this right
//! depends on [`hypergraph_core::traversal::scope::ScopeTracker::clear`]
//! running at exactly the right backtrack point — that specific property
//! (clearing lets a fresh role instance bind where a stale one would be
//! rejected) is unit-tested directly in `src/traversal/scope.rs`; this
//! test exercises the whole scoped, multi-step backtracking search the
//! way a real procedure would run it, end to end over the overlay graph.
//!
//! Schema: `person` owns `lastname`, owns `name`; `friendship` relates
//! `friend`. Data: two persons X and Y, both with `lastname = "Smith"`;
//! X has `name = "Alex"`, Y has `name = "John"`. `refl` is a friendship
//! where X plays `friend` against itself (two distinct role instances);
//! `f1` is a friendship where X plays `friend` against Y.
//!
//! Procedure: `lastname("Smith") -> x -> refl(friend:x, friend:x) -> x ->
//! f1(friend:x, friend:y) -> y -> name("John")`.

use hypergraph_core::prelude::*;
use hypergraph_core::traversal::{Procedure, ProcedureEdge, ProcedureVertex, ProcedureVertexId, ScopeTemplate, ValuePredicate, VertexProperties};
use std::collections::HashMap;

#[test]
fn closing_a_reflexive_relation_twice_does_not_block_reaching_the_second_relation() {
    let graph = Graph::new(hypergraph_core::storage::memory::MemoryStorage::new(), hypergraph_core::iid::KeyGenerator::new());

    let person = graph.create_type(VertexKind::EntityType, "person", None).expect("create person type");
    let lastname = graph.create_type(VertexKind::AttributeType, "lastname", None).expect("create lastname type");
    let name = graph.create_type(VertexKind::AttributeType, "name", None).expect("create name type");
    let friendship = graph.create_type(VertexKind::RelationType, "friendship", None).expect("create friendship type");
    let friend = graph
        .create_type(VertexKind::RoleType, "friend", Some("friendship".to_string()))
        .expect("create friend role type");

    let x = graph.create_thing(VertexKind::Entity, person.iid.clone()).expect("create thing");
    let y = graph.create_thing(VertexKind::Entity, person.iid.clone()).expect("create thing");

    let smith = graph.create_attribute(&lastname.iid, b"Smith").expect("create lastname attribute");
    let alex = graph.create_attribute(&name.iid, b"Alex").expect("create name attribute (Alex)");
    let john = graph.create_attribute(&name.iid, b"John").expect("create name attribute (John)");

    graph.put_out_edge(&x.iid, Encoding::Has, &smith.iid, None, false).expect("x owns lastname");
    graph.put_out_edge(&y.iid, Encoding::Has, &smith.iid, None, false).expect("y owns lastname");
    graph.put_out_edge(&x.iid, Encoding::Has, &alex.iid, None, false).expect("x owns name");
    graph.put_out_edge(&y.iid, Encoding::Has, &john.iid, None, false).expect("y owns name");

    let refl = graph.create_thing(VertexKind::Relation, friendship.iid.clone()).expect("create thing");
    let f1 = graph.create_thing(VertexKind::Relation, friendship.iid.clone()).expect("create thing");

    for _ in 0..2 {
        let role_instance = graph.create_thing(VertexKind::Role, friend.iid.clone()).expect("create thing");
        graph
            .put_out_edge(&refl.iid, Encoding::RolePlayer, &x.iid, Some((friend.iid.clone(), role_instance.iid.clone())), false)
            .expect("refl plays x as friend");
    }
    let ri_x = graph.create_thing(VertexKind::Role, friend.iid.clone()).expect("create thing");
    let ri_y = graph.create_thing(VertexKind::Role, friend.iid.clone()).expect("create thing");
    graph
        .put_out_edge(&f1.iid, Encoding::RolePlayer, &x.iid, Some((friend.iid.clone(), ri_x.iid.clone())), false)
        .expect("f1 plays x as friend");
    graph
        .put_out_edge(&f1.iid, Encoding::RolePlayer, &y.iid, Some((friend.iid.clone(), ri_y.iid.clone())), false)
        .expect("f1 plays y as friend");

    let v_lastname = ProcedureVertexId(0);
    let v_x = ProcedureVertexId(1);
    let v_r = ProcedureVertexId(2);
    let v_f = ProcedureVertexId(3);
    let v_y = ProcedureVertexId(4);
    let v_name = ProcedureVertexId(5);

    let mut vertices = HashMap::new();
    vertices.insert(
        v_lastname,
        ProcedureVertex::Thing(
            VertexKind::Attribute,
            VertexProperties {
                allowed_type_iids: vec![lastname.iid.clone()],
                value_predicate: Some(ValuePredicate::equals(lastname.iid.type_id(), b"Smith")),
            },
        ),
    );
    vertices.insert(
        v_x,
        ProcedureVertex::Thing(VertexKind::Entity, VertexProperties { allowed_type_iids: vec![person.iid.clone()], value_predicate: None }),
    );
    vertices.insert(
        v_r,
        ProcedureVertex::Thing(VertexKind::Relation, VertexProperties { allowed_type_iids: vec![friendship.iid.clone()], value_predicate: None }),
    );
    vertices.insert(
        v_f,
        ProcedureVertex::Thing(VertexKind::Relation, VertexProperties { allowed_type_iids: vec![friendship.iid.clone()], value_predicate: None }),
    );
    vertices.insert(
        v_y,
        ProcedureVertex::Thing(VertexKind::Entity, VertexProperties { allowed_type_iids: vec![person.iid.clone()], value_predicate: None }),
    );
    vertices.insert(
        v_name,
        ProcedureVertex::Thing(
            VertexKind::Attribute,
            VertexProperties {
                allowed_type_iids: vec![name.iid.clone()],
                value_predicate: Some(ValuePredicate::equals(name.iid.type_id(), b"John")),
            },
        ),
    );

    let edges = vec![
        ProcedureEdge {
            step: 1,
            source: v_lastname,
            target: v_x,
            encoding: Encoding::Has,
            direction: hypergraph_core::iid::Direction::Backward,
            role_type: None,
            scope: None,
        },
        ProcedureEdge {
            step: 2,
            source: v_x,
            target: v_r,
            encoding: Encoding::RolePlayer,
            direction: hypergraph_core::iid::Direction::Backward,
            role_type: Some(friend.iid.clone()),
            scope: Some(ScopeTemplate { relation: v_r, role_type: friend.iid.clone(), player: v_x, repetition: 3 }),
        },
        ProcedureEdge {
            step: 3,
            source: v_r,
            target: v_x,
            encoding: Encoding::RolePlayer,
            direction: hypergraph_core::iid::Direction::Forward,
            role_type: Some(friend.iid.clone()),
            scope: Some(ScopeTemplate { relation: v_r, role_type: friend.iid.clone(), player: v_x, repetition: 3 }),
        },
        ProcedureEdge {
            step: 4,
            source: v_x,
            target: v_f,
            encoding: Encoding::RolePlayer,
            direction: hypergraph_core::iid::Direction::Backward,
            role_type: Some(friend.iid.clone()),
            scope: Some(ScopeTemplate { relation: v_f, role_type: friend.iid.clone(), player: v_x, repetition: 1 }),
        },
        ProcedureEdge {
            step: 5,
            source: v_f,
            target: v_y,
            encoding: Encoding::RolePlayer,
            direction: hypergraph_core::iid::Direction::Forward,
            role_type: Some(friend.iid.clone()),
            scope: Some(ScopeTemplate { relation: v_f, role_type: friend.iid.clone(), player: v_y, repetition: 2 }),
        },
        ProcedureEdge {
            step: 6,
            source: v_y,
            target: v_name,
            encoding: Encoding::Has,
            direction: hypergraph_core::iid::Direction::Forward,
            role_type: None,
            scope: None,
        },
    ];

    let procedure = Procedure::new(vertices, edges, v_lastname);
    let mut iterator = procedure.iterator(&graph, vec![smith.iid.clone()], vec![v_x, v_y]);

    let mut found_expected_answer = false;
    let mut answer_count = 0;
    while let Some(answer) = iterator.next().expect("traversal should not error") {
        answer_count += 1;
        if answer.get(v_x) == Some(&x.iid) && answer.get(v_y) == Some(&y.iid) {
            found_expected_answer = true;
        }
    }

    assert!(answer_count > 0, "procedure must return at least one answer");
    assert!(found_expected_answer, "the x=X, y=Y completion through f1 must be among the answers");
}
