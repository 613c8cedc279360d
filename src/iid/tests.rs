use super::*;

#[test]
fn vertex_iid_round_trips_type_and_thing_shapes() {
    let type_iid = VertexIID::type_vertex(VertexKind::EntityType, 3);
    let decoded = VertexIID::try_from_bytes(type_iid.as_bytes()).unwrap();
    assert_eq!(decoded, type_iid);
    assert_eq!(decoded.type_id(), 3);
    assert_eq!(decoded.instance_id(), None);

    let thing_iid = VertexIID::thing_vertex(VertexKind::Entity, 3, 99);
    let decoded = VertexIID::try_from_bytes(thing_iid.as_bytes()).unwrap();
    assert_eq!(decoded, thing_iid);
    assert_eq!(decoded.type_id(), 3);
    assert_eq!(decoded.instance_id(), Some(99));
}

#[test]
fn vertex_iid_rejects_shape_prefix_mismatch() {
    // A thing-shaped byte string tagged with a type prefix is corrupt.
    let mut bytes = VertexIID::thing_vertex(VertexKind::Entity, 1, 1)
        .as_bytes()
        .to_vec();
    bytes[0] = VertexKind::EntityType.tag();

    assert!(VertexIID::try_from_bytes(&bytes).is_err());
}

#[test]
fn vertex_iid_orders_lexicographically_by_type_then_instance() {
    let a = VertexIID::thing_vertex(VertexKind::Entity, 1, 5);
    let b = VertexIID::thing_vertex(VertexKind::Entity, 1, 6);
    let c = VertexIID::thing_vertex(VertexKind::Entity, 2, 0);

    assert!(a < b);
    assert!(b < c);
}

#[test]
fn attribute_vertex_is_content_addressed() {
    let a1 = VertexIID::attribute_vertex(5, b"hello");
    let a2 = VertexIID::attribute_vertex(5, b"hello");
    let a3 = VertexIID::attribute_vertex(5, b"world");
    let a4 = VertexIID::attribute_vertex(6, b"hello");

    assert_eq!(a1, a2, "same (type, value) must collapse to one vertex");
    assert_ne!(a1, a3);
    assert_ne!(a1, a4);
    assert_eq!(a1.kind(), VertexKind::Attribute);
}

#[test]
fn encoding_infix_round_trips_with_direction() {
    for encoding in [
        Encoding::Sub,
        Encoding::Owns,
        Encoding::Plays,
        Encoding::Relates,
        Encoding::Isa,
        Encoding::Has,
        Encoding::Relating,
        Encoding::Playing,
        Encoding::RolePlayer,
    ] {
        for direction in [Direction::Forward, Direction::Backward] {
            let infix = encoding.infix(direction);
            let (decoded_encoding, decoded_direction) = Encoding::from_infix(infix).unwrap();
            assert_eq!(decoded_encoding, encoding);
            assert_eq!(decoded_direction, direction);
        }
    }
}

#[test]
fn forward_and_backward_views_have_distinct_iids() {
    let from = VertexIID::thing_vertex(VertexKind::Entity, 1, 1);
    let to = VertexIID::thing_vertex(VertexKind::Entity, 1, 2);

    let forward = EdgeViewIID::new(&from, Encoding::Has, Direction::Forward, &to, None);
    let backward = EdgeViewIID::new(&to, Encoding::Has, Direction::Backward, &from, None);

    assert_ne!(forward, backward);
}

#[test]
fn role_player_view_requires_role_instance_suffix() {
    let owner = VertexIID::thing_vertex(VertexKind::Relation, 1, 1);
    let adjacent = VertexIID::thing_vertex(VertexKind::Entity, 2, 1);
    let role_instance = VertexIID::thing_vertex(VertexKind::Role, 3, 1);

    let view = EdgeViewIID::new(
        &owner,
        Encoding::RolePlayer,
        Direction::Forward,
        &adjacent,
        Some(&role_instance),
    );

    assert!(view.as_bytes().len() > owner.as_bytes().len() + 1 + adjacent.as_bytes().len());
}

#[test]
#[should_panic(expected = "role_instance suffix presence must match")]
fn base_edge_rejects_role_instance_suffix() {
    let owner = VertexIID::thing_vertex(VertexKind::Entity, 1, 1);
    let adjacent = VertexIID::thing_vertex(VertexKind::Entity, 2, 1);
    let role_instance = VertexIID::thing_vertex(VertexKind::Role, 3, 1);

    let _ = EdgeViewIID::new(
        &owner,
        Encoding::Has,
        Direction::Forward,
        &adjacent,
        Some(&role_instance),
    );
}
