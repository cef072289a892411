use mimic_api_core::Side;
use mimic_rig_core::{resolve, AliasTable, BoneRole, Finger, NodeKind, RigError, RigGraph};

fn graph(name: &str) -> RigGraph {
    let json = mimic_test_fixtures::rigs::json(name).expect("rig fixture");
    RigGraph::from_json(&json).expect("rig graph json")
}

fn bone_name(rig: &mimic_rig_core::ResolvedRig, role: BoneRole) -> Option<&str> {
    rig.bone(role).map(|b| b.name.as_str())
}

#[test]
fn every_fixture_rig_parses() {
    let mut keys = mimic_test_fixtures::rigs::keys();
    keys.sort();
    assert!(!keys.is_empty());
    for key in keys {
        let g = graph(&key);
        assert!(!g.is_empty(), "{key} has no nodes");
    }
}

#[test]
fn ready_player_me_avatar_binds_everything() {
    let rig = resolve(&graph("rpm_avatar"), &AliasTable::default()).unwrap();

    let roles: Vec<&str> = rig.head_meshes.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, ["head", "teeth", "beard", "eye_left", "eye_right"]);
    assert_eq!(rig.head_meshes[0].name, "Wolf3D_Head");

    assert_eq!(bone_name(&rig, BoneRole::Head), Some("Head"));
    assert_eq!(bone_name(&rig, BoneRole::Neck), Some("Neck"));
    assert_eq!(bone_name(&rig, BoneRole::Spine), Some("Spine2"));
    assert_eq!(bone_name(&rig, BoneRole::UpperArm(Side::Left)), Some("LeftArm"));
    assert_eq!(
        bone_name(&rig, BoneRole::Forearm(Side::Right)),
        Some("RightForeArm")
    );
    assert_eq!(bone_name(&rig, BoneRole::Wrist(Side::Left)), Some("LeftHand"));
    assert_eq!(
        bone_name(&rig, BoneRole::Finger(Side::Right, Finger::Pinky, 2)),
        Some("RightHandPinky3")
    );

    // 3 trunk + 2 sides * (3 arm/wrist + 15 finger)
    assert_eq!(rig.bones().len(), 3 + 2 * 18);
}

#[test]
fn morph_channel_prefers_first_mesh_role() {
    let rig = resolve(&graph("rpm_avatar"), &AliasTable::default()).unwrap();
    let (mesh, index) = rig.morph_channel("jawOpen").unwrap();
    assert_eq!(mesh.name, "Wolf3D_Head");
    assert_eq!(mesh.morphs.name(index), Some("jawOpen"));

    // Only the teeth define it.
    let (mesh, _) = rig.morph_channel("mouthOpen").unwrap();
    assert_eq!(mesh.name, "Wolf3D_Teeth");

    assert!(rig.morph_channel("notAShape").is_none());
}

#[test]
fn mixamo_prefixes_resolve_and_missing_neck_is_omitted() {
    let rig = resolve(&graph("mixamo_no_neck"), &AliasTable::default()).unwrap();
    assert_eq!(bone_name(&rig, BoneRole::Head), Some("mixamorig:Head"));
    assert!(rig.neck.is_none());
    assert_eq!(bone_name(&rig, BoneRole::Spine), Some("mixamorig:Spine1"));
    assert_eq!(
        bone_name(&rig, BoneRole::UpperArm(Side::Right)),
        Some("mixamorig:RightArm")
    );
    assert!(rig.bone(BoneRole::Finger(Side::Left, Finger::Thumb, 0)).is_none());
    assert_eq!(rig.head_meshes.len(), 1);
    assert_eq!(rig.head_meshes[0].name, "Face");
}

#[test]
fn vrm_humanoid_names_resolve() {
    let rig = resolve(&graph("vrm_humanoid"), &AliasTable::default()).unwrap();
    assert_eq!(bone_name(&rig, BoneRole::Head), Some("J_Bip_C_Head"));
    assert_eq!(bone_name(&rig, BoneRole::Neck), Some("J_Bip_C_Neck"));
    assert_eq!(bone_name(&rig, BoneRole::Spine), Some("J_Bip_C_UpperChest"));
    assert_eq!(
        bone_name(&rig, BoneRole::Forearm(Side::Left)),
        Some("J_Bip_L_LowerArm")
    );
    assert_eq!(
        bone_name(&rig, BoneRole::Finger(Side::Left, Finger::Pinky, 0)),
        Some("J_Bip_L_Little1")
    );
    assert_eq!(rig.head_meshes[0].name, "Face");
}

#[test]
fn falls_back_to_blendshape_meshes() {
    let rig = resolve(&graph("arkit_mesh_only"), &AliasTable::default()).unwrap();
    let names: Vec<&str> = rig.head_meshes.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["CC_Base_Body"]);
    assert!(rig.head.is_none());
    assert!(rig.bones().is_empty());
}

#[test]
fn fallback_can_be_disabled() {
    let table = AliasTable {
        blendshape_mesh_fallback: false,
        ..AliasTable::default()
    };
    let err = resolve(&graph("arkit_mesh_only"), &table).unwrap_err();
    assert!(matches!(err, RigError::UnsupportedRig { nodes: 3 }));
}

#[test]
fn unrecognised_rig_is_unsupported() {
    let err = resolve(&graph("props_only"), &AliasTable::default()).unwrap_err();
    assert!(matches!(err, RigError::UnsupportedRig { .. }));
}

#[test]
fn custom_vocabulary_is_data_only() {
    let table = AliasTable::from_json(
        r#"{
            "meshes": [ { "role": "head", "aliases": ["Plane"] } ],
            "head": ["Light"]
        }"#,
    )
    .unwrap();
    let rig = resolve(&graph("props_only"), &table).unwrap();
    assert_eq!(rig.head_meshes[0].name, "Plane");
    assert_eq!(bone_name(&rig, BoneRole::Head), Some("Light"));
}

#[test]
fn resolves_the_gltf_fixture_asset() {
    let bytes = mimic_test_fixtures::assets::bytes("head_rig").unwrap();
    let graph = RigGraph::from_gltf_slice(&bytes).unwrap();
    assert_eq!(graph.len(), 6);
    assert_eq!(graph.nodes[4].parent, Some(3));

    let rig = resolve(&graph, &AliasTable::default()).unwrap();
    let head = &rig.head_meshes[0];
    assert_eq!(head.node, 5);
    assert_eq!(head.morphs.index_of("mouthSmileLeft"), Some(2));
    assert_eq!(graph.nodes[5].default_weight(2), 0.25);
    assert_eq!(rig.head.as_ref().map(|b| b.node), Some(4));
    assert_eq!(rig.neck.as_ref().map(|b| b.node), Some(3));
    assert_eq!(rig.spine.as_ref().map(|b| b.node), Some(2));
}

#[test]
fn gltf_skin_joints_are_bones() {
    let bytes = mimic_test_fixtures::assets::bytes("head_rig").unwrap();
    let graph = RigGraph::from_gltf_slice(&bytes).unwrap();
    let kinds: Vec<&NodeKind> = graph.nodes.iter().map(|n| &n.kind).collect();
    assert!(matches!(kinds[0], NodeKind::Transform));
    for joint in 1..=4 {
        assert!(matches!(kinds[joint], NodeKind::Bone), "node {joint}");
    }
    assert!(matches!(kinds[5], NodeKind::Mesh { .. }));
}
