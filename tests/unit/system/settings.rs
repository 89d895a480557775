use super::*;

#[test]
fn defaults_only_pop_the_main_layer() {
    let s = CameraSystemSettings::default();
    assert!(s.layer(CameraRigLayer::Main).auto_pop);
    assert!(!s.layer(CameraRigLayer::Main).blend_first_camera_rig);
    for layer in [CameraRigLayer::Base, CameraRigLayer::Global, CameraRigLayer::Visual] {
        assert_eq!(s.layer(layer), BlendStackSettings::new(false, true));
    }
}

#[test]
fn partial_json_keeps_defaults() {
    let s = CameraSystemSettings::from_json_str(
        r#"{ "main_layer": { "auto_pop": false, "blend_first_camera_rig": true } }"#,
    )
    .unwrap();
    assert_eq!(s.main_layer, BlendStackSettings::new(false, true));
    assert_eq!(s.base_layer, CameraSystemSettings::default().base_layer);
}

#[test]
fn json_round_trips() {
    let s = CameraSystemSettings::default();
    let text = s.to_json_string().unwrap();
    assert_eq!(CameraSystemSettings::from_json_str(&text).unwrap(), s);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = CameraSystemSettings::from_json_str(r#"{ "overlay_layer": {} }"#).unwrap_err();
    assert!(matches!(err, crate::foundation::error::CameraError::Serde(_)));
}

#[test]
fn layer_settings_build_a_stack_node() {
    let node = BlendStackSettings::new(false, true).to_node("base");
    assert_eq!(node.name, "base");
    assert!(!node.auto_pop);
    assert!(node.blend_first_camera_rig);
}
