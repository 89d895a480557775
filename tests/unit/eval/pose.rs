use super::*;

#[test]
fn setters_flag_properties_as_changed() {
    let mut pose = CameraPose::default();
    assert!(!pose.changed_flags().any());
    pose.set_field_of_view(60.0);
    assert!(pose.changed_flags().field_of_view);
    assert!(!pose.changed_flags().location);
    pose.clear_all_changed_flags();
    assert!(!pose.changed_flags().any());
    assert_eq!(pose.field_of_view(), 60.0);
}

#[test]
fn override_changed_only_copies_flagged_properties() {
    let mut src = CameraPose::default();
    src.set_location(DVec3::new(1.0, 2.0, 3.0));
    src.clear_all_changed_flags();
    src.set_field_of_view(40.0);

    let mut dst = CameraPose::default();
    dst.override_changed(&src);
    assert_eq!(dst.location(), DVec3::ZERO);
    assert_eq!(dst.field_of_view(), 40.0);

    dst.override_all(&src);
    assert_eq!(dst.location(), DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(dst.changed_flags(), CameraPoseFlags::all(true));
}

#[test]
fn lerp_all_endpoints_and_midpoint() {
    let mut to = CameraPose::default();
    to.set_location(DVec3::new(10.0, 0.0, 0.0));
    to.set_field_of_view(30.0);

    let mut a = CameraPose::default();
    a.lerp_all(&to, 0.0);
    assert_eq!(a.location(), DVec3::ZERO);
    assert!(!a.changed_flags().any());

    let mut b = CameraPose::default();
    b.lerp_all(&to, 1.0);
    assert_eq!(b.location(), to.location());

    let mut c = CameraPose::default();
    c.lerp_all(&to, 0.5);
    assert!((c.location().x - 5.0).abs() < 1e-12);
    assert!((c.field_of_view() - 60.0).abs() < 1e-4);
}

#[test]
fn lerp_changed_ignores_unflagged_properties() {
    let mut to = CameraPose::default();
    to.set_location(DVec3::new(10.0, 0.0, 0.0));
    to.clear_all_changed_flags();
    to.set_target_distance(500.0);

    let mut pose = CameraPose::default();
    pose.lerp_changed(&to, 0.5);
    assert_eq!(pose.location(), DVec3::ZERO);
    assert!((pose.target_distance() - 750.0).abs() < 1e-9);
}

#[test]
fn effective_fov_prefers_focal_length() {
    let mut pose = CameraPose::default();
    assert_eq!(pose.effective_field_of_view(), 90.0);
    pose.set_sensor_width(36.0);
    pose.set_focal_length(18.0);
    assert!((pose.effective_field_of_view() - 90.0).abs() < 1e-4);
}

#[test]
fn target_follows_rotation() {
    let mut pose = CameraPose::default();
    pose.set_rotation(DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2));
    pose.set_target_distance(2.0);
    let target = pose.target();
    assert!((target - DVec3::new(0.0, 2.0, 0.0)).length() < 1e-9);
    pose.reset();
    assert_eq!(pose, CameraPose::default());
}
