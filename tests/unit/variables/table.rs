use super::*;
use crate::foundation::core::{DQuat, DVec3, Transform3};

fn xyz_table() -> (VariableTable, VariableId, VariableId, VariableId) {
    let x = VariableDefinition::of::<f32>("x").input();
    let y = VariableDefinition::of::<f32>("y");
    let z = VariableDefinition::of::<f32>("z").private();
    let mut info = VariableTableAllocationInfo::default();
    info.add(x.clone());
    info.add(y.clone());
    info.add(z.clone());
    let mut table = VariableTable::with_allocation_info(&info);
    table.set_value(x.id, 1.0_f32).unwrap();
    table.set_value(y.id, 2.0_f32).unwrap();
    table.set_value(z.id, 3.0_f32).unwrap();
    (table, x.id, y.id, z.id)
}

#[test]
fn initialize_sizes_buffer_exactly_and_leaves_values_unwritten() {
    let mut info = VariableTableAllocationInfo::default();
    info.add(VariableDefinition::of::<bool>("flag"));
    info.add(VariableDefinition::of::<f64>("dist"));
    let mut table = VariableTable::new();
    table.initialize(&info);

    // bool at 0, f64 aligned to 8.
    assert_eq!(table.capacity(), 16);
    assert_eq!(table.used(), 16);
    assert_eq!(table.len(), 2);
    let dist = VariableId::from_name("dist");
    assert!(table.contains_value(dist));
    assert!(!table.is_value_written(dist));
    assert!(table.get_value::<f64>(dist).is_err());
    assert_eq!(table.find_value::<f64>(dist), None);

    table.initialize(&info);
    assert_eq!(table.len(), 2);
    assert_eq!(table.capacity(), 16);
}

#[test]
fn values_survive_growth() {
    let mut table = VariableTable::new();
    let mut expected = Vec::new();
    for i in 0..40 {
        let def = VariableDefinition::of::<DVec3>(format!("v{i}"));
        table.add_variable(&def).unwrap();
        let v = DVec3::new(f64::from(i), 2.0 * f64::from(i), -1.0);
        table.set_value(def.id, v).unwrap();
        expected.push((def.id, v));
    }
    assert!(table.capacity() >= 40 * 24);
    for (id, v) in expected {
        assert!(table.is_value_written(id));
        assert_eq!(table.get_value::<DVec3>(id).unwrap(), v);
    }
}

#[test]
fn growth_doubles_with_a_floor() {
    let mut table = VariableTable::new();
    table
        .add_variable(&VariableDefinition::of::<bool>("b"))
        .unwrap();
    assert_eq!(table.capacity(), 64);
    table
        .add_variable(&VariableDefinition::of::<Transform3>("big"))
        .unwrap();
    // 8 (aligned) + 80 = 88 > 64 => doubled to 128.
    assert_eq!(table.capacity(), 128);
    table
        .add_variable(&VariableDefinition::new("huge", VariableType::Transform3d))
        .unwrap();
    assert_eq!(table.capacity(), 256);
}

#[test]
fn duplicate_add_is_rejected() {
    let mut table = VariableTable::new();
    let def = VariableDefinition::of::<i32>("n");
    table.add_variable(&def).unwrap();
    assert!(matches!(
        table.add_variable(&def),
        Err(CameraError::Variable(_))
    ));
}

#[test]
fn set_value_reports_unknown_and_mistyped_ids() {
    let (mut table, x, _, _) = xyz_table();
    assert!(table.set_value(VariableId::from_name("nope"), 1.0_f32).is_err());
    assert!(table.set_value(x, 1.0_f64).is_err());
    assert!(!table.try_set_value(VariableId::from_name("nope"), 1.0_f32));
    assert!(table.try_set_value(x, 5.0_f32));
    assert_eq!(table.get_value::<f32>(x).unwrap(), 5.0);
}

#[test]
fn written_flags_bookkeeping() {
    let (mut table, x, y, _) = xyz_table();
    assert!(table.is_value_written_this_frame(x));
    table.clear_all_written_this_frame_flags();
    assert!(!table.is_value_written_this_frame(x));
    assert!(table.is_value_written(x));

    table.unset_value(x);
    assert!(!table.is_value_written(x));
    assert!(table.is_value_written(y));

    table.unset_all_values();
    assert!(!table.is_value_written(y));
    assert!(table.contains_value(y));
}

#[test]
fn override_respects_input_output_and_private() {
    let (a, x, y, z) = xyz_table();

    let mut inputs = VariableTable::new();
    inputs.override_with(&a, VariableTableFilter::INPUT);
    assert!(inputs.contains_value(x));
    assert!(!inputs.contains_value(y));
    assert!(!inputs.contains_value(z));
    assert!(inputs.is_input(x));
    assert_eq!(inputs.get_value::<f32>(x).unwrap(), 1.0);

    let mut outputs = VariableTable::new();
    outputs.override_with(&a, VariableTableFilter::OUTPUT);
    assert!(!outputs.contains_value(x));
    assert!(outputs.contains_value(y));
    assert!(!outputs.contains_value(z));

    let mut all = VariableTable::new();
    all.override_all(&a);
    assert_eq!(all.len(), 2);
    assert!(!all.contains_value(z));
}

#[test]
fn override_changed_only_skips_stale_entries() {
    let (mut a, x, y, _) = xyz_table();
    a.clear_all_written_this_frame_flags();
    a.set_value(y, 9.0_f32).unwrap();

    let mut b = VariableTable::new();
    b.override_with(&a, VariableTableFilter::ALL_CHANGED);
    assert!(!b.contains_value(x));
    assert_eq!(b.get_value::<f32>(y).unwrap(), 9.0);
    // Merges mark written, not written-this-frame.
    assert!(b.is_value_written(y));
    assert!(!b.is_value_written_this_frame(y));
}

#[test]
fn masked_override_records_copied_ids() {
    let (a, x, y, _) = xyz_table();
    let mask: VariableMask = [x].into_iter().collect();

    let mut b = VariableTable::new();
    let mut copied = VariableMask::new();
    b.override_masked(&a, VariableTableFilter::ALL, &mask, false, &mut copied);
    assert!(b.contains_value(x));
    assert!(!b.contains_value(y));
    assert_eq!(copied, mask);

    let mut c = VariableTable::new();
    let mut copied = VariableMask::new();
    c.override_masked(&a, VariableTableFilter::ALL, &mask, true, &mut copied);
    assert!(!c.contains_value(x));
    assert!(c.contains_value(y));
    assert!(copied.contains(y));
    assert_eq!(copied.len(), 1);
}

#[test]
fn lerp_endpoints() {
    let def = VariableDefinition::of::<f32>("fov");
    let mut info = VariableTableAllocationInfo::default();
    info.add(def.clone());

    let mut local = VariableTable::with_allocation_info(&info);
    let mut other = VariableTable::with_allocation_info(&info);
    local.set_value(def.id, 60.0_f32).unwrap();
    other.set_value(def.id, 90.0_f32).unwrap();

    let mut zero = local.clone();
    zero.lerp(&other, VariableTableFilter::ALL, 0.0);
    assert!((zero.get_value::<f32>(def.id).unwrap() - 60.0).abs() < 1e-6);

    let mut one = local.clone();
    one.lerp(&other, VariableTableFilter::ALL, 1.0);
    assert!((one.get_value::<f32>(def.id).unwrap() - 90.0).abs() < 1e-6);

    let mut half = local.clone();
    half.lerp_all(&other, 0.5);
    assert!((half.get_value::<f32>(def.id).unwrap() - 75.0).abs() < 1e-6);
}

#[test]
fn lerp_into_missing_or_unwritten_entry_copies() {
    let def = VariableDefinition::of::<f64>("dist").input();
    let mut other = VariableTable::new();
    other.add_variable(&def).unwrap();
    other.set_value(def.id, 10.0_f64).unwrap();

    let mut missing = VariableTable::new();
    missing.lerp(&other, VariableTableFilter::INPUT, 0.25);
    assert_eq!(missing.get_value::<f64>(def.id).unwrap(), 10.0);

    let mut unwritten = VariableTable::new();
    unwritten.add_variable(&def).unwrap();
    unwritten.lerp(&other, VariableTableFilter::INPUT, 0.25);
    assert_eq!(unwritten.get_value::<f64>(def.id).unwrap(), 10.0);
}

#[test]
fn masked_lerp_honors_invert() {
    let (a, x, y, _) = xyz_table();
    let mut b = a.clone();
    b.set_value(x, 11.0_f32).unwrap();
    b.set_value(y, 12.0_f32).unwrap();

    let mask: VariableMask = [x].into_iter().collect();
    let mut out = VariableMask::new();
    let mut local = a.clone();
    local.lerp_masked(&b, VariableTableFilter::ALL, 1.0, &mask, true, &mut out);
    assert_eq!(local.get_value::<f32>(x).unwrap(), 1.0);
    assert_eq!(local.get_value::<f32>(y).unwrap(), 12.0);
    assert!(out.contains(y) && !out.contains(x));
}

#[test]
fn transform_variables_blend_rotation_on_the_arc() {
    let def = VariableDefinition::of::<Transform3>("pivot");
    let mut a = VariableTable::new();
    a.add_variable(&def).unwrap();
    a.set_value(def.id, Transform3::IDENTITY).unwrap();
    let mut b = a.clone();
    b.set_value(
        def.id,
        Transform3::from_translation_rotation(
            DVec3::new(2.0, 0.0, 0.0),
            DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
        ),
    )
    .unwrap();

    a.lerp_all(&b, 0.5);
    let t = a.get_value::<Transform3>(def.id).unwrap();
    assert!((t.translation.x - 1.0).abs() < 1e-12);
    let expected = DQuat::from_rotation_z(std::f64::consts::FRAC_PI_4);
    assert!(t.rotation.angle_between(expected) < 1e-9);
}

#[test]
fn serialize_round_trip_and_shape_check() {
    let (mut a, x, _, _) = xyz_table();
    let mut ar = StateArchive::saving();
    a.serialize(&mut ar).unwrap();

    a.set_value(x, 100.0_f32).unwrap();
    let mut loading = ar.clone().into_loading();
    a.serialize(&mut loading).unwrap();
    assert_eq!(a.get_value::<f32>(x).unwrap(), 1.0);

    let mut other_shape = VariableTable::new();
    let mut loading = ar.into_loading();
    assert!(matches!(
        other_shape.serialize(&mut loading),
        Err(CameraError::State(_))
    ));
}
