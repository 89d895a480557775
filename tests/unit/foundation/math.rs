use super::*;

#[test]
fn fnv_is_deterministic_and_name_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_str("FieldOfView");
    let mut b = Fnv1a64::new_default();
    b.write_str("FieldOfView");
    let mut c = Fnv1a64::new_default();
    c.write_str("FieldOfVieW");
    assert_eq!(a.finish(), b.finish());
    assert_ne!(a.finish(), c.finish());
    assert_eq!(Fnv1a64::new_default().finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn stable_lerp_is_exact_at_endpoints() {
    let (a, b) = (0.1_f64, 1.0e9_f64);
    assert_eq!(lerp_stable(a, b, 0.0), a);
    assert_eq!(lerp_stable(a, b, 1.0), b);
    assert!((lerp_stable(0.0, 10.0, 0.25) - 2.5).abs() < 1e-12);
}

#[test]
fn scalar_and_vector_lerps() {
    assert_eq!(<i32 as Lerp>::lerp(&0, &10, 0.26), 3);
    assert!(!<bool as Lerp>::lerp(&false, &true, 0.49));
    assert!(<bool as Lerp>::lerp(&false, &true, 0.5));
    let v = <Vec2 as Lerp>::lerp(&Vec2::new(0.0, 2.0), &Vec2::new(4.0, 6.0), 0.5);
    assert_eq!(v, Vec2::new(2.0, 4.0));
    let p = <DVec3 as Lerp>::lerp(&DVec3::ZERO, &DVec3::new(2.0, 4.0, 8.0), 0.5);
    assert!((p - DVec3::new(1.0, 2.0, 4.0)).length() < 1e-12);
}

#[test]
fn quat_lerp_follows_the_arc() {
    let a = DQuat::IDENTITY;
    let b = DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2);
    let mid = <DQuat as Lerp>::lerp(&a, &b, 0.5);
    let expected = DQuat::from_rotation_z(std::f64::consts::FRAC_PI_4);
    assert!(mid.angle_between(expected) < 1e-9);
    assert!((mid.length() - 1.0).abs() < 1e-12);
    assert_eq!(<DQuat as Lerp>::lerp(&a, &b, 0.0), a);
    assert_eq!(<DQuat as Lerp>::lerp(&a, &b, 1.0), b);
}
