use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CameraError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        CameraError::variable("x")
            .to_string()
            .contains("variable error:")
    );
    assert!(CameraError::state("x").to_string().contains("state error:"));
    assert!(
        CameraError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn json_errors_become_serde_errors() {
    let err: CameraError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, CameraError::Serde(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CameraError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
