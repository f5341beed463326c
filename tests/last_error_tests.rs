//! Process-wide last error. Kept in its own test binary: every failing
//! pipeline in the process writes the same slot.

use sluice_exec::{clear_last_error, last_error, Pipeline};

#[test]
fn test_last_error_tracks_failures() {
    clear_last_error();
    assert!(last_error().is_none());

    assert!(Pipeline::create("{not json").is_err());
    let msg = last_error().expect("last error after bad json");
    assert!(msg.starts_with("invalid plan"), "{}", msg);

    let plan = r#"{"steps":[{"op":"codec.csv.decode"},{"op":"explode"},{"op":"codec.csv.encode"}]}"#;
    assert!(Pipeline::create(plan).is_err());
    assert_eq!(last_error().as_deref(), Some("unknown op: 'explode'"));

    assert!(Pipeline::create(r#"{"steps":[]}"#).is_err());
    assert_eq!(last_error().as_deref(), Some("plan has no steps"));

    // instance failures land here too
    let mut p = Pipeline::create(
        r#"{"steps":[{"op":"codec.csv.decode"},{"op":"codec.csv.encode"}]}"#,
    )
    .expect("create");
    p.finish().expect("finish");
    assert!(p.finish().is_err());
    assert_eq!(last_error().as_deref(), Some("pipeline already finished"));

    clear_last_error();
    assert!(last_error().is_none());
}
