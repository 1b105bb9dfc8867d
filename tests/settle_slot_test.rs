use reveal_ngin::reveal::{MaterialSlot, RevealState};

/// The slot starts dissolving with the captured originals intact.
#[test]
fn should_capture_originals_while_dissolving() {
    let slot: MaterialSlot<&str, Vec<u32>> = MaterialSlot::new("dissolve", vec![7, 8]);
    assert_eq!(slot.state(), RevealState::Dissolving);
    assert_eq!(slot.original(), &vec![7, 8]);
}

#[test]
fn should_expose_dissolve_only_while_dissolving() {
    let mut slot: MaterialSlot<String, u32> = MaterialSlot::new("dissolve".to_string(), 1);
    assert!(slot.dissolve_mut().is_some());
    slot.settle();
    assert!(slot.dissolve_mut().is_none());
}

/// Settling yields the dissolve material exactly once; repeating the check at
/// progress 1.0 must not re-swap and must leave the captured original active.
#[test]
fn should_settle_idempotently() {
    let mut slot: MaterialSlot<String, u32> = MaterialSlot::new("dissolve".to_string(), 42);

    let first = slot.settle();
    assert_eq!(first, Some("dissolve".to_string()));
    assert_eq!(slot.state(), RevealState::Settled);
    assert_eq!(*slot.original(), 42);

    let second = slot.settle();
    assert_eq!(second, None);
    assert_eq!(slot.state(), RevealState::Settled);
    assert_eq!(*slot.original(), 42);
}
