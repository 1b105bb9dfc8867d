use reveal_ngin::viewer::LoadGate;

#[test]
fn should_admit_the_current_request() {
    let mut gate = LoadGate::new();
    let ticket = gate.request("parts/a.glb").unwrap();
    assert_eq!(ticket.url(), "parts/a.glb");
    assert!(gate.admits(&ticket));
    assert_eq!(gate.current_url(), Some("parts/a.glb"));
}

/// Re-requesting the current URL is a no-op: no ticket, no reload, and the
/// original ticket stays valid.
#[test]
fn should_ignore_redundant_requests() {
    let mut gate = LoadGate::new();
    let ticket = gate.request("parts/a.glb").unwrap();
    assert!(gate.request("parts/a.glb").is_none());
    assert!(gate.admits(&ticket));
}

/// A newer URL supersedes the in-flight load; its late completion must be
/// refused and never reach the instance belonging to the new request.
#[test]
fn should_refuse_stale_completions() {
    let mut gate = LoadGate::new();
    let stale = gate.request("parts/a.glb").unwrap();
    let current = gate.request("parts/b.glb").unwrap();

    assert!(!gate.admits(&stale));
    assert!(gate.admits(&current));
}

/// Returning to an earlier URL issues a fresh generation, so the abandoned
/// first load still cannot apply.
#[test]
fn should_refuse_old_generation_of_same_url() {
    let mut gate = LoadGate::new();
    let first = gate.request("parts/a.glb").unwrap();
    gate.request("parts/b.glb").unwrap();
    let second = gate.request("parts/a.glb").unwrap();

    assert!(!gate.admits(&first));
    assert!(gate.admits(&second));
}
