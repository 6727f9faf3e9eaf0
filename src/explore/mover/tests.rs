use super::*;

fn fv(x: f32, y: f32) -> FixedVec2 {
    FixedVec2::from_f32(x, y)
}

fn test_mover(at: FixedVec2) -> Mover {
    Mover::new(at, FixedNum::from_num(2.0), FixedNum::from_num(0.05))
}

fn notice(tag: &str) -> Option<ArrivalNotice> {
    Some(ArrivalNotice {
        action: Some(tag.to_string()),
    })
}

/// Drive `ticks` updates, collecting every fired notice.
fn run_ticks(mover: &mut Mover, ticks: usize, dt: f32) -> Vec<ArrivalNotice> {
    let dt = FixedNum::from_num(dt);
    let mut fired = Vec::new();
    for _ in 0..ticks {
        if let Some(n) = mover.advance(dt) {
            fired.push(n);
        }
    }
    fired
}

#[test]
fn arrival_fires_exactly_once_at_the_final_waypoint() {
    let mut mover = test_mover(fv(0.0, 0.0));
    let path = vec![fv(1.0, 0.0), fv(2.0, 0.0), fv(3.0, 0.0)];

    assert!(mover.move_on_path(path, notice("done")).is_none());
    assert!(!mover.is_idle());

    // Speed 2.0, dt 0.25 -> half a unit per tick; 3 units of path need 6
    // ticks. Run plenty more to prove the notice cannot fire twice.
    let fired = run_ticks(&mut mover, 40, 0.25);

    assert_eq!(fired.len(), 1, "arrival notice must fire exactly once");
    assert_eq!(fired[0].action.as_deref(), Some("done"));
    assert!(mover.is_idle());
    assert_eq!(mover.position(), fv(3.0, 0.0));
}

#[test]
fn notice_does_not_fire_before_the_last_waypoint() {
    let mut mover = test_mover(fv(0.0, 0.0));
    let _ = mover.move_on_path(vec![fv(1.0, 0.0), fv(2.0, 0.0)], notice("done"));

    // Two ticks reach the first waypoint only.
    let fired = run_ticks(&mut mover, 2, 0.25);
    assert!(fired.is_empty());
    assert!(!mover.is_idle());
    assert_eq!(mover.position(), fv(1.0, 0.0));
}

#[test]
fn superseding_path_discards_the_old_notice() {
    let mut mover = test_mover(fv(0.0, 0.0));
    let _ = mover.move_on_path(
        vec![fv(1.0, 0.0), fv(2.0, 0.0), fv(3.0, 0.0)],
        notice("first"),
    );

    // Partway along, a new assignment arrives.
    let mut fired = run_ticks(&mut mover, 2, 0.25);
    assert!(fired.is_empty());
    assert!(mover.move_on_path(vec![fv(1.0, 1.0)], notice("second")).is_none());

    fired.extend(run_ticks(&mut mover, 40, 0.25));

    assert_eq!(fired.len(), 1, "only the superseding notice may fire");
    assert_eq!(fired[0].action.as_deref(), Some("second"));
    assert_eq!(mover.position(), fv(1.0, 1.0));
}

#[test]
fn empty_assignment_completes_on_the_spot() {
    let mut mover = test_mover(fv(4.0, 4.0));

    let fired = mover.move_on_path(Vec::new(), notice("instant"));

    assert_eq!(fired, notice("instant"));
    assert!(mover.is_idle());
    assert_eq!(mover.position(), fv(4.0, 4.0));

    // Nothing lingers: later ticks fire nothing.
    assert!(run_ticks(&mut mover, 5, 0.25).is_empty());
}

#[test]
fn advance_never_overshoots_the_target() {
    let mut mover = test_mover(fv(0.0, 0.0));
    let _ = mover.move_on_path(vec![fv(10.0, 0.0)], None);

    let fired = run_ticks(&mut mover, 1, 0.25);
    assert!(fired.is_empty());
    // Exactly speed * dt along the movement direction.
    assert_eq!(mover.position(), fv(0.5, 0.0));
    assert!(!mover.is_idle());
}

#[test]
fn assignment_without_notice_still_moves_and_completes() {
    let mut mover = test_mover(fv(0.0, 0.0));
    let _ = mover.move_on_path(vec![fv(1.0, 0.0)], None);

    let fired = run_ticks(&mut mover, 10, 0.25);
    assert!(fired.is_empty());
    assert!(mover.is_idle());
    assert_eq!(mover.position(), fv(1.0, 0.0));
}

#[test]
fn facing_follows_the_dominant_axis() {
    let origin = fv(0.0, 0.0);
    assert_eq!(facing_toward(origin, fv(3.0, 1.0)), Facing::Right);
    assert_eq!(facing_toward(origin, fv(-3.0, 1.0)), Facing::Left);
    assert_eq!(facing_toward(origin, fv(1.0, 3.0)), Facing::Up);
    assert_eq!(facing_toward(origin, fv(1.0, -3.0)), Facing::Down);
}

#[test]
fn diagonal_ties_resolve_to_the_vertical_branch() {
    let origin = fv(0.0, 0.0);
    assert_eq!(facing_toward(origin, fv(2.0, 2.0)), Facing::Up);
    assert_eq!(facing_toward(origin, fv(-2.0, -2.0)), Facing::Down);
}

#[test]
fn facing_updates_per_leg_of_the_path() {
    let mut mover = test_mover(fv(0.0, 0.0));
    // East first, then north.
    let _ = mover.move_on_path(vec![fv(1.0, 0.0), fv(1.0, 5.0)], None);
    assert_eq!(mover.facing(), Facing::Right);

    let _ = run_ticks(&mut mover, 2, 0.25);
    assert_eq!(mover.position(), fv(1.0, 0.0));
    assert_eq!(mover.facing(), Facing::Up);
}
