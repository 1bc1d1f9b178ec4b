//! Fixed timestep simulation tick and the slower run clock
//!
//! `tick` advances physics, landings and pickups by one fixed step. `clock`
//! runs on wall-clock time and owns the countdown, height bookkeeping, world
//! extension and cleanup.

use super::body::{Body, ContactSide, Touching, resolve_x, resolve_y};
use super::event::{EndReason, GameEvent, Hud, SoundEffect};
use super::platform::{BreakProgress, PlatformKind, PlatformKindTag};
use super::scoring::raw_height;
use super::state::GameState;
use super::viewport::Viewport;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump is currently held
    pub jump_held: bool,
    /// Jump went down since the previous frame; only the first substep sees it
    pub jump_pressed: bool,
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if !state.is_running() {
        return;
    }

    // Bouncy support is judged against last step's contacts
    let supported = state.player.touching.down;
    state.player.apply_input(
        input,
        dt,
        &state.tuning.player,
        |body| {
            supported
                && state.platforms.iter().any(|p| {
                    p.active && p.tag() == PlatformKindTag::Bouncy && body.rests_on(&p.bounds())
                })
        },
        &mut state.events,
    );

    step_platforms(state, dt);

    let landings = move_player(state, dt);
    state
        .player
        .update_grounding(state.player.touching.down, &state.tuning.player, &mut state.events);
    for id in landings {
        land_on(state, id);
    }

    pick_up_items(state);
    check_termination(state);
}

fn step_platforms(state: &mut GameState, dt: f32) {
    let mut expired = Vec::new();
    for platform in &mut state.platforms {
        platform.step_motion(dt);
        match platform.step_timers(dt, &state.tuning.platform) {
            BreakProgress::Unchanged => {}
            BreakProgress::Broke => {
                state.events.push(GameEvent::Sound(SoundEffect::PlatformBreak));
                state.events.push(GameEvent::PlatformBroken { id: platform.id });
                log::debug!("platform {} broke", platform.id);
            }
            BreakProgress::Expired => expired.push(platform.id),
        }
    }
    for id in expired {
        state.remove_platform(id);
    }
}

/// Integrate the player and resolve it against solid platforms, X then Y.
///
/// Returns the ids of platforms landed on from above this step.
fn move_player(state: &mut GameState, dt: f32) -> Vec<u32> {
    let world = &state.tuning.world;
    let player = &mut state.player;
    player.apply_gravity(dt, state.tuning.player.gravity);

    let mut body = player.bounds();
    let mut vel = player.vel;
    let mut touching = Touching::default();
    let mut landings = Vec::new();

    body.center.x += vel.x * dt;
    let (min_x, max_x) = (body.half.x, world.width - body.half.x);
    if body.center.x < min_x || body.center.x > max_x {
        body.center.x = body.center.x.clamp(min_x, max_x);
        vel.x = 0.0;
    }
    for platform in state.platforms.iter().filter(|p| p.collidable()) {
        match resolve_x(&mut body, &mut vel, &platform.bounds()) {
            Some(ContactSide::Left) => touching.right = true,
            Some(ContactSide::Right) => touching.left = true,
            _ => {}
        }
    }

    let prev = body;
    body.center.y += vel.y * dt;
    let (min_y, max_y) = (world.top + body.half.y, world.bottom - body.half.y);
    if body.center.y < min_y || body.center.y > max_y {
        body.center.y = body.center.y.clamp(min_y, max_y);
        vel.y = 0.0;
    }
    for platform in state.platforms.iter().filter(|p| p.collidable()) {
        match resolve_y(&mut body, &mut vel, &prev, &platform.bounds()) {
            Some(ContactSide::Top) => {
                touching.down = true;
                landings.push(platform.id);
            }
            Some(ContactSide::Bottom) => touching.up = true,
            Some(ContactSide::Left) => touching.right = true,
            Some(ContactSide::Right) => touching.left = true,
            None => {}
        }
    }

    player.pos = body.center;
    player.vel = vel;
    player.touching = touching;
    landings
}

/// Landing reactions, debounced per platform
fn land_on(state: &mut GameState, id: u32) {
    let tuning = &state.tuning.platform;
    let Some(platform) = state.platforms.iter_mut().find(|p| p.id == id) else {
        return;
    };
    if !platform.accepts_landing() {
        return;
    }
    platform.landing_cooldown = tuning.landing_cooldown;

    let tag = platform.tag();
    let index = platform.index;
    match platform.kind {
        PlatformKind::Breakable { .. } => {
            if platform.start_breaking(tuning.break_delay) {
                log::debug!("platform {id} cracking");
            }
        }
        PlatformKind::Bouncy { bounce_force } => {
            state.player.boost(bounce_force, &mut state.events);
        }
        PlatformKind::Normal | PlatformKind::Moving { .. } => {}
    }

    state.events.push(GameEvent::Sound(SoundEffect::PlatformLand(tag)));
    state.reach_platform(index);
    update_height(state);
}

fn pick_up_items(state: &mut GameState) {
    let reach = state.player.bounds();
    let hits: Vec<u32> = state
        .collectibles
        .iter()
        .filter(|c| c.bounds().overlaps(&reach))
        .map(|c| c.id)
        .collect();
    for id in hits {
        state.collect_item(id);
    }
}

/// End the run if a terminal condition holds. Time running out wins over a
/// fall when both hold.
pub fn check_termination(state: &mut GameState) -> Option<EndReason> {
    if !state.is_running() {
        return None;
    }
    let reason = if state.clock.remaining <= 0.0 {
        EndReason::TimeUp
    } else if raw_height(state.player.pos.y, &state.tuning.world) <= state.tuning.run.fall_limit {
        EndReason::Fell
    } else {
        return None;
    };
    state.end_run(reason);
    Some(reason)
}

/// Refresh height, milestones, backdrop band and fall warning
fn update_height(state: &mut GameState) {
    let progress = &mut state.progress;
    let milestones = progress.update_height(
        state.player.pos.y,
        &state.tuning.world,
        &state.tuning.scoring,
    );
    for milestone in milestones {
        state.events.push(GameEvent::HeightMilestone {
            meters: milestone.meters,
            major: milestone.major,
        });
        state
            .events
            .push(GameEvent::Sound(SoundEffect::Milestone { major: milestone.major }));
        log::info!("reached {}m", milestone.meters);
    }
    if let Some(band) = progress.update_backdrop(&state.tuning.run) {
        state.events.push(GameEvent::BackdropChanged { band });
    }
    if let Some(visible) = progress.update_fall_warning(&state.tuning.run) {
        state.events.push(GameEvent::FallWarning { visible });
    }
}

/// Remove every entity whose center is below the view's bottom edge plus the
/// cleanup margin. Returns how many were removed.
pub fn cleanup(state: &mut GameState, view: &impl Viewport) -> usize {
    let limit = view.bottom() + state.tuning.world.cleanup_margin;
    let before = state.platforms.len() + state.collectibles.len();
    state.platforms.retain(|p| p.pos.y <= limit);
    state.collectibles.retain(|c| c.pos.y <= limit);
    let removed = before - state.platforms.len() - state.collectibles.len();
    if removed > 0 {
        log::debug!("cleaned up {removed} entities below {limit:.0}");
    }
    removed
}

/// Run the wall-clock cadence at `now_ms`
pub fn clock(state: &mut GameState, now_ms: f64, view: &impl Viewport) {
    if !state.is_running() {
        return;
    }
    state.clock.last_clock_ms = now_ms;
    let elapsed = ((now_ms - state.clock.started_at_ms) / 1000.0) as f32;
    state.clock.remaining = (state.tuning.run.duration - elapsed).max(0.0);

    update_height(state);
    if check_termination(state).is_some() {
        return;
    }

    // At most one cluster per clock; a fast climber catches up over a few
    state.extend_world(view);
    cleanup(state, view);

    state.events.push(GameEvent::Hud(Hud {
        score: state.progress.score,
        height: state.progress.height,
        time_remaining: state.clock.remaining,
    }));
    state.normalize_order();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::platform::BreakStage;
    use crate::sim::viewport::FixedView;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    /// A running state with only a platform of `kind` under the player
    fn lone_platform(kind: PlatformKindTag, index: i32) -> (GameState, u32) {
        let mut state = GameState::new(12345, Tuning::default());
        state.platforms.clear();
        state.collectibles.clear();
        let id = state.spawn_platform(Vec2::new(240.0, 630.0), kind, index);
        state.start(0.0);
        state.drain_events();
        (state, id)
    }

    fn run_ticks(state: &mut GameState, input: &TickInput, n: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            tick(state, input, SIM_DT);
            events.extend(state.drain_events());
        }
        events
    }

    fn count(events: &[GameEvent], wanted: &GameEvent) -> usize {
        events.iter().filter(|e| *e == wanted).count()
    }

    fn jump() -> TickInput {
        TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_land_then_jump() {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 3);
        let events = run_ticks(&mut state, &TickInput::default(), 60);
        assert!(state.player.grounded);
        assert_eq!(state.player.pos.y, 614.0);
        assert_eq!(count(&events, &GameEvent::Sound(SoundEffect::Land)), 1);
        assert_eq!(state.progress.score, 150);

        let events = run_ticks(&mut state, &jump(), 1);
        assert!(state.player.vel.y < 0.0);
        assert!(!state.player.grounded);
        assert_eq!(state.player.jumps_remaining, 1);
        assert_eq!(count(&events, &GameEvent::Sound(SoundEffect::Jump)), 1);
    }

    #[test]
    fn test_landing_reactions_are_debounced() {
        let (mut state, id) = lone_platform(PlatformKindTag::Normal, 4);
        let events = run_ticks(&mut state, &TickInput::default(), 60);
        let land = GameEvent::Sound(SoundEffect::PlatformLand(PlatformKindTag::Normal));
        assert_eq!(count(&events, &land), 1);
        assert!(state.platform(id).expect("platform").landing_cooldown > 0.0);

        // Resting past the cooldown fires the reaction again, but no new score
        let events = run_ticks(&mut state, &TickInput::default(), 70);
        assert_eq!(count(&events, &land), 1);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ScoreChanged { .. })));
        assert_eq!(state.progress.score, 200);
    }

    #[test]
    fn test_breakable_platform_lifecycle() {
        let (mut state, id) = lone_platform(PlatformKindTag::Breakable, 2);
        run_ticks(&mut state, &TickInput::default(), 30);
        let platform = state.platform(id).expect("platform");
        assert!(matches!(
            platform.kind,
            PlatformKind::Breakable {
                stage: BreakStage::Cracking { .. }
            }
        ));
        assert!(state.player.grounded);

        // Break delay elapses: platform stops being solid and the player drops
        let events = run_ticks(&mut state, &TickInput::default(), 100);
        assert_eq!(count(&events, &GameEvent::PlatformBroken { id }), 1);
        assert!(!state.platform(id).expect("platform").active);
        assert!(!state.player.grounded);

        // Then it is removed after the trailing delay
        run_ticks(&mut state, &TickInput::default(), 40);
        assert!(state.platform(id).is_none());
    }

    #[test]
    fn test_bouncy_platform_launches() {
        let (mut state, _) = lone_platform(PlatformKindTag::Bouncy, 1);
        let mut boosted = false;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            let events = state.drain_events();
            if events.contains(&GameEvent::Sound(SoundEffect::Boost)) {
                assert_eq!(state.player.vel.y, -700.0);
                assert_eq!(state.player.jumps_remaining, state.player.max_jumps);
                boosted = true;
                break;
            }
        }
        assert!(boosted);
    }

    #[test]
    fn test_jump_from_bouncy_platform_is_stronger() {
        let (mut state, id) = lone_platform(PlatformKindTag::Bouncy, 1);
        // Hold the landing reaction off so the player can stand on it
        state.platform_mut(id).expect("platform").landing_cooldown = 100.0;
        run_ticks(&mut state, &TickInput::default(), 60);
        assert!(state.player.grounded);

        run_ticks(&mut state, &jump(), 1);
        // Doubled jump force plus one step of gravity
        let expected = -1000.0 + 800.0 * SIM_DT;
        assert!((state.player.vel.y - expected).abs() < 1e-3);
    }

    /// Height gained by a jump from rest, holding `held` after the first tick
    fn jump_rise(first: &TickInput, held: bool) -> f32 {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 1);
        run_ticks(&mut state, &TickInput::default(), 60);
        let start = state.player.pos.y;
        run_ticks(&mut state, first, 1);
        let after = TickInput {
            jump_held: held,
            ..Default::default()
        };
        let mut apex = state.player.pos.y;
        while state.player.vel.y < 0.0 {
            run_ticks(&mut state, &after, 1);
            apex = apex.min(state.player.pos.y);
        }
        start - apex
    }

    #[test]
    fn test_tap_jump_is_a_short_hop() {
        let tap = TickInput {
            jump_pressed: true,
            ..Default::default()
        };
        let full = jump_rise(&jump(), true);
        let short = jump_rise(&jump(), false);
        let tapped = jump_rise(&tap, false);
        assert!(full > 140.0);
        assert!(short < full * 0.5);
        assert!(tapped < full * 0.5);
    }

    #[test]
    fn test_side_contact_with_bouncy_platform_does_not_boost() {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 1);
        run_ticks(&mut state, &TickInput::default(), 60);
        let bouncy = state.spawn_platform(Vec2::new(300.0, 614.0), PlatformKindTag::Bouncy, 2);

        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let events = run_ticks(&mut state, &right, 30);
        assert_eq!(state.player.pos.x, 260.0);
        assert!(state.player.touching.right);
        assert!(state.player.grounded);
        assert_eq!(count(&events, &GameEvent::Sound(SoundEffect::Boost)), 0);
        let bouncy_land = GameEvent::Sound(SoundEffect::PlatformLand(PlatformKindTag::Bouncy));
        assert_eq!(count(&events, &bouncy_land), 0);
        assert_eq!(state.platform(bouncy).expect("platform").landing_cooldown, 0.0);
        assert_eq!(state.progress.highest_platform_index, 1);
    }

    #[test]
    fn test_walls_stop_horizontal_motion() {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 1);
        state.player.pos = Vec2::new(12.0, 600.0);
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        run_ticks(&mut state, &left, 10);
        assert_eq!(state.player.pos.x, 8.0);
        assert_eq!(state.player.vel.x, 0.0);
    }

    #[test]
    fn test_pickup_on_overlap() {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 1);
        let item = state.spawn_collectible(Vec2::new(240.0, 610.0));
        let events = run_ticks(&mut state, &TickInput::default(), 60);
        assert!(state.collectibles.iter().all(|c| c.id != item));
        assert_eq!(state.progress.items_collected, 1);
        assert_eq!(count(&events, &GameEvent::Sound(SoundEffect::Collect)), 1);
        assert_eq!(state.progress.score, 50 + 100);
    }

    #[test]
    fn test_fall_ends_run() {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 1);
        state.player.pos = Vec2::new(240.0, 810.0);
        run_ticks(&mut state, &TickInput::default(), 1);
        assert!(state.is_over());
        assert_eq!(state.summary.map(|s| s.reason), Some(EndReason::Fell));

        // Nothing moves after the end
        let pos = state.player.pos;
        run_ticks(&mut state, &TickInput::default(), 10);
        assert_eq!(state.player.pos, pos);
    }

    #[test]
    fn test_time_up_wins_over_fall() {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 1);
        state.player.pos = Vec2::new(240.0, 900.0);
        state.clock.remaining = 0.0;
        assert_eq!(check_termination(&mut state), Some(EndReason::TimeUp));
        assert_eq!(check_termination(&mut state), None);
    }

    #[test]
    fn test_clock_counts_down_and_ends() {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 1);
        let view = FixedView {
            scroll_y: 0.0,
            height: 800.0,
        };
        clock(&mut state, 1500.0, &view);
        assert!((state.clock.remaining - 58.5).abs() < 1e-4);
        let hud = state
            .drain_events()
            .into_iter()
            .find_map(|e| match e {
                GameEvent::Hud(hud) => Some(hud),
                _ => None,
            })
            .expect("hud");
        assert!((hud.time_remaining - 58.5).abs() < 1e-4);

        clock(&mut state, 60_000.0, &view);
        assert_eq!(state.summary.map(|s| s.reason), Some(EndReason::TimeUp));
        assert_eq!(state.clock.remaining, 0.0);
    }

    #[test]
    fn test_clock_cleans_up_below_view() {
        let (mut state, keep) = lone_platform(PlatformKindTag::Normal, 1);
        let low = state.spawn_platform(Vec2::new(100.0, 900.0), PlatformKindTag::Normal, 2);
        let item = state.spawn_collectible(Vec2::new(100.0, 850.0));
        let view = FixedView {
            scroll_y: 0.0,
            height: 800.0,
        };
        clock(&mut state, 100.0, &view);
        assert!(state.platform(keep).is_some());
        assert!(state.platform(low).is_none());
        assert!(state.collectibles.iter().all(|c| c.id != item));
    }

    #[test]
    fn test_clock_extends_world_upward() {
        let (mut state, _) = lone_platform(PlatformKindTag::Normal, 1);
        let frontier = state.generator.frontier_y;
        let view = FixedView {
            scroll_y: frontier + 100.0,
            height: 800.0,
        };
        clock(&mut state, 100.0, &view);
        assert_eq!(state.generator.frontier_y, frontier - 80.0);
        assert!(state.platforms.len() > 1);

        // Generated once per clock even when the view is far above
        let count = state.platforms.len();
        clock(&mut state, 200.0, &view);
        assert!(state.platforms.len() - count <= 4);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999, Tuning::default());
        let mut b = GameState::new(99999, Tuning::default());
        a.start(0.0);
        b.start(0.0);

        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            jump(),
            TickInput {
                jump_held: true,
                left: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for step in 0..600 {
            let input = &inputs[(step / 30) % inputs.len()];
            tick(&mut a, input, SIM_DT);
            tick(&mut b, input, SIM_DT);
            if step % 12 == 0 {
                let now = step as f64 * 1000.0 / 120.0;
                let view = FixedView {
                    scroll_y: a.player.pos.y - 500.0,
                    height: 800.0,
                };
                clock(&mut a, now, &view);
                clock(&mut b, now, &view);
            }
        }
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.progress.score, b.progress.score);
        assert_eq!(a.platforms.len(), b.platforms.len());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    proptest! {
        #[test]
        fn prop_jump_budget_and_score_law(
            inputs in proptest::collection::vec(any::<(bool, bool, bool, bool)>(), 1..400),
        ) {
            let mut state = GameState::new(7, Tuning::default());
            state.start(0.0);
            let mut highest = state.progress.highest_platform_index;
            for (left, right, jump_held, jump_pressed) in inputs {
                let input = TickInput { left, right, jump_held, jump_pressed };
                tick(&mut state, &input, SIM_DT);
                prop_assert!(state.player.jumps_remaining <= state.player.max_jumps);
                prop_assert!(state.progress.highest_platform_index >= highest);
                highest = state.progress.highest_platform_index;
                prop_assert_eq!(
                    state.progress.score,
                    state.progress.compute_score(&state.tuning.scoring)
                );
            }
        }
    }
}
