//! End-to-end runs of the simulation through its public API

use head_flap::consts::*;
use head_flap::renderer::final_score_text;
use head_flap::sim::{
    ControlMode, EndCause, GameEvent, GamePhase, GameState, Motion, Obstacle, TickInput, tick,
};
use head_flap::tuning::Tuning;

fn idle(mode: ControlMode) -> GameState {
    GameState::new(2024, Tuning::default(), mode)
}

#[test]
fn gravity_only_run_falls_out_without_scoring() {
    let mut state = idle(ControlMode::Impulse);
    assert!((state.entity.pos.y - 320.0).abs() < f32::EPSILON);
    state.start_run();

    let mut steps = 0;
    while state.phase == GamePhase::Running {
        assert_eq!(
            tick(&mut state, &TickInput::default(), SIM_DT),
            Some(Motion::Gravity)
        );
        steps += 1;
        assert!(steps < 1000, "entity never fell out");
    }

    // y(n) = 320 + 0.2 n (n + 1) crosses 640 after 40 steps
    assert_eq!(steps, 40);
    assert_eq!(state.phase, GamePhase::Ended);
    assert_eq!(state.score, 0.0);
    assert!(state.obstacles.is_empty());
    assert!(
        state
            .drain_events()
            .contains(&GameEvent::RunEnded(EndCause::FellOut))
    );
}

#[test]
fn score_from_a_pass_survives_falling_out() {
    let mut state = idle(ControlMode::Impulse);
    state.start_run();
    state.drain_events();

    // Trailing edge one unit ahead of the entity: the first scroll clears it
    state.obstacles.push(Obstacle {
        id: 900,
        x: ENTITY_X - OBSTACLE_WIDTH + 1.0,
        gap_center: 320.0,
        gap: GAP_SIZE,
        width: OBSTACLE_WIDTH,
        height: OBSTACLE_HEIGHT,
        passed: false,
    });

    tick(&mut state, &TickInput::default(), SIM_DT);
    assert_eq!(state.phase, GamePhase::Running);
    assert!(state.obstacles[0].passed);
    let after_pass = state.score;
    assert!((after_pass - SCORE_UNIT).abs() < f32::EPSILON);
    assert!(state.drain_events().contains(&GameEvent::ObstaclePassed));

    while state.phase == GamePhase::Running {
        tick(&mut state, &TickInput::default(), SIM_DT);
    }

    assert!(
        state
            .drain_events()
            .contains(&GameEvent::RunEnded(EndCause::FellOut))
    );
    assert_eq!(state.score, after_pass);
    assert_eq!(state.display_score(), 0);
    assert_eq!(
        final_score_text(&state).as_deref(),
        Some("Final Score: 0")
    );
}

#[test]
fn restart_resets_run_state() {
    let mut state = idle(ControlMode::Impulse);
    let flap = TickInput {
        trigger: true,
        ..Default::default()
    };

    // Hover around the middle long enough for obstacles to appear
    tick(&mut state, &flap, SIM_DT);
    for i in 0..400 {
        let input = if state.entity.pos.y > 330.0 && i % 2 == 0 {
            flap
        } else {
            TickInput::default()
        };
        tick(&mut state, &input, SIM_DT);
        if state.phase != GamePhase::Running {
            break;
        }
    }
    if state.phase == GamePhase::Running {
        state.end_run(EndCause::Collision);
    }
    assert!(!state.obstacles.is_empty());

    // A trigger from Ended restarts instead of flapping
    tick(&mut state, &flap, SIM_DT);
    assert_eq!(state.phase, GamePhase::Idle);
    assert!(state.obstacles.is_empty());
    assert_eq!(state.score, 0.0);
    assert_eq!(state.entity.vel_y, 0.0);
    assert!((state.entity.pos.y - ENTITY_START_Y).abs() < f32::EPSILON);
    assert_eq!(state.difficulty.level, 0);
    assert!((state.difficulty.scroll_speed - BASE_SCROLL_SPEED).abs() < f32::EPSILON);
    assert!(state.drain_events().contains(&GameEvent::Reset));

    // The next run starts cleanly
    tick(&mut state, &flap, SIM_DT);
    assert_eq!(state.phase, GamePhase::Running);
}

#[test]
fn passed_obstacles_are_pruned_after_leaving_the_field() {
    let mut state = idle(ControlMode::Tracked);
    state.start_run();
    state.obstacles.push(Obstacle {
        id: 500,
        x: -OBSTACLE_WIDTH - PRUNE_MARGIN + 1.0,
        gap_center: 320.0,
        gap: GAP_SIZE,
        width: OBSTACLE_WIDTH,
        height: OBSTACLE_HEIGHT,
        passed: true,
    });

    let hold = TickInput {
        signal: Some(0.5),
        ..Default::default()
    };
    tick(&mut state, &hold, SIM_DT);
    assert!(state.obstacles.iter().all(|o| o.id != 500));
    // Already passed: no double scoring on the way out
    assert_eq!(state.score, 0.0);
}

#[test]
fn difficulty_rises_and_spawns_speed_up_with_score() {
    let mut state = idle(ControlMode::Tracked);
    state.start_run();
    state.add_passes(40); // score 20 -> level 4

    assert_eq!(state.difficulty.level, 4);
    assert!(state.difficulty.scroll_speed < BASE_SCROLL_SPEED);
    assert!(state.difficulty.spawn_interval_ms < BASE_SPAWN_INTERVAL_MS);

    // Obstacles added now move at the faster speed
    let hold = TickInput {
        signal: Some(0.5),
        ..Default::default()
    };
    let steps = (state.difficulty.spawn_interval_ms / (SIM_DT * 1000.0)).ceil() as usize + 1;
    for _ in 0..steps {
        tick(&mut state, &hold, SIM_DT);
    }
    let first = &state.obstacles[0];
    assert!(first.x < OBSTACLE_SPAWN_X);
    assert!(first.gap_center - first.gap / 2.0 >= MIN_GAP_MARGIN - 0.001);
    assert!(first.gap_center + first.gap / 2.0 <= FIELD_HEIGHT - MIN_GAP_MARGIN + 0.001);
}
