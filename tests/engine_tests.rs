/// Engine integration tests — full playthroughs of the sample script.

use dialogue_engine::core::engine::{Engine, EngineState, Event};
use dialogue_engine::core::host::{HostCall, RecordingHost};

fn lighthouse() -> Engine {
    Engine::builder()
        .script_file("scripts/old_lighthouse.txt")
        .config_file("tests/fixtures/test_config.ron")
        .build()
        .unwrap()
}

fn fire_timer(engine: &mut Engine, host: &mut RecordingHost) -> EngineState {
    let token = host.pending_timer.take().expect("a timer should be pending");
    engine.handle(Event::TimerElapsed(token), host).unwrap()
}

#[test]
fn full_playthrough_to_ending() {
    let mut engine = lighthouse();
    let mut host = RecordingHost::new();

    // Opening: five scene-setting commands run ahead of the first line.
    engine.handle(Event::Advance, &mut host).unwrap();
    assert_eq!(host.calls.len(), 6);
    assert_eq!(host.calls[0], HostCall::SetHudVisible { visible: false });
    assert!(matches!(
        &host.calls[5],
        HostCall::ShowLine { narrator: true, .. }
    ));

    engine.handle(Event::Advance, &mut host).unwrap();
    assert_eq!(
        engine.handle(Event::Advance, &mut host).unwrap(),
        EngineState::AwaitingChoice
    );
    assert!(host.calls.iter().any(|call| matches!(
        call,
        HostCall::ShowMenu { prompt } if prompt.narrator_context && prompt.choices.len() == 3
    )));

    // Into the stairwell.
    engine.handle(Event::Choose(0), &mut host).unwrap();
    assert_eq!(engine.current_block(), 1);
    assert_eq!(host.shown_lines().last(), Some(&"Hello? Is anyone up there?"));

    assert_eq!(
        engine.handle(Event::Advance, &mut host).unwrap(),
        EngineState::AwaitingTimer
    );
    assert_eq!(fire_timer(&mut engine, &mut host), EngineState::Presenting);
    assert_eq!(
        host.shown_lines().last(),
        Some(&"Somewhere high above, metal scrapes on metal.")
    );

    // Last stairwell line falls through to the lamp room.
    engine.handle(Event::Advance, &mut host).unwrap();
    assert_eq!(engine.current_block(), 3);

    assert_eq!(
        engine.handle(Event::Advance, &mut host).unwrap(),
        EngineState::AwaitingTimer
    );
    assert!(host.calls.contains(&HostCall::PlayMusic { name: None }));
    fire_timer(&mut engine, &mut host);
    assert_eq!(
        host.shown_lines().last(),
        Some(&"You came. I wondered if anyone still watched the shore.")
    );

    engine.handle(Event::Advance, &mut host).unwrap();
    assert_eq!(
        engine.handle(Event::Advance, &mut host).unwrap(),
        EngineState::AwaitingChoice
    );

    engine.handle(Event::Choose(0), &mut host).unwrap();
    assert_eq!(engine.current_block(), 4);
    engine.handle(Event::Advance, &mut host).unwrap();
    assert_eq!(
        engine.handle(Event::Advance, &mut host).unwrap(),
        EngineState::Idle
    );
    assert_eq!(host.calls.last(), Some(&HostCall::FadeOut));
    assert!(!host.calls.contains(&HostCall::ExitToMenu));
}

#[test]
fn going_home_exits_to_menu() {
    let mut engine = lighthouse();
    let mut host = RecordingHost::new();

    for _ in 0..3 {
        engine.handle(Event::Advance, &mut host).unwrap();
    }
    assert_eq!(
        engine.handle(Event::Choose(2), &mut host).unwrap(),
        EngineState::Exiting
    );
    assert_eq!(host.calls.last(), Some(&HostCall::ExitToMenu));

    let before = host.calls.len();
    engine.handle(Event::Advance, &mut host).unwrap();
    engine.handle(Event::Choose(0), &mut host).unwrap();
    assert_eq!(host.calls.len(), before);
}

#[test]
fn ending_mid_wait_drops_the_timer() {
    let mut engine = lighthouse();
    let mut host = RecordingHost::new();

    for _ in 0..3 {
        engine.handle(Event::Advance, &mut host).unwrap();
    }
    engine.handle(Event::Choose(0), &mut host).unwrap();
    engine.handle(Event::Advance, &mut host).unwrap();
    assert!(engine.is_paused());

    let token = engine.pending_timer().unwrap();
    engine.end_session(&mut host);
    assert!(host.pending_timer.is_none());

    let shown = host.shown_lines().len();
    engine.handle(Event::TimerElapsed(token), &mut host).unwrap();
    assert_eq!(host.shown_lines().len(), shown);
}

#[test]
fn each_block_resolves_its_branch_once() {
    let mut engine = lighthouse();
    let mut host = RecordingHost::new();

    for _ in 0..10 {
        engine.handle(Event::Advance, &mut host).unwrap();
    }
    let menus = host
        .calls
        .iter()
        .filter(|call| matches!(call, HostCall::ShowMenu { .. }))
        .count();
    assert_eq!(menus, 1);
    assert_eq!(engine.state(), EngineState::AwaitingChoice);
}

#[test]
fn recorded_calls_serialize_for_embedding() {
    let mut engine = lighthouse();
    let mut host = RecordingHost::new();
    engine.handle(Event::Advance, &mut host).unwrap();

    let serialized = ron::to_string(&host.take_calls()).unwrap();
    assert!(serialized.contains("shore_night"));
}
