use tileworld_core::{
    BootKind, Command, CreatureKind, DeathCause, Direction, Event, Floor, LevelBuilder, Position,
    Prng, Ruleset, SoundEffect, TickOutcome,
};
use tileworld_system_rules::{advance, rules_for, Rules};
use tileworld_world::{CellFlags, GameState, InvariantPolicy, StartConditions, CHIP_INDEX};

fn at(x: u16, y: u16) -> Position {
    Position::from_xy(x, y).expect("position on grid")
}

fn start(builder: LevelBuilder, ruleset: Ruleset, start: StartConditions) -> GameState {
    GameState::new(&builder.build(), ruleset, start).expect("valid level")
}

/// Advances one tick per command and returns every event fired.
fn play<I>(state: &mut GameState, rules: &dyn Rules, commands: I) -> Vec<Event>
where
    I: IntoIterator<Item = Command>,
{
    let mut events = Vec::new();
    for command in commands {
        let _ = advance(state, rules, command, InvariantPolicy::Abort, &mut events)
            .expect("invariants hold");
    }
    events
}

fn once(command: Command, then_wait: usize) -> Vec<Command> {
    let mut commands = vec![command];
    commands.extend(std::iter::repeat(Command::Wait).take(then_wait));
    commands
}

fn slot_at(state: &GameState, position: Position) -> usize {
    state.occupant(position).expect("creature present")
}

fn kind_at(state: &GameState, position: Position) -> Option<CreatureKind> {
    state
        .occupant(position)
        .map(|slot| state.creatures()[slot].kind())
}

/// Ticks Chip needs to walk one tile.
fn tile_ticks(ruleset: Ruleset) -> usize {
    match ruleset {
        Ruleset::Ms => 2,
        Ruleset::Lynx => 4,
    }
}

/// Commands for a single step of Chip, followed by waits until he arrives.
fn step(ruleset: Ruleset, dir: Direction) -> Vec<Command> {
    once(Command::Move(dir), tile_ticks(ruleset) - 1)
}

#[test]
fn movement_fills_every_decision_beat() {
    for (ruleset, chip_tiles, ball_tiles) in [(Ruleset::Ms, 16, 8), (Ruleset::Lynx, 8, 8)] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .creature(at(1, 3), CreatureKind::Ball, Direction::East);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);
        let ball = slot_at(&state, at(1, 3));

        let _ = play(
            &mut state,
            rules.as_ref(),
            vec![Command::Move(Direction::East); 32],
        );
        let chip = state.chip().copied().expect("chip");
        let ball = state.creatures()[ball];
        assert_eq!(chip.pos(), at(1 + chip_tiles, 1), "{ruleset:?} chip");
        assert_eq!(ball.pos(), at(1 + ball_tiles, 3), "{ruleset:?} ball");
        assert!(!chip.is_moving() && !ball.is_moving(), "{ruleset:?}");
    }
}

#[test]
fn beartrap_releases_on_the_tick_after_its_button_is_pressed() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .floor(at(2, 1), Floor::ButtonBrown)
            .floor(at(5, 5), Floor::Beartrap)
            .creature(at(5, 5), CreatureKind::Tank, Direction::East)
            .trap(at(2, 1), at(5, 5));
        let conditions = StartConditions {
            stepping: 1,
            ..StartConditions::default()
        };
        let mut state = start(builder, ruleset, conditions);
        let rules = rules_for(ruleset);
        let tank = slot_at(&state, at(5, 5));

        let _ = play(&mut state, rules.as_ref(), step(ruleset, Direction::East));
        assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(2, 1)));
        assert_eq!(state.creatures()[tank].pos(), at(5, 5), "{ruleset:?} trap still shut");
        assert!(state
            .cell(at(5, 5))
            .flags()
            .contains(CellFlags::RELEASE_PENDING));

        // Chip steps off the button straight away, so only the release frees the tank.
        let _ = play(&mut state, rules.as_ref(), [Command::Move(Direction::East)]);
        assert_eq!(state.creatures()[tank].pos(), at(6, 5), "{ruleset:?}");
        assert!(state.cell(at(5, 5)).flags().is_empty());
    }
}

#[test]
fn cloners_fire_on_the_ruleset_parity() {
    let builder = || {
        LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .floor(at(2, 1), Floor::ButtonRed)
            .floor(at(5, 5), Floor::CloneMachine)
            .creature(at(5, 5), CreatureKind::Ball, Direction::East)
            .cloner(at(2, 1), at(5, 5))
    };

    let conditions = StartConditions {
        stepping: 1,
        ..StartConditions::default()
    };
    let mut state = start(builder(), Ruleset::Ms, conditions);
    let rules = rules_for(Ruleset::Ms);
    let _ = play(&mut state, rules.as_ref(), once(Command::Move(Direction::East), 2));
    assert_eq!(state.creatures().len(), 2, "MS waits for its quarter beat");
    assert!(state.cell(at(5, 5)).flags().contains(CellFlags::PRIMED));

    let events = play(&mut state, rules.as_ref(), [Command::Wait]);
    assert_eq!(state.creatures().len(), 3);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::CreatureCloned { kind: CreatureKind::Ball, .. })));
    assert_eq!(
        state.creatures()[2].pos(),
        at(6, 5),
        "copy leaves the machine at once"
    );
    assert_eq!(state.occupant(at(5, 5)), Some(1), "original stays inside");

    let mut state = start(builder(), Ruleset::Lynx, StartConditions::default());
    let rules = rules_for(Ruleset::Lynx);
    let _ = play(&mut state, rules.as_ref(), once(Command::Move(Direction::East), 3));
    assert_eq!(state.creatures().len(), 2);
    let _ = play(&mut state, rules.as_ref(), [Command::Wait]);
    assert_eq!(state.creatures().len(), 3, "Lynx fires on the next even tick");
}

#[test]
fn ms_random_slides_draw_from_the_seeded_stream() {
    let seed = 0x1234_5678;
    let builder = || {
        LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .floor(at(2, 1), Floor::SlideRandom)
    };
    let conditions = StartConditions {
        seed,
        ..StartConditions::default()
    };

    let mut stream = Prng::new(seed);
    let first = Direction::from_index(stream.next4()).expect("two-bit draw");
    let second = Direction::from_index(stream.next4()).expect("two-bit draw");

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut state = start(builder(), Ruleset::Ms, conditions);
        let rules = rules_for(Ruleset::Ms);
        let mut drawn = Vec::new();

        let _ = play(&mut state, rules.as_ref(), step(Ruleset::Ms, Direction::East));
        let chip = state.chip().copied().expect("chip");
        assert_eq!(chip.pos(), at(2, 1));
        assert!(state.slip_list().contains(CHIP_INDEX));
        drawn.push(chip.fdir());

        // The slide token lets Chip step back off and onto the slide again.
        let _ = play(&mut state, rules.as_ref(), step(Ruleset::Ms, Direction::West));
        assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(1, 1)));
        assert!(state.slip_list().is_empty());

        let _ = play(&mut state, rules.as_ref(), step(Ruleset::Ms, Direction::East));
        let chip = state.chip().copied().expect("chip");
        assert_eq!(chip.pos(), at(2, 1));
        drawn.push(chip.fdir());

        assert_eq!(drawn, vec![first, second]);
        runs.push(drawn);
    }
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn lynx_random_slides_turn_clockwise_from_the_latched_direction() {
    let builder = LevelBuilder::new(1)
        .creature(at(1, 1), CreatureKind::Chip, Direction::East)
        .floor(at(2, 1), Floor::SlideRandom)
        .floor(at(2, 0), Floor::Wall);
    let conditions = StartConditions {
        random_slide_dir: Direction::West,
        ..StartConditions::default()
    };
    let mut state = start(builder, Ruleset::Lynx, conditions);
    let rules = rules_for(Ruleset::Lynx);

    let _ = play(&mut state, rules.as_ref(), step(Ruleset::Lynx, Direction::East));
    assert_eq!(state.random_slide_dir(), Direction::North);
    assert_eq!(state.chip().map(|chip| chip.fdir()), Some(Direction::North));

    // West crosses the slide's axis, so Chip may leave and come back.
    let _ = play(&mut state, rules.as_ref(), step(Ruleset::Lynx, Direction::West));
    assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(1, 1)));
    let _ = play(&mut state, rules.as_ref(), step(Ruleset::Lynx, Direction::East));
    assert_eq!(state.random_slide_dir(), Direction::East);
    assert_eq!(state.chip().map(|chip| chip.fdir()), Some(Direction::East));
}

#[test]
fn chip_may_leave_a_blocked_slide_by_ruleset() {
    let builder = || {
        LevelBuilder::new(1)
            .creature(at(1, 5), CreatureKind::Chip, Direction::East)
            .floor(at(2, 5), Floor::SlideEast)
            .floor(at(3, 5), Floor::Wall)
    };

    // MS: walking onto the slide grants a token that permits any direction.
    let mut state = start(builder(), Ruleset::Ms, StartConditions::default());
    let rules = rules_for(Ruleset::Ms);
    let _ = play(&mut state, rules.as_ref(), once(Command::Move(Direction::East), 3));
    assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(2, 5)), "held by the wall");
    assert!(state.slip_list().contains(CHIP_INDEX));
    let _ = play(&mut state, rules.as_ref(), [Command::Move(Direction::West)]);
    assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(1, 5)));
    assert!(state.slip_list().is_empty());

    // Lynx: only a turn across the slide's axis is obeyed.
    let mut state = start(builder(), Ruleset::Lynx, StartConditions::default());
    let rules = rules_for(Ruleset::Lynx);
    let _ = play(&mut state, rules.as_ref(), once(Command::Move(Direction::East), 3));
    let _ = play(&mut state, rules.as_ref(), [Command::Move(Direction::West)]);
    assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(2, 5)));
    let _ = play(&mut state, rules.as_ref(), [Command::Move(Direction::North)]);
    assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(2, 4)));
}

#[test]
fn sockets_open_only_once_every_chip_is_collected() {
    let builder = |needed| {
        LevelBuilder::new(1)
            .chips_needed(needed)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .floor(at(2, 1), Floor::IcChip)
            .floor(at(3, 1), Floor::Socket)
            .floor(at(4, 1), Floor::Exit)
    };
    let rules = rules_for(Ruleset::Ms);
    let east = vec![Command::Move(Direction::East); 16];

    let mut state = start(builder(1), Ruleset::Ms, StartConditions::default());
    let events = play(&mut state, rules.as_ref(), east.clone());
    assert_eq!(state.outcome(), TickOutcome::Completed);
    assert_eq!(state.cell(at(3, 1)).floor(), Floor::Empty);
    assert!(events.contains(&Event::LevelCompleted));

    let mut state = start(builder(2), Ruleset::Ms, StartConditions::default());
    let events = play(&mut state, rules.as_ref(), east);
    assert_eq!(state.outcome(), TickOutcome::Continue);
    assert_eq!(state.chips_needed(), 1);
    assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(2, 1)));
    assert!(events.contains(&Event::Sound {
        effect: SoundEffect::Bump
    }));
}

#[test]
fn teleport_search_wraps_around_the_grid() {
    let builder = || {
        LevelBuilder::new(1)
            .creature(at(30, 31), CreatureKind::Chip, Direction::East)
            .floor(at(31, 31), Floor::Teleport)
            .floor(at(0, 0), Floor::Teleport)
    };
    let rules = rules_for(Ruleset::Ms);

    let mut state = start(builder(), Ruleset::Ms, StartConditions::default());
    let events = play(&mut state, rules.as_ref(), once(Command::Move(Direction::East), 7));
    assert!(events.contains(&Event::CreatureTeleported {
        slot: CHIP_INDEX,
        from: at(31, 31),
        to: at(0, 0),
    }));
    assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(1, 0)));
}

#[test]
fn chip_bounces_off_a_teleport_with_no_usable_exit() {
    let builder = LevelBuilder::new(1)
        .creature(at(30, 31), CreatureKind::Chip, Direction::East)
        .floor(at(31, 31), Floor::Teleport)
        .floor(at(0, 0), Floor::Teleport)
        .floor(at(1, 0), Floor::Wall);
    let rules = rules_for(Ruleset::Ms);
    let mut state = start(builder, Ruleset::Ms, StartConditions::default());

    let events = play(&mut state, rules.as_ref(), once(Command::Move(Direction::East), 11));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::CreatureTeleported { .. })));

    let chip = state.chip().copied().expect("chip");
    assert!(!chip.is_dead());
    assert_eq!(chip.pos(), at(30, 31));
    assert_eq!(chip.dir(), Direction::West);
    assert!(state.slip_list().is_empty());
}

#[test]
fn teeth_close_in_along_the_longer_axis() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(12, 11), CreatureKind::Chip, Direction::South)
            .creature(at(10, 10), CreatureKind::Teeth, Direction::North);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);
        let teeth = slot_at(&state, at(10, 10));

        let _ = play(&mut state, rules.as_ref(), [Command::Wait]);
        let hunter = state.creatures()[teeth];
        assert_eq!(hunter.pos(), at(11, 10), "{ruleset:?}");
        assert_eq!(hunter.dir(), Direction::East);
    }
}

#[test]
fn monsters_missing_from_the_ms_list_stay_put() {
    let mut setup = LevelBuilder::new(1)
        .creature(at(1, 1), CreatureKind::Chip, Direction::South)
        .creature(at(10, 10), CreatureKind::Tank, Direction::East)
        .build();
    setup.creatures.clear();

    let mut state = GameState::new(&setup, Ruleset::Ms, StartConditions::default())
        .expect("valid level");
    let rules = rules_for(Ruleset::Ms);
    let _ = play(&mut state, rules.as_ref(), vec![Command::Wait; 8]);
    assert_eq!(state.occupant(at(10, 10)), Some(1));

    let mut state = GameState::new(&setup, Ruleset::Lynx, StartConditions::default())
        .expect("valid level");
    let rules = rules_for(Ruleset::Lynx);
    let _ = play(&mut state, rules.as_ref(), [Command::Wait]);
    assert_eq!(state.occupant(at(11, 10)), Some(1));
}

#[test]
fn running_out_of_time_kills_chip() {
    let builder = LevelBuilder::new(1)
        .time_limit(1)
        .creature(at(1, 1), CreatureKind::Chip, Direction::South);
    let mut state = start(builder, Ruleset::Lynx, StartConditions::default());
    let rules = rules_for(Ruleset::Lynx);

    let events = play(&mut state, rules.as_ref(), vec![Command::Wait; 25]);
    assert_eq!(
        state.outcome(),
        TickOutcome::Died(tileworld_core::DeathCause::OutOfTime)
    );
    assert_eq!(state.tick(), 20, "no ticks run once the attempt is over");
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::ChipDied { .. }))
            .count(),
        1
    );
}

#[test]
fn blue_buttons_reverse_tanks_outside_clone_machines() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .floor(at(2, 1), Floor::ButtonBlue)
            .floor(at(10, 9), Floor::Wall)
            .creature(at(10, 10), CreatureKind::Tank, Direction::North)
            .floor(at(5, 5), Floor::CloneMachine)
            .creature(at(5, 5), CreatureKind::Tank, Direction::East);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);
        let free = slot_at(&state, at(10, 10));
        let cloned = slot_at(&state, at(5, 5));

        let events = play(&mut state, rules.as_ref(), step(ruleset, Direction::East));
        assert!(events.contains(&Event::Sound {
            effect: SoundEffect::ButtonPressed
        }));
        assert_eq!(state.creatures()[free].pos(), at(10, 10), "{ruleset:?}");
        assert_eq!(state.creatures()[free].dir(), Direction::South, "{ruleset:?}");
        assert_eq!(state.creatures()[cloned].dir(), Direction::East, "{ruleset:?}");
    }
}

#[test]
fn green_buttons_swap_switch_walls() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .floor(at(2, 1), Floor::ButtonGreen)
            .floor(at(5, 5), Floor::SwitchWallClosed)
            .floor(at(6, 6), Floor::SwitchWallOpen);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);

        let _ = play(&mut state, rules.as_ref(), step(ruleset, Direction::East));
        assert_eq!(state.cell(at(5, 5)).floor(), Floor::SwitchWallOpen, "{ruleset:?}");
        assert_eq!(state.cell(at(6, 6)).floor(), Floor::SwitchWallClosed, "{ruleset:?}");
    }
}

#[test]
fn hazards_kill_chip_without_the_right_boots() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        for (floor, cause) in [
            (Floor::Water, DeathCause::Drowned),
            (Floor::Fire, DeathCause::Burned),
            (Floor::Bomb, DeathCause::Bombed),
        ] {
            let builder = LevelBuilder::new(1)
                .creature(at(1, 1), CreatureKind::Chip, Direction::East)
                .floor(at(2, 1), floor);
            let mut state = start(builder, ruleset, StartConditions::default());
            let rules = rules_for(ruleset);

            let events = play(&mut state, rules.as_ref(), step(ruleset, Direction::East));
            assert_eq!(state.outcome(), TickOutcome::Died(cause), "{ruleset:?} {floor:?}");
            assert!(events.contains(&Event::ChipDied { cause }));
            if floor == Floor::Bomb {
                assert_eq!(state.cell(at(2, 1)).floor(), Floor::Empty, "bomb goes off");
            }
        }
    }
}

#[test]
fn gliders_swim_and_fireballs_walk_through_fire() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::South)
            .floor(at(6, 5), Floor::Water)
            .creature(at(5, 5), CreatureKind::Glider, Direction::East)
            .floor(at(6, 7), Floor::Fire)
            .creature(at(5, 7), CreatureKind::Fireball, Direction::East)
            .floor(at(6, 9), Floor::Water)
            .creature(at(5, 9), CreatureKind::Ball, Direction::East);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);

        let events = play(&mut state, rules.as_ref(), vec![Command::Wait; 4]);
        assert_eq!(kind_at(&state, at(6, 5)), Some(CreatureKind::Glider), "{ruleset:?}");
        assert_eq!(kind_at(&state, at(6, 7)), Some(CreatureKind::Fireball), "{ruleset:?}");
        assert_eq!(kind_at(&state, at(6, 9)), None, "{ruleset:?}");
        assert!(events.iter().any(|event| matches!(
            event,
            Event::CreatureDied {
                kind: CreatureKind::Ball,
                ..
            }
        )));
        assert_eq!(state.outcome(), TickOutcome::Continue);
    }
}

#[test]
fn blocks_fill_water_with_dirt() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .creature(at(2, 1), CreatureKind::Block, Direction::North)
            .floor(at(3, 1), Floor::Water);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);

        let _ = play(&mut state, rules.as_ref(), step(ruleset, Direction::East));
        assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(2, 1)), "{ruleset:?}");
        assert_eq!(state.cell(at(3, 1)).floor(), Floor::Dirt, "{ruleset:?}");
        assert_eq!(kind_at(&state, at(3, 1)), None);

        let _ = play(&mut state, rules.as_ref(), step(ruleset, Direction::East));
        assert_eq!(state.chip().map(|chip| chip.pos()), Some(at(3, 1)), "{ruleset:?}");
        assert_eq!(state.cell(at(3, 1)).floor(), Floor::Empty, "Chip clears the dirt");
        assert_eq!(state.outcome(), TickOutcome::Continue);
    }
}

#[test]
fn ice_corners_turn_chip() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 2), CreatureKind::Chip, Direction::North)
            .floor(at(1, 1), Floor::IceWallNorthwest);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);

        let events = play(&mut state, rules.as_ref(), once(Command::Move(Direction::North), 7));
        assert!(events.contains(&Event::CreatureMoved {
            slot: CHIP_INDEX,
            kind: CreatureKind::Chip,
            from: at(1, 1),
            to: at(2, 1),
            direction: Direction::East,
        }));
        let chip = state.chip().copied().expect("chip");
        assert_eq!(chip.pos(), at(2, 1), "{ruleset:?}");
        assert_eq!(chip.dir(), Direction::East);
        assert!(!chip.is_moving());
        assert!(state.slip_list().is_empty());
    }
}

#[test]
fn chip_bounces_back_off_blocked_ice() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .floor(at(2, 1), Floor::Ice)
            .floor(at(3, 1), Floor::Wall);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);

        let _ = play(&mut state, rules.as_ref(), once(Command::Move(Direction::East), 7));
        let chip = state.chip().copied().expect("chip");
        assert_eq!(chip.pos(), at(1, 1), "{ruleset:?}");
        assert_eq!(chip.dir(), Direction::West, "{ruleset:?}");
        assert!(!chip.is_moving());
        assert!(state.slip_list().is_empty());
    }
}

#[test]
fn thieves_take_every_boot() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::East)
            .floor(at(2, 1), Floor::BootsFire)
            .floor(at(3, 1), Floor::Thief);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);

        let _ = play(&mut state, rules.as_ref(), step(ruleset, Direction::East));
        assert!(state.possessions().has_boots(BootKind::Fire), "{ruleset:?}");

        let events = play(&mut state, rules.as_ref(), step(ruleset, Direction::East));
        assert!(!state.possessions().has_boots(BootKind::Fire), "{ruleset:?}");
        assert!(events.contains(&Event::Sound {
            effect: SoundEffect::Thief
        }));
        assert_eq!(state.cell(at(3, 1)).floor(), Floor::Thief, "the thief stays");
    }
}

#[test]
fn bugs_and_walkers_steer_around_fire() {
    for ruleset in [Ruleset::Ms, Ruleset::Lynx] {
        let builder = LevelBuilder::new(1)
            .creature(at(1, 1), CreatureKind::Chip, Direction::South)
            .creature(at(20, 20), CreatureKind::Bug, Direction::North)
            .floor(at(19, 20), Floor::Fire)
            .floor(at(20, 19), Floor::Fire)
            .creature(at(10, 10), CreatureKind::Walker, Direction::East)
            .floor(at(11, 10), Floor::Fire)
            .floor(at(10, 9), Floor::Wall)
            .floor(at(10, 11), Floor::Wall);
        let mut state = start(builder, ruleset, StartConditions::default());
        let rules = rules_for(ruleset);

        let _ = play(&mut state, rules.as_ref(), [Command::Wait]);
        assert_eq!(kind_at(&state, at(21, 20)), Some(CreatureKind::Bug), "{ruleset:?}");
        assert_eq!(kind_at(&state, at(9, 10)), Some(CreatureKind::Walker), "{ruleset:?}");
        assert_eq!(state.creatures().len(), 3, "nobody burned");
    }
}
