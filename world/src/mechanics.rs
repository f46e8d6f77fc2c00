//! Movement, floor effects and wiring shared by both rulesets.

use tileworld_core::{
    BootKind, CreatureKind, DeathCause, Direction, Event, Floor, Position, Ruleset, SoundEffect,
    TickOutcome, MOVE_EIGHTHS,
};

use crate::{
    cell::CellFlags,
    creature::{Creature, CreatureFlags},
    laws::{law, LawClass},
    GameState, Probe, CHIP_INDEX,
};

fn sound(out_events: &mut Vec<Event>, effect: SoundEffect) {
    out_events.push(Event::Sound { effect });
}

impl GameState {
    /// Decides whether a creature may move one cell in `dir`.
    ///
    /// Stronger probes may change the state: [`Probe::Reveal`] turns hidden
    /// walls Chip bumps into into real walls, and [`Probe::Push`] also starts
    /// moving a block Chip walks into.
    pub fn can_move(
        &mut self,
        index: usize,
        dir: Direction,
        probe: Probe,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(creature) = self.creatures.get(index).copied() else {
            return false;
        };
        if creature.is_dead() {
            return false;
        }
        let Some(dest) = creature.pos.step(dir) else {
            return false;
        };

        let class = LawClass::of(creature.kind);
        let origin = self.cell(creature.pos).floor();
        if !law(self.ruleset, origin).can_exit(class, dir) {
            return false;
        }

        let released = creature.flags.contains(CreatureFlags::RELEASED);
        match origin {
            Floor::Beartrap if !released && !self.trap_open(creature.pos) => return false,
            Floor::CloneMachine if !released => return false,
            _ => {}
        }

        let floor = self.cell(dest).floor();
        match creature.kind {
            CreatureKind::Chip => self.chip_can_enter(dest, dir, probe, out_events),
            CreatureKind::Block => {
                law(self.ruleset, floor).can_enter(class, dir) && self.occupant(dest).is_none()
            }
            kind => {
                if !law(self.ruleset, floor).can_enter(class, dir) {
                    return false;
                }
                if floor == Floor::Fire && matches!(kind, CreatureKind::Bug | CreatureKind::Walker)
                {
                    return false;
                }
                self.occupant(dest)
                    .map_or(true, |other| self.creatures[other].is_chip())
            }
        }
    }

    /// Side-effect free form of [`GameState::can_move`].
    pub fn peek(&mut self, index: usize, dir: Direction) -> bool {
        let mut scratch = Vec::new();
        self.can_move(index, dir, Probe::Peek, &mut scratch)
    }

    fn chip_can_enter(
        &mut self,
        dest: Position,
        dir: Direction,
        probe: Probe,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let floor = self.cell(dest).floor();
        match floor {
            Floor::HiddenWallTemporary | Floor::BlueWallReal => {
                if probe != Probe::Peek {
                    self.cells[dest.index()].set_floor(Floor::Wall);
                    sound(out_events, SoundEffect::WallRevealed);
                }
                return false;
            }
            Floor::Socket if self.chips_needed > 0 => return false,
            _ => {}
        }
        if let Some(color) = floor.door() {
            if self.possessions.keys(color) == 0 {
                return false;
            }
        }
        if !law(self.ruleset, floor).can_enter(LawClass::Chip, dir) {
            return false;
        }

        let Some(other) = self.occupant(dest) else {
            return true;
        };
        let block = self.creatures[other];
        if block.kind != CreatureKind::Block {
            return true;
        }
        if block.is_moving() {
            return false;
        }
        if self.ruleset == Ruleset::Lynx && self.slip.contains(other) {
            return false;
        }
        if !self.can_move(other, dir, probe, out_events) {
            return false;
        }
        if let Probe::Push(speed) = probe {
            self.begin_move(other, dir, speed, false, out_events);
            sound(out_events, SoundEffect::BlockMoved);
        }
        true
    }

    /// Starts a voluntary move; the caller has already checked legality.
    pub fn start_move(
        &mut self,
        index: usize,
        dir: Direction,
        speed: u8,
        out_events: &mut Vec<Event>,
    ) {
        self.begin_move(index, dir, speed, false, out_events);
    }

    /// Turns a creature without moving it.
    pub fn face(&mut self, index: usize, dir: Direction) {
        if let Some(creature) = self.creatures.get_mut(index) {
            creature.dir = dir;
            creature.tdir = Some(dir);
        }
    }

    fn begin_move(
        &mut self,
        index: usize,
        dir: Direction,
        speed: u8,
        forced: bool,
        out_events: &mut Vec<Event>,
    ) {
        let Some(creature) = self.creatures.get(index).copied() else {
            return;
        };
        let Some(dest) = creature.pos.step(dir) else {
            return;
        };
        let from = creature.pos;

        if creature.is_chip() && self.cell(from).floor() == Floor::PopupWall {
            self.cells[from.index()].set_floor(Floor::Wall);
        }

        let mover = &mut self.creatures[index];
        mover.pos = dest;
        mover.dir = dir;
        mover.tdir = Some(dir);
        mover.moving = MOVE_EIGHTHS;
        mover.speed = speed.clamp(1, MOVE_EIGHTHS);
        if forced {
            mover.flags.insert(CreatureFlags::SLIDING);
        } else {
            mover.flags.remove(CreatureFlags::SLIDING);
        }
        mover.flags.remove(CreatureFlags::SLIDE_TOKEN);

        if !self.forced_for(creature.kind, self.cell(dest).floor()) {
            self.slip.remove(index);
        }

        out_events.push(Event::CreatureMoved {
            slot: index,
            kind: creature.kind,
            from,
            to: dest,
            direction: dir,
        });
        self.resolve_collision(index, out_events);
    }

    fn resolve_collision(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let mover = self.creatures[index];
        match mover.kind {
            CreatureKind::Block => {}
            CreatureKind::Chip => {
                let monster = self.creatures.iter().enumerate().find(|(slot, other)| {
                    *slot != index
                        && !other.is_dead()
                        && other.pos == mover.pos
                        && !matches!(other.kind, CreatureKind::Chip | CreatureKind::Block)
                });
                if let Some((_, monster)) = monster {
                    let kind = monster.kind;
                    self.kill_chip(DeathCause::Collided(kind), out_events);
                }
            }
            kind => {
                let caught = self
                    .chip()
                    .is_some_and(|chip| !chip.is_dead() && chip.pos == mover.pos);
                if caught {
                    self.kill_chip(DeathCause::Collided(kind), out_events);
                }
            }
        }
    }

    /// Moves a slipping creature along its forced direction.
    ///
    /// Returns whether the creature started moving. A creature that cannot
    /// move bounces back on ice, waits on slides (Chip gains a slide token)
    /// and, if it is Chip, reverses on a teleport.
    pub fn forced_move(
        &mut self,
        index: usize,
        speed: u8,
        push_speed: u8,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(creature) = self.creatures.get(index).copied() else {
            return false;
        };
        let fdir = creature.fdir;
        if self.can_move(index, fdir, Probe::Push(push_speed), out_events) {
            self.begin_move(index, fdir, speed, true, out_events);
            return true;
        }

        let floor = self.cell(creature.pos).floor();
        let stuck = &mut self.creatures[index];
        if floor.is_ice() || (floor == Floor::Teleport && stuck.is_chip()) {
            stuck.dir = fdir.back();
            stuck.fdir = fdir.back();
        } else if floor.is_slide() && stuck.is_chip() {
            stuck.flags.insert(CreatureFlags::SLIDE_TOKEN);
        }
        false
    }

    /// Advances every moving creature in slot order, applying arrival
    /// effects to those that complete their move.
    pub fn advance_movement(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.creatures.len() {
            let creature = &mut self.creatures[index];
            if creature.is_dead() || creature.moving == 0 {
                continue;
            }
            creature.moving = creature.moving.saturating_sub(creature.speed);
            if creature.moving == 0 {
                self.arrive(index, out_events);
            }
        }
    }

    fn arrive(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let creature = self.creatures[index];
        let floor = self.cell(creature.pos).floor();
        match creature.kind {
            CreatureKind::Chip => self.chip_arrives(floor, out_events),
            CreatureKind::Block => self.block_arrives(index, floor, out_events),
            _ => self.monster_arrives(index, floor, out_events),
        }
        if self.creatures[index].is_dead() {
            return;
        }

        if floor.is_button() {
            self.press_button(creature.pos, floor, out_events);
        }
        if floor == Floor::Teleport {
            let _ = self.teleport(index, out_events);
        }

        let settled = self.creatures[index];
        let floor = self.cell(settled.pos).floor();
        if self.forced_for(settled.kind, floor) {
            self.enter_forced_floor(index, floor);
        }
        if settled.is_chip()
            && floor.is_slide()
            && !settled.flags.contains(CreatureFlags::SLIDING)
        {
            self.creatures[index]
                .flags
                .insert(CreatureFlags::SLIDE_TOKEN);
        }
    }

    fn chip_arrives(&mut self, floor: Floor, out_events: &mut Vec<Event>) {
        let Some(pos) = self.chip().map(Creature::pos) else {
            return;
        };
        match floor {
            Floor::Water if !self.possessions.has_boots(BootKind::Water) => {
                sound(out_events, SoundEffect::Splash);
                self.kill_chip(DeathCause::Drowned, out_events);
            }
            Floor::Fire if !self.possessions.has_boots(BootKind::Fire) => {
                sound(out_events, SoundEffect::Burn);
                self.kill_chip(DeathCause::Burned, out_events);
            }
            Floor::Bomb => {
                self.cells[pos.index()].pop();
                sound(out_events, SoundEffect::Explosion);
                self.kill_chip(DeathCause::Bombed, out_events);
            }
            Floor::IcChip => {
                self.chips_needed = self.chips_needed.saturating_sub(1);
                self.cells[pos.index()].pop();
                sound(out_events, SoundEffect::ChipCollected);
            }
            Floor::Dirt | Floor::BlueWallFake => self.cells[pos.index()].pop(),
            Floor::Socket => {
                self.cells[pos.index()].pop();
                sound(out_events, SoundEffect::DoorOpened);
            }
            Floor::Thief => {
                self.possessions.clear_boots();
                sound(out_events, SoundEffect::Thief);
            }
            Floor::Exit => {
                if self.outcome == TickOutcome::Continue {
                    self.outcome = TickOutcome::Completed;
                    tracing::debug!(tick = self.tick, "level completed");
                    out_events.push(Event::LevelCompleted);
                    sound(out_events, SoundEffect::Exit);
                }
            }
            Floor::HintButton => sound(out_events, SoundEffect::Hint),
            Floor::Beartrap => sound(out_events, SoundEffect::Trapped),
            other => {
                if let Some(color) = other.key() {
                    self.possessions.add_key(color);
                } else if let Some(color) = other.door() {
                    self.possessions.use_key(color);
                } else if let Some(kind) = other.boots() {
                    self.possessions.add_boots(kind);
                } else {
                    return;
                }
                self.cells[pos.index()].pop();
                let effect = if other.door().is_some() {
                    SoundEffect::DoorOpened
                } else {
                    SoundEffect::ItemCollected
                };
                sound(out_events, effect);
            }
        }
    }

    fn block_arrives(&mut self, index: usize, floor: Floor, out_events: &mut Vec<Event>) {
        let pos = self.creatures[index].pos;
        match floor {
            Floor::Water => {
                self.cells[pos.index()].set_floor(Floor::Dirt);
                sound(out_events, SoundEffect::Splash);
                self.kill(index, out_events);
            }
            Floor::Bomb => {
                self.cells[pos.index()].pop();
                sound(out_events, SoundEffect::Explosion);
                self.kill(index, out_events);
            }
            _ => {}
        }
    }

    fn monster_arrives(&mut self, index: usize, floor: Floor, out_events: &mut Vec<Event>) {
        let creature = self.creatures[index];
        match floor {
            Floor::Water if creature.kind != CreatureKind::Glider => {
                sound(out_events, SoundEffect::Splash);
                self.kill(index, out_events);
            }
            Floor::Fire if creature.kind != CreatureKind::Fireball => {
                sound(out_events, SoundEffect::Burn);
                self.kill(index, out_events);
            }
            Floor::Bomb => {
                self.cells[creature.pos.index()].pop();
                sound(out_events, SoundEffect::Explosion);
                self.kill(index, out_events);
            }
            Floor::Beartrap => sound(out_events, SoundEffect::Trapped),
            _ => {}
        }
    }

    /// Reports whether a floor pushes the given kind of creature around.
    pub(crate) fn forced_for(&self, kind: CreatureKind, floor: Floor) -> bool {
        let chip = kind == CreatureKind::Chip;
        if floor.is_ice() {
            !(chip && self.possessions.has_boots(BootKind::Ice))
        } else if floor.is_slide() {
            !(chip && self.possessions.has_boots(BootKind::Slide))
        } else {
            floor == Floor::Teleport
        }
    }

    fn enter_forced_floor(&mut self, index: usize, floor: Floor) {
        let heading = self.creatures[index].dir;
        let fdir = if let Some(turned) = floor.ice_deflection(heading) {
            turned
        } else if let Some(slide) = floor.slide_direction() {
            slide
        } else if floor == Floor::SlideRandom {
            match self.ruleset {
                Ruleset::Ms => Direction::from_index(self.main.next4()).unwrap_or(heading),
                Ruleset::Lynx => {
                    self.random_slide_dir = self.random_slide_dir.right();
                    self.random_slide_dir
                }
            }
        } else {
            heading
        };

        let creature = &mut self.creatures[index];
        creature.fdir = fdir;
        if floor.is_ice() {
            creature.dir = fdir;
        }
        let is_chip = creature.is_chip();
        self.slip.insert(index, is_chip);
    }

    /// Relocates a creature standing on a teleport.
    ///
    /// Teleports are searched backwards in linear order from the origin,
    /// wrapping around the grid, for a free one the creature could leave in
    /// its current direction. Returns whether the creature was relocated.
    fn teleport(&mut self, index: usize, out_events: &mut Vec<Event>) -> bool {
        let origin = self.creatures[index].pos;
        let heading = self.creatures[index].dir;
        let mut cursor = origin.previous_wrapping();
        while cursor != origin {
            if self.cell(cursor).floor() == Floor::Teleport && self.occupant(cursor).is_none() {
                self.creatures[index].pos = cursor;
                if self.peek(index, heading) {
                    tracing::debug!(
                        slot = index,
                        from = origin.get(),
                        to = cursor.get(),
                        "creature teleported"
                    );
                    out_events.push(Event::CreatureTeleported {
                        slot: index,
                        from: origin,
                        to: cursor,
                    });
                    sound(out_events, SoundEffect::Teleported);
                    return true;
                }
                self.creatures[index].pos = origin;
            }
            cursor = cursor.previous_wrapping();
        }
        false
    }

    fn press_button(&mut self, pos: Position, floor: Floor, out_events: &mut Vec<Event>) {
        match floor {
            Floor::ButtonGreen => {
                for cell in &mut self.cells {
                    cell.toggle_switch_walls();
                }
            }
            Floor::ButtonBlue => {
                for tank in &mut self.creatures {
                    if tank.kind == CreatureKind::Tank
                        && !tank.is_dead()
                        && self.cells[tank.pos.index()].floor() != Floor::CloneMachine
                    {
                        tank.dir = tank.dir.back();
                    }
                }
            }
            Floor::ButtonRed => {
                if let Some(wiring) = self.cloners.iter().find(|wiring| wiring.button == pos) {
                    let machine = &mut self.cells[wiring.target.index()];
                    if machine.floor() == Floor::CloneMachine {
                        machine.flags_mut().insert(CellFlags::PRIMED);
                    }
                }
            }
            Floor::ButtonBrown => {
                if let Some(wiring) = self.traps.iter().find(|wiring| wiring.button == pos) {
                    let trap = &mut self.cells[wiring.target.index()];
                    if trap.floor() == Floor::Beartrap {
                        trap.flags_mut().insert(CellFlags::RELEASE_PENDING);
                    }
                }
            }
            _ => return,
        }
        sound(out_events, SoundEffect::ButtonPressed);
    }

    /// Fires every primed cloning machine.
    ///
    /// The occupant of each machine is duplicated with the RELEASED and
    /// CLONE flags; the copy immediately tries to leave in the occupant's
    /// direction at `speed_of(kind)` and is discarded if it cannot.
    pub fn resolve_cloners<F>(&mut self, speed_of: F, out_events: &mut Vec<Event>)
    where
        F: Fn(CreatureKind) -> u8,
    {
        for cell_index in 0..self.cells.len() {
            if !self.cells[cell_index].flags().contains(CellFlags::PRIMED) {
                continue;
            }
            self.cells[cell_index].flags_mut().remove(CellFlags::PRIMED);

            let Some(at) = u16::try_from(cell_index).ok().and_then(Position::new) else {
                continue;
            };
            let Some(original) = self.occupant(at) else {
                continue;
            };
            let source = self.creatures[original];

            let mut copy = Creature::new(at, source.kind, source.dir);
            copy.flags.insert(CreatureFlags::RELEASED);
            copy.flags.insert(CreatureFlags::CLONE);
            self.creatures.push(copy);
            let slot = self.creatures.len() - 1;

            if self.can_move(slot, source.dir, Probe::Reveal, out_events) {
                tracing::debug!(slot, kind = ?source.kind, at = at.get(), "creature cloned");
                out_events.push(Event::CreatureCloned {
                    slot,
                    kind: source.kind,
                    at,
                });
                sound(out_events, SoundEffect::Cloned);
                self.begin_move(slot, source.dir, speed_of(source.kind), false, out_events);
            } else {
                let _ = self.creatures.pop();
            }
        }
    }

    fn kill(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let creature = &mut self.creatures[index];
        creature.flags.insert(CreatureFlags::DEAD);
        creature.moving = 0;
        let (kind, at) = (creature.kind, creature.pos);
        self.slip.remove(index);
        tracing::debug!(slot = index, ?kind, at = at.get(), "creature destroyed");
        out_events.push(Event::CreatureDied {
            slot: index,
            kind,
            at,
        });
    }

    pub(crate) fn kill_chip(&mut self, cause: DeathCause, out_events: &mut Vec<Event>) {
        if let Some(chip) = self.creatures.get_mut(CHIP_INDEX) {
            chip.flags.insert(CreatureFlags::DEAD);
            chip.moving = 0;
        }
        self.slip.remove(CHIP_INDEX);
        if self.outcome == TickOutcome::Continue {
            self.outcome = TickOutcome::Died(cause);
            tracing::debug!(tick = self.tick, ?cause, "chip died");
            out_events.push(Event::ChipDied { cause });
            sound(out_events, SoundEffect::ChipDeath);
        }
    }
}
