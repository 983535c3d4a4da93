use crate::constants::{
    get_scatter_steps, COLLISION_RADIUS, CUE_SLOTS, GHOST_SPAWNS, MUNCH_CUE_TICKS, PLAYER_SPAWN,
    START_LIVES,
};
use crate::rng::Rng;
use crate::types::{AudioCue, GamePhase, InputSnapshot, RuntimeEvent, Snapshot, Vec2};
use crate::world::{tile_center, GridMap};

pub mod autopilot;
pub mod cue_pool;
pub mod ghost_system;
pub mod movement;
pub mod pathfinding;
pub mod player_system;
mod utils;

use self::cue_pool::CuePool;
use self::ghost_system::{Ghost, GhostPolicy};
use self::player_system::{Player, PlayerHooks};

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub lives: i32,
    pub player_spawn: Vec2,
    pub ghost_spawns: Vec<Vec2>,
    pub ghost_policy: GhostPolicy,
    pub autopilot: bool,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            lives: START_LIVES,
            player_spawn: PLAYER_SPAWN,
            ghost_spawns: GHOST_SPAWNS.to_vec(),
            ghost_policy: GhostPolicy::default(),
            autopilot: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub grid: GridMap,
    pub player: Player,
    pub ghosts: Vec<Ghost>,

    rng: Rng,
    cues: CuePool,
    events: Vec<RuntimeEvent>,
    options: GameEngineOptions,

    score: u32,
    lives: i32,
    phase: GamePhase,
    tick_counter: u64,
}

struct SessionHooks<'a> {
    score: &'a mut u32,
    events: &'a mut Vec<RuntimeEvent>,
    cues: &'a mut CuePool,
    tile: Vec2,
    tick: u64,
}

impl PlayerHooks for SessionHooks<'_> {
    fn add_score(&mut self, points: u32) {
        *self.score = self.score.saturating_add(points);
        self.events.push(RuntimeEvent::PelletEaten {
            x: self.tile.x,
            y: self.tile.y,
            points,
        });
    }

    fn play_cue(&mut self, cue: AudioCue) {
        let slot = self.cues.trigger(self.tick, MUNCH_CUE_TICKS);
        self.events.push(RuntimeEvent::CuePlayed { cue, slot });
    }
}

impl GameEngine {
    pub fn new(grid: GridMap, seed: u32, options: GameEngineOptions) -> Self {
        for spawn in std::iter::once(&options.player_spawn).chain(options.ghost_spawns.iter()) {
            if !grid.is_walkable(spawn.x, spawn.y) {
                tracing::warn!(x = spawn.x, y = spawn.y, "spawn tile is not walkable");
            }
        }

        let player = Player::new(tile_center(options.player_spawn));
        let ghosts = options
            .ghost_spawns
            .iter()
            .enumerate()
            .map(|(idx, spawn)| {
                Ghost::new(
                    tile_center(*spawn),
                    get_scatter_steps(idx, options.ghost_policy.scatter_steps),
                    options.ghost_policy,
                )
            })
            .collect();

        Self {
            grid,
            player,
            ghosts,
            rng: Rng::new(seed),
            cues: CuePool::new(CUE_SLOTS),
            events: Vec::new(),
            lives: options.lives,
            options,
            score: 0,
            phase: GamePhase::Playing,
            tick_counter: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn is_ended(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    pub fn set_input(&mut self, input: InputSnapshot) {
        self.player.record_input(input);
    }

    pub fn step(&mut self) {
        if self.is_ended() {
            return;
        }
        self.tick_counter += 1;

        if self.options.autopilot {
            let dir =
                autopilot::choose_direction(&self.grid, &self.player, &self.ghosts, &mut self.rng);
            self.player.record_desired_direction(dir);
        }

        let mut hooks = SessionHooks {
            score: &mut self.score,
            events: &mut self.events,
            cues: &mut self.cues,
            tile: self.player.actor.tile(),
            tick: self.tick_counter,
        };
        self.player.update(&mut self.grid, &mut hooks);

        let target = self.player.position();
        for ghost in &mut self.ghosts {
            ghost.update(&self.grid, target, &mut self.rng);
        }

        self.resolve_collisions();

        if !self.grid.pellets_remaining() && self.phase == GamePhase::Playing {
            self.phase = GamePhase::LevelCleared;
            self.cues.stop_all();
            self.events.push(RuntimeEvent::LevelCleared { score: self.score });
            tracing::info!(score = self.score, tick = self.tick_counter, "level_cleared");
        }
    }

    pub fn restart(&mut self) {
        self.grid.reset_pellets();
        self.reset_actors();
        self.cues.stop_all();
        self.score = 0;
        self.lives = self.options.lives;
        self.phase = GamePhase::Playing;
        tracing::debug!(tick = self.tick_counter, "session_restarted");
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            pellets_left: self.grid.pellet_count(),
            player: self.player.view(),
            ghosts: self
                .ghosts
                .iter()
                .enumerate()
                .map(|(idx, ghost)| ghost.view(idx))
                .collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn reset_actors(&mut self) {
        self.player.reset();
        for ghost in &mut self.ghosts {
            ghost.reset();
        }
    }

    fn resolve_collisions(&mut self) {
        let player_pos = self.player.position();
        let caught_by = self
            .ghosts
            .iter()
            .position(|ghost| (ghost.position() - player_pos).length() < COLLISION_RADIUS * 2.0);
        let Some(ghost_id) = caught_by else {
            return;
        };

        self.lives -= 1;
        self.events.push(RuntimeEvent::PlayerCaught {
            ghost_id,
            lives_left: self.lives,
        });
        tracing::debug!(ghost_id, lives_left = self.lives, "player_caught");

        if self.lives <= 0 {
            self.phase = GamePhase::GameOver;
            self.cues.stop_all();
            self.events.push(RuntimeEvent::GameOver { score: self.score });
            tracing::info!(score = self.score, tick = self.tick_counter, "game_over");
        }
        self.reset_actors();
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::movement::sampled_cells;
    use crate::engine::{GameEngine, GameEngineOptions};
    use crate::types::{Direction, GamePhase, InputSnapshot, RuntimeEvent, Vec2};
    use crate::world::{tile_center, tile_of, GridMap};

    fn classic_engine(seed: u32, autopilot: bool) -> GameEngine {
        let grid = GridMap::classic().expect("bundled level parses");
        GameEngine::new(
            grid,
            seed,
            GameEngineOptions {
                autopilot,
                ..GameEngineOptions::default()
            },
        )
    }

    fn small_engine(rows: &[&str], player: Vec2, ghosts: Vec<Vec2>) -> GameEngine {
        let grid = GridMap::from_rows(rows).expect("valid test level");
        GameEngine::new(
            grid,
            1,
            GameEngineOptions {
                player_spawn: player,
                ghost_spawns: ghosts,
                ..GameEngineOptions::default()
            },
        )
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let mut a = classic_engine(424_242, true);
        let mut b = classic_engine(424_242, true);

        for _ in 0..1_500 {
            a.step();
            b.step();
            let sa = a.build_snapshot(false);
            let sb = b.build_snapshot(false);

            assert_eq!(sa.score, sb.score);
            assert_eq!(sa.lives, sb.lives);
            assert_eq!(sa.player.x.to_bits(), sb.player.x.to_bits());
            assert_eq!(sa.player.y.to_bits(), sb.player.y.to_bits());
            for (ga, gb) in sa.ghosts.iter().zip(sb.ghosts.iter()) {
                assert_eq!(ga.x.to_bits(), gb.x.to_bits());
                assert_eq!(ga.y.to_bits(), gb.y.to_bits());
                assert_eq!(ga.dir, gb.dir);
                assert_eq!(ga.mode, gb.mode);
            }
            if a.is_ended() || b.is_ended() {
                assert_eq!(a.is_ended(), b.is_ended());
                break;
            }
        }
    }

    #[test]
    fn actors_stay_on_open_tiles_over_long_runs() {
        for seed in [1u32, 77, 9_001] {
            let mut engine = classic_engine(seed, true);
            for _ in 0..3_000 {
                engine.step();
                let player_pos = engine.player.position();
                let player_tile = tile_of(player_pos);
                assert!(engine.grid.is_walkable(player_tile.x, player_tile.y));
                for cell in sampled_cells(&engine.grid, player_pos) {
                    assert!(
                        engine.grid.is_walkable(cell.x, cell.y),
                        "seed={seed} player at {player_pos:?} overlaps wall {cell:?}"
                    );
                }
                for ghost in &engine.ghosts {
                    let pos = ghost.position();
                    assert!(pos.x.is_finite() && pos.y.is_finite());
                    assert!(pos.x >= 0.0 && pos.x < engine.grid.pixel_width());
                    let tile = tile_of(pos);
                    assert!(engine.grid.is_walkable(tile.x, tile.y));
                    for cell in sampled_cells(&engine.grid, pos) {
                        assert!(
                            engine.grid.is_walkable(cell.x, cell.y),
                            "seed={seed} ghost at {pos:?} overlaps wall {cell:?}"
                        );
                    }
                }
                if engine.is_ended() {
                    break;
                }
            }
        }
    }

    #[test]
    fn eating_pellets_scores_and_emits_events() {
        let mut engine = small_engine(
            &["#######", "# ..  #", "#######"],
            Vec2 { x: 1, y: 1 },
            Vec::new(),
        );
        engine.set_input(InputSnapshot {
            right: true,
            ..InputSnapshot::default()
        });
        for _ in 0..20 {
            engine.step();
        }
        assert_eq!(engine.score(), 20);
        assert_eq!(engine.phase(), GamePhase::LevelCleared);

        let snapshot = engine.build_snapshot(true);
        let eaten: Vec<(i32, i32)> = snapshot
            .events
            .iter()
            .filter_map(|event| match event {
                RuntimeEvent::PelletEaten { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(eaten, vec![(2, 1), (3, 1)]);
        let slots: Vec<usize> = snapshot
            .events
            .iter()
            .filter_map(|event| match event {
                RuntimeEvent::CuePlayed { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(slots, vec![0, 1]);
        assert!(matches!(
            snapshot.events.last(),
            Some(RuntimeEvent::LevelCleared { score: 20 })
        ));
    }

    #[test]
    fn build_snapshot_drains_events_when_requested() {
        let mut engine = small_engine(&["#####", "#. .#", "#####"], Vec2 { x: 1, y: 1 }, Vec::new());
        engine.step();
        let peek = engine.build_snapshot(false);
        assert!(peek.events.is_empty());

        let first = engine.build_snapshot(true);
        let second = engine.build_snapshot(true);
        assert_eq!(first.events.len(), 2);
        assert_eq!(second.events.len(), 0);
        assert_eq!(first.pellets_left, 1);
    }

    #[test]
    fn contact_costs_a_life_and_resets_actors() {
        let mut engine = small_engine(
            &["#########", "#.     .#", "#########"],
            Vec2 { x: 1, y: 1 },
            vec![Vec2 { x: 5, y: 1 }],
        );
        engine.player.record_desired_direction(Direction::Right);

        let mut caught = false;
        for _ in 0..60 {
            engine.step();
            if engine.lives() < 3 {
                caught = true;
                break;
            }
        }
        assert!(caught);
        assert_eq!(engine.lives(), 2);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.player.position(), tile_center(Vec2 { x: 1, y: 1 }));
        assert_eq!(engine.player.heading(), Direction::None);
        assert_eq!(engine.ghosts[0].position(), tile_center(Vec2 { x: 5, y: 1 }));
    }

    #[test]
    fn last_life_ends_the_session() {
        let grid = GridMap::from_rows(&["#########", "#.      #", "#########"])
            .expect("valid test level");
        let mut engine = GameEngine::new(
            grid,
            3,
            GameEngineOptions {
                lives: 1,
                player_spawn: Vec2 { x: 2, y: 1 },
                ghost_spawns: vec![Vec2 { x: 2, y: 1 }],
                ..GameEngineOptions::default()
            },
        );
        engine.step();
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert!(engine.is_ended());
        assert_eq!(engine.lives(), 0);

        let tick = engine.tick();
        engine.step();
        assert_eq!(engine.tick(), tick);

        let events = engine.build_snapshot(true).events;
        assert!(matches!(
            events.as_slice(),
            [
                RuntimeEvent::PlayerCaught {
                    ghost_id: 0,
                    lives_left: 0
                },
                RuntimeEvent::GameOver { score: 0 }
            ]
        ));
    }

    #[test]
    fn restart_restores_pellets_score_and_lives() {
        let mut engine = small_engine(
            &["#######", "# ..  #", "#######"],
            Vec2 { x: 1, y: 1 },
            Vec::new(),
        );
        engine.player.record_desired_direction(Direction::Right);
        for _ in 0..20 {
            engine.step();
        }
        assert!(engine.is_ended());

        engine.restart();
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.lives(), 3);
        assert_eq!(engine.grid.pellet_count(), 2);
        assert_eq!(engine.player.position(), tile_center(Vec2 { x: 1, y: 1 }));
    }

    #[test]
    fn ghosts_get_staggered_scatter_budgets() {
        let engine = classic_engine(5, false);
        let budgets: Vec<u32> = engine
            .ghosts
            .iter()
            .map(|ghost| ghost.scatter_steps_remaining())
            .collect();
        assert_eq!(budgets, vec![40, 80, 120, 160]);
    }
}
