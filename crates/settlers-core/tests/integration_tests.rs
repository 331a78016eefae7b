//! Integration tests for the settlers rules engine.
//!
//! These tests drive complete games through the public API, from initial
//! placement through to victory.

use pretty_assertions::assert_eq;
use rand::rngs::mock::StepRng;
use std::cmp::Reverse;
use rand::rngs::StdRng;
use rand::SeedableRng;
use settlers_core::*;

const ROSTER: [PlayerColor; 4] = [
    PlayerColor::Red,
    PlayerColor::Blue,
    PlayerColor::White,
    PlayerColor::Orange,
];

fn new_game(seed: u64) -> (Game, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let game = Game::new(GameConfig::default(), &ROSTER, PlayerColor::Red, &mut rng)
        .expect("valid roster");
    (game, rng)
}

/// Dice combinations that roll each token, summed over a corner's tiles
fn production_value(game: &Game, corner: Corner) -> u32 {
    game.tiles_at_corner(corner)
        .iter()
        .filter_map(|tile| tile.token())
        .map(|token| 6 - u32::from(token.abs_diff(7)))
        .sum()
}

/// Run through initial placement, taking the most productive legal corner
/// (lowest corner on ties) and the first road leading away from it
fn complete_setup(game: &mut Game) {
    let mut iterations = 0;
    let max_iterations = 100;

    while game.phase() == GamePhase::InitialPlacement && iterations < max_iterations {
        let color = game.current_color();
        let corner = game
            .legal_settlement_corners()
            .into_iter()
            .max_by_key(|c| (production_value(game, *c), Reverse(*c)))
            .expect("a legal corner during setup");
        game.add_settlement(corner, color, true).unwrap();

        let edge = game
            .legal_road_edges(color)
            .into_iter()
            .find(|e| e.touches(corner))
            .expect("a free edge next to a new settlement");
        let [a, b] = edge.endpoints();
        game.add_road(a, b, color, true).unwrap();
        game.end_turn().unwrap();
        iterations += 1;
    }

    assert_eq!(
        game.phase(),
        GamePhase::RollDice,
        "Game should complete setup within {} iterations",
        max_iterations
    );
}

fn total_cards(game: &Game) -> u32 {
    game.players().iter().map(|p| p.resources().total()).sum()
}

fn assert_no_adjacent_settlements(game: &Game) {
    for settlement in game.board().settlements() {
        for neighbour in game.adjacent_corners(settlement.corner) {
            assert!(
                game.board().settlement_at(neighbour).is_none(),
                "settlements at {} and {} are adjacent",
                settlement.corner,
                neighbour
            );
        }
    }
}

/// Pick `count` cards from `hand`, cheapest resources first
fn pick_discard(hand: &ResourceHand, count: u32) -> ResourceHand {
    let mut discard = ResourceHand::new();
    let mut remaining = count;
    for (resource, held) in hand.iter() {
        let take = held.min(remaining);
        discard.add(resource, take);
        remaining -= take;
        if remaining == 0 {
            break;
        }
    }
    discard
}

/// Pay owed discards and move the robber onto the first tile with an opponent
fn resolve_robber(game: &mut Game, rng: &mut StdRng) {
    for color in game.colors() {
        let owed = game.owed_discard(color);
        if owed > 0 {
            let discard = pick_discard(game.hand(color).unwrap(), owed);
            game.discard(color, &discard).unwrap();
        }
    }

    let mover = game.current_color();
    let robber = game.robber();
    let (tile, victim) = TilePos::all()
        .filter(|pos| *pos != robber)
        .map(|pos| {
            let victim = game
                .board()
                .players_on_tile(pos)
                .into_iter()
                .find(|c| *c != mover);
            (pos, victim)
        })
        .max_by_key(|(_, victim)| victim.is_some())
        .unwrap();
    game.move_robber(tile, victim, rng).unwrap();
}

/// Spend as much of the current color's hand as the rules allow
fn build_everything(game: &mut Game) -> Vec<GameEvent> {
    let color = game.current_color();
    let mut events = Vec::new();

    loop {
        let player = game.player(color).unwrap();

        if player.can_afford(&costs::city()) {
            let site = game
                .board()
                .settlements()
                .into_iter()
                .find(|s| s.color == color && !s.is_city)
                .map(|s| s.corner);
            if let Some(corner) = site {
                events.extend(game.add_city(corner, color).unwrap());
                continue;
            }
        }

        if player.can_afford(&costs::settlement()) {
            let site = game
                .legal_settlement_corners()
                .into_iter()
                .find(|c| game.board().roads().has_road_to(color, *c));
            if let Some(corner) = site {
                events.extend(game.add_settlement(corner, color, false).unwrap());
                continue;
            }
        }

        if player.can_afford(&costs::road()) {
            if let Some(edge) = game.legal_road_edges(color).into_iter().next() {
                let [a, b] = edge.endpoints();
                events.extend(game.add_road(a, b, color, false).unwrap());
                continue;
            }
        }

        if player.can_afford(&costs::development_card()) && game.has_development_cards() {
            events.extend(game.buy_development_card(color).unwrap());
            continue;
        }

        return events;
    }
}

#[test]
fn test_setup_phase_completes() {
    let (mut game, _) = new_game(42);
    complete_setup(&mut game);

    assert_eq!(game.current_color(), PlayerColor::Red);
    for color in ROSTER {
        let player = game.player(color).unwrap();
        assert_eq!(player.num_settlements(), 2);
        assert_eq!(player.num_roads(), 2);
        assert_eq!(game.victory_points(color), Some(2));
    }
    assert_eq!(game.board().roads().len(), 8);
    assert_no_adjacent_settlements(&game);
}

#[test]
fn test_forced_roll_of_two() {
    let (mut game, _) = new_game(7);
    complete_setup(&mut game);

    // a zero step makes both dice land on 1
    let mut dice = StepRng::new(0, 0);
    let roll = game.roll_dice(&mut dice).unwrap();
    assert_eq!(roll.dice, (1, 1));
    assert_eq!(roll.total(), 2);
    assert_eq!(game.last_roll(), Some(2));
    assert_eq!(game.phase(), GamePhase::Gameplay);
    assert!(!game.is_game_over());

    let events = game.end_turn().unwrap();
    assert_eq!(
        events,
        vec![GameEvent::TurnEnded {
            color: PlayerColor::Red,
            next: PlayerColor::Blue
        }]
    );
    assert_eq!(game.phase(), GamePhase::RollDice);
}

#[test]
fn test_building_requires_resources_and_turn() {
    let (mut game, mut rng) = new_game(11);
    complete_setup(&mut game);

    let err = game.buy_development_card(PlayerColor::Blue).unwrap_err();
    assert_eq!(
        err,
        GameError::NotYourTurn {
            color: PlayerColor::Blue,
            current: PlayerColor::Red
        }
    );

    assert_eq!(
        game.end_turn().unwrap_err(),
        GameError::WrongPhase(GamePhase::RollDice)
    );

    let mut dice = StepRng::new(0, 0);
    game.roll_dice(&mut dice).unwrap();
    assert_eq!(
        game.roll_dice(&mut rng).unwrap_err(),
        GameError::WrongPhase(GamePhase::Gameplay)
    );

    let corner = game.player(PlayerColor::Red).unwrap().settlement_corners()[0];
    let hand = game.hand(PlayerColor::Red).unwrap().clone();
    let result = game.add_city(corner, PlayerColor::Red);
    if hand.can_afford(&costs::city()) {
        assert!(result.is_ok());
    } else {
        assert_eq!(
            result.unwrap_err(),
            GameError::InsufficientResources(PlayerColor::Red)
        );
        assert_eq!(game.hand(PlayerColor::Red).unwrap(), &hand);
    }
}

/// Play a seeded game with a greedy builder, checking invariants as it goes.
/// Returns the lengths reported by every change of the longest-road title.
fn simulate_game(seed: u64) -> (Game, Vec<u32>) {
    let (mut game, mut rng) = new_game(seed);
    complete_setup(&mut game);

    let mut road_records = Vec::new();
    let mut turns = 0;
    while game.winner().is_none() && turns < 400 {
        match game.phase() {
            GamePhase::RollDice => {
                let before = total_cards(&game);
                let roll = game.roll_dice(&mut rng).unwrap();
                let produced: u32 = roll
                    .events
                    .iter()
                    .map(|e| match e {
                        GameEvent::ResourcesProduced { resources, .. } => resources.total(),
                        _ => 0,
                    })
                    .sum();
                assert_eq!(total_cards(&game), before + produced);
                if roll.is_seven() {
                    assert_eq!(produced, 0);
                }
            }
            GamePhase::RobberPlacement => {
                let before = total_cards(&game);
                let owed: u32 = game.colors().iter().map(|c| game.owed_discard(*c)).sum();
                resolve_robber(&mut game, &mut rng);
                // stealing moves a card between hands
                assert_eq!(total_cards(&game), before - owed);
            }
            GamePhase::Gameplay => {
                for event in build_everything(&mut game) {
                    if let GameEvent::LongestRoadChanged { length, .. } = event {
                        road_records.push(length);
                    }
                }
                game.end_turn().unwrap();
                turns += 1;
            }
            GamePhase::InitialPlacement => unreachable!("setup already completed"),
        }
    }

    assert_no_adjacent_settlements(&game);
    assert!(road_records.windows(2).all(|w| w[0] < w[1]));
    if let Some(holder) = game.longest_road() {
        assert!(holder.count >= game.config().longest_road_min);
        // the holder may have extended the record without a change of hands
        assert!(road_records.last().is_some_and(|length| *length <= holder.count));
    }

    for color in ROSTER {
        let first = game.longest_road_length(color);
        let second = game.longest_road_length(color);
        assert_eq!(first, second);
    }

    if let Some(winner) = game.winner() {
        assert!(game.victory_points(winner).unwrap() >= game.config().victory_points_to_win);
        assert_eq!(game.end_turn().unwrap_err(), GameError::GameOver);
    }

    (game, road_records)
}

#[test]
fn test_random_game_simulation() {
    let mut title_changes = 0;
    for seed in 1..=5 {
        let (game, road_records) = simulate_game(seed);
        assert!(
            game.board().roads().len() > 8,
            "seed {} never built past the opening roads",
            seed
        );
        assert!(
            game.board().settlements().len() > 8,
            "seed {} never built past the opening settlements",
            seed
        );
        title_changes += road_records.len();
    }
    assert!(title_changes > 0, "no game ever awarded longest road");
}

#[test]
fn test_custom_config() {
    let config = GameConfig::from_json(r#"{ "victory_points_to_win": 3 }"#).unwrap();
    assert_eq!(config.victory_points_to_win, 3);
    assert_eq!(config.robber_hand_limit, GameConfig::DEFAULT_ROBBER_HAND_LIMIT);

    let mut rng = StdRng::seed_from_u64(5);
    let mut game = Game::new(config, &ROSTER[..2], PlayerColor::Blue, &mut rng).unwrap();
    assert_eq!(game.current_color(), PlayerColor::Blue);
    complete_setup(&mut game);
    assert_eq!(game.current_color(), PlayerColor::Blue);
    assert!(!game.is_game_over());
}

#[test]
fn test_invalid_roster() {
    let mut rng = StdRng::seed_from_u64(1);
    let err = Game::new(
        GameConfig::default(),
        &[PlayerColor::Red, PlayerColor::Red],
        PlayerColor::Red,
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, GameError::InvalidRoster(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_placement_integrity_is_fatal() {
    let (mut game, _) = new_game(3);
    let mut result = Ok(Vec::new());
    for _ in 0..8 {
        result = game.end_turn();
        if result.is_err() {
            break;
        }
    }
    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(game.phase(), GamePhase::InitialPlacement);
}

#[test]
fn test_error_messages() {
    let err = GameError::InsufficientResources(PlayerColor::Orange);
    assert_eq!(err.to_string(), "orange cannot afford this");

    let err = GameError::InvalidUpgrade {
        corner: Corner::new(6, 1),
        reason: UpgradeRefusal::AlreadyCity,
    };
    assert_eq!(err.to_string(), "Cannot upgrade (6, 1): already a city");
}

#[test]
fn test_board_snapshot_serializes() {
    let (mut game, _) = new_game(9);
    complete_setup(&mut game);

    let snapshot = game.board().snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: BoardSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(serde_json::to_string(&back).unwrap(), json);
}
