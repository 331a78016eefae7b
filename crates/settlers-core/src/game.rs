//! Core game state machine.
//!
//! `Game` owns the board, the player ledgers, the development deck and the
//! phase. Every command validates in full before it mutates anything, so a
//! rejected command leaves the game exactly as it was.

use crate::actions::{DevCardPlay, DiceRoll, GameEvent};
use crate::board::{Board, Tile};
use crate::config::GameConfig;
use crate::layout::{Corner, RoadEdge, TilePos};
use crate::player::{costs, DevCardKind, Player, PlayerColor, ResourceHand, SpecialCard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Snake-order placement of two settlements and two roads per color
    InitialPlacement,
    /// Start of a turn, before the dice are rolled
    RollDice,
    /// Building, buying and playing cards
    Gameplay,
    /// A 7 was rolled: discards are owed and the robber must move
    RobberPlacement,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GamePhase::InitialPlacement => "initial placement",
            GamePhase::RollDice => "roll dice",
            GamePhase::Gameplay => "gameplay",
            GamePhase::RobberPlacement => "robber placement",
        };
        f.write_str(name)
    }
}

/// Where a rejected building would have gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildSite {
    Corner(Corner),
    Road(RoadEdge),
}

impl fmt::Display for BuildSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildSite::Corner(c) => write!(f, "corner {}", c),
            BuildSite::Road(e) => write!(f, "road {}", e),
        }
    }
}

/// Why a city upgrade was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeRefusal {
    NoSettlement,
    AlreadyCity,
    NotOwner,
}

impl fmt::Display for UpgradeRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeRefusal::NoSettlement => f.write_str("no settlement there"),
            UpgradeRefusal::AlreadyCity => f.write_str("already a city"),
            UpgradeRefusal::NotOwner => f.write_str("settlement belongs to another player"),
        }
    }
}

/// Errors that can occur when applying commands
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("{0} is not a legal building site")]
    IllegalPlacement(BuildSite),

    #[error("{color} has no road leading to {corner}")]
    MissingConnection { color: PlayerColor, corner: Corner },

    #[error("{0} cannot afford this")]
    InsufficientResources(PlayerColor),

    #[error("Cannot upgrade {corner}: {reason}")]
    InvalidUpgrade {
        corner: Corner,
        reason: UpgradeRefusal,
    },

    #[error("No development cards left in the deck")]
    DeckExhausted,

    #[error("A development card was already played this turn")]
    CardAlreadyPlayed,

    #[error("{0} holds no {1} card")]
    NoSuchCard(PlayerColor, DevCardKind),

    #[error("Not allowed during {0}")]
    WrongPhase(GamePhase),

    #[error("It is {current}'s turn, not {color}'s")]
    NotYourTurn {
        color: PlayerColor,
        current: PlayerColor,
    },

    #[error("{0} is not playing")]
    UnknownPlayer(PlayerColor),

    #[error("The robber cannot move to {0}")]
    InvalidRobberTarget(TilePos),

    #[error("{0} cannot be robbed")]
    InvalidVictim(PlayerColor),

    #[error("Invalid discard from {0}")]
    InvalidDiscard(PlayerColor),

    #[error("Players still owe discards")]
    DiscardPending,

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Initial placement left {color} with {settlements} settlements and {roads} roads")]
    PlacementIntegrity {
        color: PlayerColor,
        settlements: usize,
        roads: usize,
    },

    #[error("The game is over")]
    GameOver,
}

impl GameError {
    /// Errors that mean the driver broke the command protocol rather than
    /// asked for an illegal move
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::PlacementIntegrity { .. })
    }
}

/// Holder of a special card and the record that earned it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleHolder {
    pub color: PlayerColor,
    /// Road length or knights played
    pub count: u32,
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    /// Ledgers in turn order
    players: Vec<Player>,
    /// Index into `players` of the color to act
    turn: usize,
    phase: GamePhase,
    dev_deck: Vec<DevCardKind>,
    dev_card_played: bool,
    placement_count: usize,
    owed_discards: BTreeMap<PlayerColor, u32>,
    longest_road: Option<TitleHolder>,
    largest_army: Option<TitleHolder>,
    last_roll: Option<u8>,
    winner: Option<PlayerColor>,
}

impl Game {
    /// Create a game for 2 to 4 distinct colors, listed in turn order.
    ///
    /// `rng` shuffles the tiles, the ports and the development deck.
    pub fn new<R: Rng + ?Sized>(
        config: GameConfig,
        colors: &[PlayerColor],
        starting: PlayerColor,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if !(2..=4).contains(&colors.len()) {
            return Err(GameError::InvalidRoster(format!(
                "{} players, need 2 to 4",
                colors.len()
            )));
        }
        let distinct: BTreeSet<PlayerColor> = colors.iter().copied().collect();
        if distinct.len() != colors.len() {
            return Err(GameError::InvalidRoster("duplicate colors".to_string()));
        }
        let turn = colors
            .iter()
            .position(|c| *c == starting)
            .ok_or_else(|| GameError::InvalidRoster(format!("{} is not playing", starting)))?;

        let board = Board::generate(rng);
        let dev_deck = DevCardKind::shuffled_deck(rng);
        info!("new game with {} players, {} places first", colors.len(), starting);

        Ok(Self {
            config,
            board,
            players: colors.iter().map(|c| Player::new(*c)).collect(),
            turn,
            phase: GamePhase::InitialPlacement,
            dev_deck,
            dev_card_played: false,
            placement_count: 0,
            owed_discards: BTreeMap::new(),
            longest_road: None,
            largest_army: None,
            last_roll: None,
            winner: None,
        })
    }

    // ==================== Queries ====================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The color whose turn it is
    pub fn current_color(&self) -> PlayerColor {
        self.players[self.turn].color()
    }

    /// Colors in turn order
    pub fn colors(&self) -> Vec<PlayerColor> {
        self.players.iter().map(|p| p.color()).collect()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, color: PlayerColor) -> Option<&Player> {
        self.players.iter().find(|p| p.color() == color)
    }

    pub fn hand(&self, color: PlayerColor) -> Option<&ResourceHand> {
        self.player(color).map(|p| p.resources())
    }

    /// Victory points including special cards
    pub fn victory_points(&self, color: PlayerColor) -> Option<u32> {
        self.player(color)
            .map(|p| p.total_victory_points(self.config.special_card_points))
    }

    pub fn legal_settlement_corners(&self) -> Vec<Corner> {
        self.board.legal_settlement_corners()
    }

    /// Every edge where `color` may build a road right now, sorted
    pub fn legal_road_edges(&self, color: PlayerColor) -> Vec<RoadEdge> {
        self.board
            .edges()
            .iter()
            .copied()
            .filter(|e| self.board.can_place_road(*e, color))
            .collect()
    }

    pub fn adjacent_corners(&self, corner: Corner) -> Vec<Corner> {
        self.board.adjacent_corners(corner)
    }

    pub fn tiles_at_corner(&self, corner: Corner) -> Vec<&Tile> {
        self.board.tiles_at_corner(corner)
    }

    pub fn robber(&self) -> TilePos {
        self.board.robber()
    }

    pub fn has_development_cards(&self) -> bool {
        !self.dev_deck.is_empty()
    }

    pub fn development_cards_remaining(&self) -> usize {
        self.dev_deck.len()
    }

    pub fn dev_card_played_this_turn(&self) -> bool {
        self.dev_card_played
    }

    /// Road length for `color` through the road network touching `corner`
    pub fn road_length(&self, color: PlayerColor, corner: Corner) -> u32 {
        self.board.road_length(color, corner)
    }

    /// Best road length over all of `color`'s roads
    pub fn longest_road_length(&self, color: PlayerColor) -> u32 {
        self.board.longest_road(color)
    }

    pub fn longest_road(&self) -> Option<TitleHolder> {
        self.longest_road
    }

    pub fn largest_army(&self) -> Option<TitleHolder> {
        self.largest_army
    }

    /// Cards `color` still has to discard after a 7
    pub fn owed_discard(&self, color: PlayerColor) -> u32 {
        self.owed_discards.get(&color).copied().unwrap_or(0)
    }

    /// Whether any color has reached the target, computed live
    pub fn is_game_over(&self) -> bool {
        let target = self.config.victory_points_to_win;
        self.players
            .iter()
            .any(|p| p.total_victory_points(self.config.special_card_points) >= target)
    }

    /// The winner recorded at the end of a turn
    pub fn winner(&self) -> Option<PlayerColor> {
        self.winner
    }

    pub fn last_roll(&self) -> Option<u8> {
        self.last_roll
    }

    // ==================== Building ====================

    /// Build a settlement. During initial placement it is free and needs no
    /// road; the second one produces a card from every adjacent tile.
    pub fn add_settlement(
        &mut self,
        corner: Corner,
        color: PlayerColor,
        initial: bool,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_over()?;
        self.ensure_turn(color)?;
        self.ensure_phase(Self::building_phase(initial))?;

        if !self.board.can_place_settlement(corner) {
            return Err(GameError::IllegalPlacement(BuildSite::Corner(corner)));
        }
        if !initial {
            if !self.board.roads().has_road_to(color, corner) {
                return Err(GameError::MissingConnection { color, corner });
            }
            self.charge(color, &costs::settlement())?;
        }

        let player = self.ledger_mut(color)?;
        player.record_settlement(corner);
        let second_initial = initial && player.settlement_corners().len() == 2;
        self.board.place_settlement(corner, color);

        let mut events = vec![GameEvent::SettlementBuilt {
            color,
            corner,
            initial,
        }];
        if initial {
            info!("{} placed a settlement at {}", color, corner);
        } else {
            info!("{} built a settlement at {}", color, corner);
        }

        if second_initial {
            let produced = self.board.production_for_corner(corner);
            debug!("{} receives {} from the second settlement", color, produced);
            self.ledger_mut(color)?.receive(&produced);
            events.push(GameEvent::ResourcesProduced {
                color,
                resources: produced,
            });
        }

        Ok(events)
    }

    /// Upgrade one of `color`'s settlements to a city
    pub fn add_city(&mut self, corner: Corner, color: PlayerColor) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_over()?;
        self.ensure_turn(color)?;
        self.ensure_phase(GamePhase::Gameplay)?;

        let refuse = |reason| GameError::InvalidUpgrade { corner, reason };
        let settlement = *self
            .board
            .settlement_at(corner)
            .ok_or(refuse(UpgradeRefusal::NoSettlement))?;
        if settlement.is_city {
            return Err(refuse(UpgradeRefusal::AlreadyCity));
        }
        if settlement.color != color {
            return Err(refuse(UpgradeRefusal::NotOwner));
        }
        self.charge(color, &costs::city())?;

        self.board.upgrade_to_city(corner);
        self.ledger_mut(color)?.record_city(corner);
        info!("{} upgraded a settlement into a city at {}", color, corner);

        Ok(vec![GameEvent::CityBuilt { color, corner }])
    }

    /// Build a road between two adjacent corners. Free during initial placement.
    pub fn add_road(
        &mut self,
        a: Corner,
        b: Corner,
        color: PlayerColor,
        initial: bool,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_over()?;
        self.ensure_turn(color)?;
        self.ensure_phase(Self::building_phase(initial))?;

        let edge = RoadEdge::new(a, b);
        if !self.board.can_place_road(edge, color) {
            return Err(GameError::IllegalPlacement(BuildSite::Road(edge)));
        }
        if !initial {
            self.charge(color, &costs::road())?;
        }

        self.build_road(edge, color)
    }

    /// Buy the top development card. A victory point card scores at once.
    pub fn buy_development_card(&mut self, color: PlayerColor) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_over()?;
        self.ensure_turn(color)?;
        self.ensure_phase(GamePhase::Gameplay)?;

        let card = *self.dev_deck.last().ok_or(GameError::DeckExhausted)?;
        self.charge(color, &costs::development_card())?;
        self.dev_deck.pop();
        self.ledger_mut(color)?.add_development_card(card);

        info!("{} bought a development card", color);
        debug!("{} drew {}, {} left in the deck", color, card, self.dev_deck.len());
        Ok(vec![GameEvent::DevelopmentCardBought { color, kind: card }])
    }

    // ==================== Dice and Robber ====================

    /// Roll two dice for the current color and resolve the roll
    pub fn roll_dice<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<DiceRoll, GameError> {
        self.ensure_not_over()?;
        self.ensure_phase(GamePhase::RollDice)?;

        let first: u8 = rng.gen_range(1..=6);
        let second: u8 = rng.gen_range(1..=6);
        Ok(self.resolve_roll((first, second)))
    }

    fn resolve_roll(&mut self, dice: (u8, u8)) -> DiceRoll {
        let color = self.current_color();
        let total = dice.0 + dice.1;
        self.last_roll = Some(total);
        debug!("{} rolled {} ({} + {})", color, total, dice.0, dice.1);

        let mut events = vec![GameEvent::DiceRolled { color, dice, total }];

        if total == 7 {
            let limit = self.config.robber_hand_limit;
            self.owed_discards.clear();
            for player in &self.players {
                let held = player.resources().total();
                if held > limit {
                    let count = held - limit;
                    debug!("{} holds {} cards and must discard {}", player.color(), held, count);
                    self.owed_discards.insert(player.color(), count);
                    events.push(GameEvent::DiscardRequired {
                        color: player.color(),
                        count,
                    });
                }
            }
            self.phase = GamePhase::RobberPlacement;
        } else {
            let production = self.board.production_for_roll(total);
            for (owner, resources) in production {
                if let Some(player) = self.players.iter_mut().find(|p| p.color() == owner) {
                    debug!("{} receives {}", owner, resources);
                    player.receive(&resources);
                    events.push(GameEvent::ResourcesProduced {
                        color: owner,
                        resources,
                    });
                }
            }
            self.phase = GamePhase::Gameplay;
        }

        DiceRoll { dice, events }
    }

    /// Pay a discard owed after a 7. Any owing color may discard, in any order.
    pub fn discard(&mut self, color: PlayerColor, hand: &ResourceHand) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_over()?;
        self.player_index(color)?;
        self.ensure_phase(GamePhase::RobberPlacement)?;

        let owed = self
            .owed_discards
            .get(&color)
            .copied()
            .ok_or(GameError::InvalidDiscard(color))?;
        // a hand the player actually holds cannot overflow its total
        if !self.ledger(color)?.can_afford(hand) || hand.total() != owed {
            return Err(GameError::InvalidDiscard(color));
        }
        if !self.ledger_mut(color)?.pay(hand) {
            return Err(GameError::InvalidDiscard(color));
        }
        self.owed_discards.remove(&color);
        info!("{} discarded {}", color, hand);

        Ok(vec![GameEvent::ResourcesDiscarded {
            color,
            resources: hand.clone(),
        }])
    }

    /// Move the robber after a 7, optionally stealing from `victim`
    pub fn move_robber<R: Rng + ?Sized>(
        &mut self,
        tile: TilePos,
        victim: Option<PlayerColor>,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_over()?;
        self.ensure_phase(GamePhase::RobberPlacement)?;
        if !self.owed_discards.is_empty() {
            return Err(GameError::DiscardPending);
        }

        let mover = self.current_color();
        self.validate_robber_move(mover, tile, victim)?;
        let events = self.relocate_robber(mover, tile, victim, rng)?;
        self.phase = GamePhase::Gameplay;
        Ok(events)
    }

    // ==================== Development Cards ====================

    /// Play one development card. At most one per turn, only during gameplay.
    pub fn play_development_card<R: Rng + ?Sized>(
        &mut self,
        color: PlayerColor,
        play: DevCardPlay,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_over()?;
        self.ensure_turn(color)?;
        if self.dev_card_played {
            return Err(GameError::CardAlreadyPlayed);
        }
        self.ensure_phase(GamePhase::Gameplay)?;

        let kind = play.kind();
        if self.ledger(color)?.development_card_count(kind) == 0 {
            return Err(GameError::NoSuchCard(color, kind));
        }
        match &play {
            DevCardPlay::Knight {
                target_tile,
                victim,
            } => self.validate_robber_move(color, *target_tile, *victim)?,
            DevCardPlay::RoadBuilding {
                roads: [first, second],
            } => {
                if !self.board.can_place_road(*first, color) {
                    return Err(GameError::IllegalPlacement(BuildSite::Road(*first)));
                }
                if !self.board.can_place_road_after(*second, color, *first) {
                    return Err(GameError::IllegalPlacement(BuildSite::Road(*second)));
                }
            }
            DevCardPlay::Monopoly { .. } | DevCardPlay::YearOfPlenty { .. } => {}
        }

        if !self.ledger_mut(color)?.play_development_card(kind) {
            return Err(GameError::NoSuchCard(color, kind));
        }
        self.dev_card_played = true;
        info!("{} played {}", color, kind);

        let mut events = vec![GameEvent::DevelopmentCardPlayed { color, kind }];
        match play {
            DevCardPlay::Knight {
                target_tile,
                victim,
            } => {
                events.extend(self.relocate_robber(color, target_tile, victim, rng)?);
                events.extend(self.update_largest_army(color)?);
            }
            DevCardPlay::Monopoly { resource } => {
                let mut taken = 0;
                for other in self.players.iter_mut().filter(|p| p.color() != color) {
                    taken += other.resources_mut().take_all(resource);
                }
                self.ledger_mut(color)?.resources_mut().add(resource, taken);
                info!("{} took {} {} with a monopoly", color, taken, resource);
                events.push(GameEvent::MonopolyTaken {
                    color,
                    resource,
                    taken,
                });
            }
            DevCardPlay::YearOfPlenty { resources } => {
                let granted = ResourceHand::from_resources(&resources);
                self.ledger_mut(color)?.receive(&granted);
                info!("{} took {} from the bank", color, granted);
                events.push(GameEvent::ResourcesGranted {
                    color,
                    resources: granted,
                });
            }
            DevCardPlay::RoadBuilding { roads } => {
                for edge in roads {
                    events.extend(self.build_road(edge, color)?);
                }
            }
        }

        Ok(events)
    }

    // ==================== Turn Management ====================

    /// End the current color's turn.
    ///
    /// During initial placement this walks the snake order: forward through
    /// the colors, then back, with the last color of each pass going twice.
    pub fn end_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_not_over()?;
        match self.phase {
            GamePhase::InitialPlacement => self.advance_initial_placement(),
            GamePhase::Gameplay => Ok(self.finish_turn()),
            phase => Err(GameError::WrongPhase(phase)),
        }
    }

    fn advance_initial_placement(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let n = self.players.len();
        let count = self.placement_count + 1;
        if count == 2 * n {
            self.check_placement_integrity()?;
        }

        let color = self.current_color();
        self.placement_count = count;
        let mut events = Vec::new();

        if count == 2 * n {
            self.phase = GamePhase::RollDice;
            debug!("initial placement succeeded, {} rolls first", color);
            events.push(GameEvent::InitialPlacementFinished);
        } else if count < n {
            self.turn = (self.turn + 1) % n;
        } else if count > n {
            self.turn = (self.turn + n - 1) % n;
        }

        let next = self.current_color();
        debug!("placement {} of {} done, {} to place", count, 2 * n, next);
        events.push(GameEvent::TurnEnded { color, next });
        Ok(events)
    }

    fn check_placement_integrity(&self) -> Result<(), GameError> {
        for player in &self.players {
            let settlements = player.num_settlements();
            let roads = player.num_roads();
            if settlements != 2 || roads != 2 {
                return Err(GameError::PlacementIntegrity {
                    color: player.color(),
                    settlements,
                    roads,
                });
            }
        }
        Ok(())
    }

    fn finish_turn(&mut self) -> Vec<GameEvent> {
        let color = self.current_color();
        let mut events = Vec::new();

        if let Some((winner, points)) = self.leader_at_target() {
            warn!("{} won the game with {} victory points", winner, points);
            self.winner = Some(winner);
            events.push(GameEvent::GameWon {
                color: winner,
                victory_points: points,
            });
        }

        self.turn = (self.turn + 1) % self.players.len();
        self.phase = GamePhase::RollDice;
        self.dev_card_played = false;

        let next = self.current_color();
        debug!("turn passes from {} to {}", color, next);
        events.push(GameEvent::TurnEnded { color, next });
        events
    }

    /// The color at or past the target, the current color first
    fn leader_at_target(&self) -> Option<(PlayerColor, u32)> {
        let target = self.config.victory_points_to_win;
        let n = self.players.len();
        (0..n)
            .map(|i| &self.players[(self.turn + i) % n])
            .map(|p| (p.color(), p.total_victory_points(self.config.special_card_points)))
            .find(|(_, points)| *points >= target)
    }

    // ==================== Internal Helpers ====================

    fn building_phase(initial: bool) -> GamePhase {
        if initial {
            GamePhase::InitialPlacement
        } else {
            GamePhase::Gameplay
        }
    }

    fn ensure_not_over(&self) -> Result<(), GameError> {
        match self.winner {
            Some(_) => Err(GameError::GameOver),
            None => Ok(()),
        }
    }

    fn ensure_phase(&self, expected: GamePhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase(self.phase))
        }
    }

    fn ensure_turn(&self, color: PlayerColor) -> Result<(), GameError> {
        self.player_index(color)?;
        let current = self.current_color();
        if color == current {
            Ok(())
        } else {
            Err(GameError::NotYourTurn { color, current })
        }
    }

    fn player_index(&self, color: PlayerColor) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.color() == color)
            .ok_or(GameError::UnknownPlayer(color))
    }

    fn ledger(&self, color: PlayerColor) -> Result<&Player, GameError> {
        let index = self.player_index(color)?;
        Ok(&self.players[index])
    }

    fn ledger_mut(&mut self, color: PlayerColor) -> Result<&mut Player, GameError> {
        let index = self.player_index(color)?;
        Ok(&mut self.players[index])
    }

    /// Deduct `cost`, or fail without touching the hand
    fn charge(&mut self, color: PlayerColor, cost: &ResourceHand) -> Result<(), GameError> {
        if self.ledger_mut(color)?.pay(cost) {
            Ok(())
        } else {
            Err(GameError::InsufficientResources(color))
        }
    }

    /// Place a validated, paid-for road and re-score longest road
    fn build_road(&mut self, edge: RoadEdge, color: PlayerColor) -> Result<Vec<GameEvent>, GameError> {
        self.ledger_mut(color)?.record_road(edge);
        self.board.place_road(edge, color);

        let [start, end] = edge.endpoints();
        let length = self.board.road_length(color, start);
        info!("{} built a road from {} to {}", color, start, end);
        debug!("{}'s new road has length {}", color, length);

        let mut events = vec![GameEvent::RoadBuilt {
            color,
            edge,
            length,
        }];
        events.extend(self.update_longest_road(color, length)?);
        Ok(events)
    }

    fn update_longest_road(&mut self, color: PlayerColor, length: u32) -> Result<Option<GameEvent>, GameError> {
        let earns = match self.longest_road {
            None => length >= self.config.longest_road_min,
            Some(holder) => length > holder.count,
        };
        if !earns {
            return Ok(None);
        }

        let previous = self.longest_road.map(|h| h.color);
        self.longest_road = Some(TitleHolder {
            color,
            count: length,
        });
        if previous == Some(color) {
            debug!("{} extended the longest road to {}", color, length);
            return Ok(None);
        }

        if let Some(previous) = previous {
            self.ledger_mut(previous)?
                .remove_special_card(SpecialCard::LongestRoad);
            info!("{} lost the longest road card", previous);
        }
        self.ledger_mut(color)?.add_special_card(SpecialCard::LongestRoad);
        info!("{} now has longest road with a road length of {}", color, length);

        Ok(Some(GameEvent::LongestRoadChanged {
            previous,
            holder: color,
            length,
        }))
    }

    fn update_largest_army(&mut self, color: PlayerColor) -> Result<Option<GameEvent>, GameError> {
        let knights = self.ledger(color)?.knights_played();
        let earns = knights >= self.config.largest_army_min
            && self.largest_army.map_or(true, |h| knights > h.count);
        if !earns {
            return Ok(None);
        }

        let previous = self.largest_army.map(|h| h.color);
        self.largest_army = Some(TitleHolder {
            color,
            count: knights,
        });
        if previous == Some(color) {
            return Ok(None);
        }

        if let Some(previous) = previous {
            self.ledger_mut(previous)?
                .remove_special_card(SpecialCard::LargestArmy);
            info!("{} lost the largest army card", previous);
        }
        self.ledger_mut(color)?.add_special_card(SpecialCard::LargestArmy);
        info!("{} now has the largest army with {} knights", color, knights);

        Ok(Some(GameEvent::LargestArmyChanged {
            previous,
            holder: color,
            knights,
        }))
    }

    fn validate_robber_move(
        &self,
        mover: PlayerColor,
        tile: TilePos,
        victim: Option<PlayerColor>,
    ) -> Result<(), GameError> {
        if !tile.is_on_board() || tile == self.board.robber() {
            return Err(GameError::InvalidRobberTarget(tile));
        }
        if let Some(victim) = victim {
            self.player_index(victim)?;
            if victim == mover {
                return Err(GameError::InvalidVictim(victim));
            }
        }
        Ok(())
    }

    fn relocate_robber<R: Rng + ?Sized>(
        &mut self,
        mover: PlayerColor,
        tile: TilePos,
        victim: Option<PlayerColor>,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        let from = self.board.robber();
        self.board.move_robber(tile);
        info!("{} moved the robber from {} to {}", mover, from, tile);

        let mut events = vec![GameEvent::RobberMoved {
            color: mover,
            from,
            to: tile,
        }];

        if let Some(victim) = victim {
            let stolen = self.ledger_mut(victim)?.resources_mut().remove_random(rng);
            match stolen {
                Some(resource) => {
                    self.ledger_mut(mover)?.resources_mut().add(resource, 1);
                    debug!("{} stole {} from {}", mover, resource, victim);
                }
                None => debug!("{} had nothing for {} to steal", victim, mover),
            }
            events.push(GameEvent::ResourceStolen {
                thief: mover,
                victim,
                resource: stolen,
            });
        }

        Ok(events)
    }
}
