//! # Uno Game Implementation
//!
//! Two-seat Uno with the standard 108-card deck. The deck, the discard pile
//! and both hands live in the state together with the generator used for the
//! opening shuffle and every later reshuffle, so a snapshot replays exactly.
//!
//! ## Rules
//! - A card is playable if it is wild, matches the current colour, or matches
//!   the value of the card on top of the discard pile
//! - Skip makes the next seat lose its turn, Reverse flips the direction
//! - DrawTwo and WildDrawFour add to a pending penalty on the next seat,
//!   which must either stack another playable draw card on it or draw the
//!   whole accumulated count
//! - The first seat to empty its hand wins

use crate::{GameError, GameState, PLAYER_ONE, PLAYER_TWO};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Phase;

pub const DECK_SIZE: usize = 108;
pub const HAND_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardColor {
    Red,
    Blue,
    Green,
    Yellow,
    /// Colour of a wild card that has not been played yet.
    Wild,
}

impl CardColor {
    /// The four colours a wild card can be declared as.
    pub const DECLARABLE: [CardColor; 4] = [CardColor::Red, CardColor::Blue, CardColor::Green, CardColor::Yellow];

    fn letter(self) -> char {
        match self {
            CardColor::Red => 'R',
            CardColor::Blue => 'B',
            CardColor::Green => 'G',
            CardColor::Yellow => 'Y',
            CardColor::Wild => 'W',
        }
    }
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardColor::Red => "red",
            CardColor::Blue => "blue",
            CardColor::Green => "green",
            CardColor::Yellow => "yellow",
            CardColor::Wild => "wild",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for CardColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "r" | "red" => Ok(CardColor::Red),
            "b" | "blue" => Ok(CardColor::Blue),
            "g" | "green" => Ok(CardColor::Green),
            "y" | "yellow" => Ok(CardColor::Yellow),
            _ => Err(format!("Unknown colour '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardValue {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl CardValue {
    pub fn is_wild(self) -> bool {
        matches!(self, CardValue::Wild | CardValue::WildDrawFour)
    }

    pub fn points(self) -> u32 {
        match self {
            CardValue::Number(n) => u32::from(n),
            CardValue::Skip | CardValue::Reverse | CardValue::DrawTwo => 20,
            CardValue::Wild | CardValue::WildDrawFour => 50,
        }
    }

    /// Cards the next seat must draw when this card is played.
    pub fn penalty(self) -> u32 {
        match self {
            CardValue::DrawTwo => 2,
            CardValue::WildDrawFour => 4,
            _ => 0,
        }
    }
}

impl fmt::Display for CardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardValue::Number(n) => write!(f, "{}", n),
            CardValue::Skip => write!(f, "Skip"),
            CardValue::Reverse => write!(f, "Reverse"),
            CardValue::DrawTwo => write!(f, "+2"),
            CardValue::Wild => write!(f, "Wild"),
            CardValue::WildDrawFour => write!(f, "Wild+4"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: usize,
    pub color: CardColor,
    pub value: CardValue,
    pub points: u32,
}

impl Card {
    fn new(id: usize, color: CardColor, value: CardValue) -> Self {
        Self {
            id,
            color,
            value,
            points: value.points(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}#{}", self.color.letter(), self.value, self.id)
    }
}

/// Builds the unshuffled 108-card deck with ids `0..108`.
pub fn build_deck() -> Vec<Card> {
    let mut values = Vec::with_capacity(25);
    values.push(CardValue::Number(0));
    for n in 1..=9 {
        values.push(CardValue::Number(n));
        values.push(CardValue::Number(n));
    }
    for special in [CardValue::Skip, CardValue::Reverse, CardValue::DrawTwo] {
        values.push(special);
        values.push(special);
    }

    let mut deck = Vec::with_capacity(DECK_SIZE);
    for color in CardColor::DECLARABLE {
        for &value in &values {
            deck.push(Card::new(deck.len(), color, value));
        }
    }
    for value in [CardValue::Wild, CardValue::WildDrawFour] {
        for _ in 0..4 {
            deck.push(Card::new(deck.len(), CardColor::Wild, value));
        }
    }
    deck
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnoPlayer {
    pub id: i32,
    pub name: String,
    pub hand: Vec<Card>,
    pub is_bot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnoMove {
    /// Plays a card from the hand; wild cards carry the declared colour.
    Play { card_id: usize, color: Option<CardColor> },
    Draw,
}

impl fmt::Display for UnoMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnoMove::Draw => write!(f, "draw"),
            UnoMove::Play { card_id, color: None } => write!(f, "play {}", card_id),
            UnoMove::Play { card_id, color: Some(c) } => write!(f, "play {} {}", card_id, c),
        }
    }
}

impl FromStr for UnoMove {
    type Err = String;

    /// Parses `draw`, `play <id>` or `play <id> <colour>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [cmd] if cmd.eq_ignore_ascii_case("draw") || cmd.eq_ignore_ascii_case("d") => Ok(UnoMove::Draw),
            [cmd, id, rest @ ..] if cmd.eq_ignore_ascii_case("play") || cmd.eq_ignore_ascii_case("p") => {
                let card_id = id.parse::<usize>().map_err(|e| e.to_string())?;
                let color = match rest {
                    [] => None,
                    [c] => Some(c.parse::<CardColor>()?),
                    _ => return Err("Too many arguments".to_string()),
                };
                Ok(UnoMove::Play { card_id, color })
            }
            _ => Err("Expected 'draw' or 'play <id> [colour]'".to_string()),
        }
    }
}

/// Represents the complete state of an Uno game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnoState {
    /// Draw pile, top card last.
    deck: Vec<Card>,
    /// Discard pile, top card last.
    discard_pile: Vec<Card>,
    players: [UnoPlayer; 2],
    current_player_index: usize,
    direction: i8,
    last_played_card: Option<Card>,
    draw_count: u32,
    phase: Phase,
    winner: Option<usize>,
    turns_played: u32,
    rng: Xoshiro256PlusPlus,
}

impl UnoState {
    /// Shuffles a fresh deck, deals seven cards to the player and the bot and
    /// turns up the first number card as the starting discard.
    pub fn new(seed: u64) -> Self {
        Self::with_names("Player", "Bot", seed)
    }

    pub fn with_names(player: &str, bot: &str, seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut deck = build_deck();
        deck.shuffle(&mut rng);

        let mut deal = |name: &str, id: i32, is_bot: bool| {
            let hand = deck.split_off(deck.len() - HAND_SIZE);
            UnoPlayer {
                id,
                name: name.to_string(),
                hand,
                is_bot,
            }
        };
        let players = [deal(player, PLAYER_ONE, false), deal(bot, PLAYER_TWO, true)];

        // The deck holds 76 number cards, so this loop always finds one.
        let mut discard_pile = Vec::with_capacity(DECK_SIZE);
        while let Some(card) = deck.pop() {
            if matches!(card.value, CardValue::Number(_)) {
                discard_pile.push(card);
                break;
            }
            deck.insert(0, card);
        }

        Self {
            deck,
            discard_pile,
            players,
            current_player_index: 0,
            direction: 1,
            last_played_card: None,
            draw_count: 0,
            phase: Phase::Playing,
            winner: None,
            turns_played: 0,
            rng,
        }
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    pub fn top_card(&self) -> Option<&Card> {
        self.discard_pile.last()
    }

    /// Colour to match: the colour of the discard top, which for a played
    /// wild card is the declared colour.
    pub fn current_color(&self) -> Option<CardColor> {
        self.top_card().map(|c| c.color)
    }

    pub fn players(&self) -> &[UnoPlayer; 2] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current(&self) -> &UnoPlayer {
        &self.players[self.current_player_index]
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn last_played_card(&self) -> Option<&Card> {
        self.last_played_card.as_ref()
    }

    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winner_index(&self) -> Option<usize> {
        self.winner
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn total_cards(&self) -> usize {
        self.deck.len() + self.discard_pile.len() + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    /// Checks whether `card` may be played on the current discard top.
    pub fn is_playable(&self, card: &Card) -> bool {
        if card.value.is_wild() {
            return true;
        }
        match self.top_card() {
            Some(top) => card.color == top.color || card.value == top.value,
            None => true,
        }
    }

    /// Whether `card` may be played by the seat to move right now. While a
    /// draw penalty is pending only playable draw cards qualify.
    pub fn can_play(&self, card: &Card) -> bool {
        if self.draw_count > 0 && card.value.penalty() == 0 {
            return false;
        }
        self.is_playable(card)
    }

    fn advance(&mut self) {
        let next = self.current_player_index as i32 + i32::from(self.direction);
        self.current_player_index = next.rem_euclid(self.players.len() as i32) as usize;
    }

    /// Turns the discard pile (minus its top) into a new shuffled deck.
    /// Wild cards lose their declared colour.
    fn reshuffle(&mut self) {
        let Some(top) = self.discard_pile.pop() else {
            return;
        };
        let mut cards: Vec<Card> = self.discard_pile.drain(..).collect();
        self.discard_pile.push(top);
        for card in cards.iter_mut().filter(|c| c.value.is_wild()) {
            card.color = CardColor::Wild;
        }
        cards.shuffle(&mut self.rng);
        self.deck = cards;
    }

    /// Moves up to `count` cards from the deck into the current hand,
    /// reshuffling when the deck runs out. Stops short if no card is left.
    fn draw_cards(&mut self, count: u32) {
        for _ in 0..count {
            if self.deck.is_empty() {
                self.reshuffle();
            }
            let Some(card) = self.deck.pop() else {
                break;
            };
            self.players[self.current_player_index].hand.push(card);
        }
    }

    fn play_card(&mut self, card_id: usize, declared: Option<CardColor>) {
        let hand = &mut self.players[self.current_player_index].hand;
        let Some(pos) = hand.iter().position(|c| c.id == card_id) else {
            return;
        };
        let mut card = hand.remove(pos);
        if card.value.is_wild() {
            if let Some(color) = declared {
                card.color = color;
            }
        }
        self.discard_pile.push(card);
        self.last_played_card = Some(card);

        if self.players[self.current_player_index].hand.is_empty() {
            self.phase = Phase::GameOver;
            self.winner = Some(self.current_player_index);
            return;
        }

        match card.value {
            CardValue::Skip => self.advance(),
            CardValue::Reverse => self.direction = -self.direction,
            _ => {}
        }
        self.draw_count += card.value.penalty();
        self.advance();
    }

    fn find_card(&self, card_id: usize) -> Option<&Card> {
        self.current().hand.iter().find(|c| c.id == card_id)
    }
}

impl fmt::Display for UnoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.top_card() {
            Some(top) => writeln!(f, "Discard: {}  (colour {})", top, top.color)?,
            None => writeln!(f, "Discard: empty")?,
        }
        writeln!(f, "Deck: {} cards, pending draw: {}", self.deck.len(), self.draw_count)?;
        for (i, player) in self.players.iter().enumerate() {
            let marker = if i == self.current_player_index { '>' } else { ' ' };
            if player.is_bot {
                writeln!(f, "{} {}: {} cards", marker, player.name, player.hand.len())?;
            } else {
                let cards: Vec<String> = player.hand.iter().map(|c| c.to_string()).collect();
                writeln!(f, "{} {}: {}", marker, player.name, cards.join(" "))?;
            }
        }
        Ok(())
    }
}

impl GameState for UnoState {
    type Move = UnoMove;

    /// Each playable wild card is listed once per declarable colour.
    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.phase == Phase::GameOver {
            return Vec::new();
        }
        let mut moves = Vec::new();
        for card in self.current().hand.iter().filter(|c| self.can_play(c)) {
            if card.value.is_wild() {
                moves.extend(CardColor::DECLARABLE.iter().map(|&c| UnoMove::Play {
                    card_id: card.id,
                    color: Some(c),
                }));
            } else {
                moves.push(UnoMove::Play {
                    card_id: card.id,
                    color: None,
                });
            }
        }
        moves.push(UnoMove::Draw);
        moves
    }

    fn make_move(&mut self, mv: &Self::Move) {
        match *mv {
            UnoMove::Draw => {
                let count = if self.draw_count > 0 { self.draw_count } else { 1 };
                self.draw_count = 0;
                self.draw_cards(count);
                self.advance();
            }
            UnoMove::Play { card_id, color } => self.play_card(card_id, color),
        }
        self.turns_played += 1;
    }

    fn is_terminal(&self) -> bool {
        self.phase == Phase::GameOver
    }

    fn get_winner(&self) -> Option<i32> {
        self.winner.map(|i| self.players[i].id)
    }

    fn get_current_player(&self) -> i32 {
        self.current().id
    }

    fn check_invariants(&self) -> Result<(), GameError> {
        if self.current_player_index >= self.players.len() {
            return Err(GameError::InvariantViolation(format!(
                "seat {} to move, only {} seats",
                self.current_player_index,
                self.players.len()
            )));
        }
        if self.direction != 1 && self.direction != -1 {
            return Err(GameError::InvariantViolation(format!("direction {} is not +1 or -1", self.direction)));
        }
        if self.discard_pile.is_empty() {
            return Err(GameError::InvariantViolation("discard pile is empty".to_string()));
        }
        match (self.winner, self.phase) {
            (Some(w), Phase::GameOver) if w < self.players.len() => {}
            (None, Phase::Playing) => {}
            (winner, phase) => {
                return Err(GameError::InvariantViolation(format!(
                    "winner {:?} does not match phase {:?}",
                    winner, phase
                )));
            }
        }
        let total = self.total_cards();
        if total != DECK_SIZE {
            return Err(GameError::InvariantViolation(format!("{} cards in play, expected {}", total, DECK_SIZE)));
        }
        let mut seen = [false; DECK_SIZE];
        let all = self
            .deck
            .iter()
            .chain(&self.discard_pile)
            .chain(self.players.iter().flat_map(|p| p.hand.iter()));
        for card in all {
            if card.id >= DECK_SIZE || seen[card.id] {
                return Err(GameError::InvariantViolation(format!("card id {} is out of range or duplicated", card.id)));
            }
            seen[card.id] = true;
        }
        if self.deck.iter().any(|c| c.value.is_wild() && c.color != CardColor::Wild) {
            return Err(GameError::InvariantViolation("wild card in the deck keeps a declared colour".to_string()));
        }
        if let Some(winner) = self.winner {
            if self.players.get(winner).is_some_and(|p| !p.hand.is_empty()) {
                return Err(GameError::InvariantViolation("winner still holds cards".to_string()));
            }
        }
        Ok(())
    }

    fn validate_move(&self, mv: &Self::Move) -> Result<(), GameError> {
        if self.phase == Phase::GameOver {
            return Err(GameError::InvalidAction("game is already over".to_string()));
        }
        let UnoMove::Play { card_id, color } = *mv else {
            return Ok(());
        };
        if card_id >= DECK_SIZE {
            return Err(GameError::MalformedInput(format!("unknown card id {}", card_id)));
        }
        let Some(card) = self.find_card(card_id) else {
            return Err(GameError::InvalidAction(format!("card {} is not in your hand", card_id)));
        };
        match (card.value.is_wild(), color) {
            (true, None) | (true, Some(CardColor::Wild)) => {
                return Err(GameError::MalformedInput(format!("{} needs a declared colour", card)));
            }
            (false, Some(_)) => {
                return Err(GameError::MalformedInput(format!("{} cannot take a declared colour", card)));
            }
            _ => {}
        }
        if self.draw_count > 0 && card.value.penalty() == 0 {
            return Err(GameError::InvalidAction(format!(
                "{} cards are pending: stack a draw card or draw",
                self.draw_count
            )));
        }
        if !self.is_playable(card) {
            return Err(GameError::InvalidAction(format!("{} does not match the discard pile", card)));
        }
        Ok(())
    }
}
