use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

/// An evaluated five-card hand.
///
/// `kickers` lists the ranks that decide ties inside `category`, high to low
/// (the grouped ranks first, then the loose cards). `value` folds category and
/// kickers into one scalar, so comparing two hands is comparing two integers.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: [Card; 5],
    pub category: Category,
    pub kickers: Vec<Rank>,
    pub value: u32,
}

/// Kicker slots are base-16 digits; ranks never exceed 14.
const KICKER_BASE: u32 = 16;
const KICKER_SLOTS: u32 = 5;

pub fn evaluate(cards: &[Card; 5]) -> Hand {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut suit_counts = [0u8; 4];
    let mut rank_mask: u16 = 0;
    for &c in cards.iter() {
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        suit_counts[c.suit.index()] += 1;
        rank_mask |= 1u16 << r;
    }

    let is_flush = suit_counts.iter().any(|&count| count == 5);
    let straight_high = straight_high_from_mask(rank_mask);

    let (quads, trips, pairs, singles) = classify_multiples(&rank_counts);

    let (category, kickers): (Category, Vec<u8>) = match straight_high {
        Some(14) if is_flush => (Category::RoyalFlush, vec![14]),
        Some(high) if is_flush => (Category::StraightFlush, vec![high]),
        _ if !quads.is_empty() => (Category::FourOfAKind, concat(&[&quads, &singles])),
        _ if !trips.is_empty() && !pairs.is_empty() => {
            (Category::FullHouse, vec![trips[0], pairs[0]])
        }
        _ if is_flush => (Category::Flush, singles),
        Some(high) => (Category::Straight, vec![high]),
        None if !trips.is_empty() => (Category::ThreeOfAKind, concat(&[&trips, &singles])),
        None if pairs.len() >= 2 => (Category::TwoPair, concat(&[&pairs, &singles])),
        None if pairs.len() == 1 => (Category::OnePair, concat(&[&pairs, &singles])),
        None => (Category::HighCard, singles),
    };

    let mut sorted = *cards;
    sorted.sort_unstable_by(|a, b| b.rank.cmp(&a.rank).then(b.suit.cmp(&a.suit)));

    Hand {
        cards: sorted,
        category,
        value: hand_value(category, &kickers),
        kickers: kickers.into_iter().filter_map(Rank::from_u8).collect(),
    }
}

/// Sign of `a.value - b.value`.
pub fn compare_hands(a: &Hand, b: &Hand) -> Ordering {
    a.value.cmp(&b.value)
}

/// Best five-card hand out of seven cards.
///
/// All 21 subsets are visited in lexicographic index order and only a strictly
/// greater value replaces the current best, so among equal-valued subsets the
/// first one enumerated is returned.
pub fn best_hand(cards: &[Card; 7]) -> Hand {
    let mut best: Option<Hand> = None;
    for combo in five_card_subsets(cards) {
        let hand = evaluate(&combo);
        match &best {
            Some(current) if hand.value <= current.value => {}
            _ => best = Some(hand),
        }
    }
    // 21 subsets are always produced
    best.unwrap_or_else(|| evaluate(&[cards[0], cards[1], cards[2], cards[3], cards[4]]))
}

pub fn five_card_subsets(cards: &[Card; 7]) -> Vec<[Card; 5]> {
    let mut subsets = Vec::with_capacity(21);
    for a in 0..3 {
        for b in a + 1..4 {
            for c in b + 1..5 {
                for d in c + 1..6 {
                    for e in d + 1..7 {
                        subsets.push([cards[a], cards[b], cards[c], cards[d], cards[e]]);
                    }
                }
            }
        }
    }
    subsets
}

fn hand_value(category: Category, kickers: &[u8]) -> u32 {
    let mut value = category as u32;
    for slot in 0..KICKER_SLOTS as usize {
        value = value * KICKER_BASE + kickers.get(slot).copied().unwrap_or(0) as u32;
    }
    value
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    let mut m = mask;
    // Ace also plays low
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    // Sliding 5-bit window from Ace(14) down to 5
    for high in (5..=14u16).rev() {
        let window = 0b11111u16 << (high - 4);
        if (m & window) == window {
            return Some(high as u8);
        }
    }
    None
}

/// Splits ranks by multiplicity, each group ordered high to low.
fn classify_multiples(rank_counts: &[u8; 15]) -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut quads = vec![];
    let mut trips = vec![];
    let mut pairs = vec![];
    let mut singles = vec![];
    for r in (2..=14u8).rev() {
        match rank_counts[r as usize] {
            4 => quads.push(r),
            3 => trips.push(r),
            2 => pairs.push(r),
            1 => singles.push(r),
            _ => {}
        }
    }
    (quads, trips, pairs, singles)
}

fn concat(groups: &[&[u8]]) -> Vec<u8> {
    groups.iter().flat_map(|g| g.iter().copied()).collect()
}
