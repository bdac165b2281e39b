//! Leitner-box scheduling.
//!
//! Cards move up one box each time they are recalled and fall back to the
//! first box whenever they are forgotten. Each box has a fixed review
//! interval; a card is due once its next review date is on or before today.
//!
//! Everything here is a pure function over card snapshots. Callers own the
//! store and persist whatever `apply_review` hands back.

use chrono::{Days, NaiveDate};

use crate::models::{Card, LeitnerBox};

/// Review interval in days for boxes 1 through 5
pub const BOX_INTERVALS: [u64; 5] = [1, 3, 7, 14, 30];

/// Days until a card in `leitner_box` should be seen again
pub fn interval_days(leitner_box: LeitnerBox) -> u64 {
    BOX_INTERVALS[leitner_box.index()]
}

/// Learner's self-reported result for one review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Recalled,
    Forgot,
}

impl ReviewOutcome {
    /// Box a card currently in `current` lands in after this outcome
    pub fn target_box(self, current: LeitnerBox) -> LeitnerBox {
        match self {
            ReviewOutcome::Recalled => current.promoted(),
            ReviewOutcome::Forgot => LeitnerBox::FIRST,
        }
    }
}

impl From<bool> for ReviewOutcome {
    fn from(succeeded: bool) -> Self {
        if succeeded {
            ReviewOutcome::Recalled
        } else {
            ReviewOutcome::Forgot
        }
    }
}

/// Cards owned by `owner` that are due on `today`, hardest boxes first.
///
/// The sort is stable, so cards sharing a box keep their input order.
pub fn due_cards<'a>(cards: &'a [Card], owner: &str, today: NaiveDate) -> Vec<&'a Card> {
    let mut due: Vec<&Card> = cards
        .iter()
        .filter(|card| card.owner == owner && card.next_review_date <= today)
        .collect();
    due.sort_by_key(|card| card.leitner_box);
    due
}

/// Card state after a review on `review_date`.
///
/// Forgetting resets to the first box from anywhere, it does not step down
/// one box.
pub fn apply_review(card: &Card, outcome: impl Into<ReviewOutcome>, review_date: NaiveDate) -> Card {
    let outcome = outcome.into();
    let new_box = outcome.target_box(card.leitner_box);
    let next_review_date = review_date
        .checked_add_days(Days::new(interval_days(new_box)))
        .unwrap_or(NaiveDate::MAX);

    Card {
        leitner_box: new_box,
        next_review_date,
        last_reviewed: Some(review_date),
        ..card.clone()
    }
}

/// Number of the owner's cards sitting in each box, indexed by `LeitnerBox::index`
pub fn box_counts(cards: &[Card], owner: &str) -> [usize; 5] {
    let mut counts = [0usize; 5];
    for card in cards.iter().filter(|card| card.owner == owner) {
        counts[card.leitner_box.index()] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn card_in(owner: &str, number: u8, next: &str) -> Card {
        let mut card = Card::new(owner, format!("front {}", number), "back".into(), vec![], day(next));
        card.leitner_box = LeitnerBox::new(number).unwrap();
        card
    }

    #[test]
    fn interval_table_matches_boxes() {
        let days: Vec<u64> = LeitnerBox::ALL.iter().map(|b| interval_days(*b)).collect();
        assert_eq!(days, vec![1, 3, 7, 14, 30]);
    }

    #[test]
    fn success_promotes_one_box_up_to_the_cap() {
        let expected = [2, 3, 4, 5, 5];
        for (b, want) in LeitnerBox::ALL.iter().zip(expected) {
            let card = card_in("ada", b.number(), "2024-01-01");
            let reviewed = apply_review(&card, true, day("2024-01-10"));
            assert_eq!(reviewed.leitner_box.number(), want);
        }
    }

    #[test]
    fn failure_resets_to_first_box_from_every_box() {
        for b in LeitnerBox::ALL {
            let card = card_in("ada", b.number(), "2024-01-01");
            let reviewed = apply_review(&card, false, day("2024-01-10"));
            assert_eq!(reviewed.leitner_box, LeitnerBox::FIRST);
            assert_eq!(reviewed.next_review_date, day("2024-01-11"));
        }
    }

    #[test]
    fn next_date_is_review_date_plus_new_box_interval() {
        let review = day("2024-02-20");
        for b in LeitnerBox::ALL {
            for outcome in [ReviewOutcome::Recalled, ReviewOutcome::Forgot] {
                let card = card_in("ada", b.number(), "2024-02-01");
                let reviewed = apply_review(&card, outcome, review);
                let gap = (reviewed.next_review_date - review).num_days() as u64;
                assert_eq!(gap, interval_days(reviewed.leitner_box));
            }
        }
    }

    #[test]
    fn recalled_box_three_moves_to_box_four_in_two_weeks() {
        let card = card_in("ada", 3, "2024-01-10");
        let reviewed = apply_review(&card, true, day("2024-01-10"));
        assert_eq!(reviewed.leitner_box.number(), 4);
        assert_eq!(reviewed.next_review_date, day("2024-01-24"));
        assert_eq!(reviewed.last_reviewed, Some(day("2024-01-10")));
    }

    #[test]
    fn forgotten_mastered_card_is_due_tomorrow() {
        let card = card_in("ada", 5, "2024-01-10");
        let reviewed = apply_review(&card, false, day("2024-01-10"));
        assert_eq!(reviewed.leitner_box.number(), 1);
        assert_eq!(reviewed.next_review_date, day("2024-01-11"));
    }

    #[test]
    fn recalled_mastered_card_stays_in_last_box() {
        let card = card_in("ada", 5, "2024-01-10");
        let reviewed = apply_review(&card, ReviewOutcome::Recalled, day("2024-01-10"));
        assert_eq!(reviewed.leitner_box, LeitnerBox::LAST);
        assert_eq!(reviewed.next_review_date, day("2024-02-09"));
    }

    #[test]
    fn review_leaves_content_untouched() {
        let mut card = card_in("ada", 2, "2024-01-10");
        card.tags = vec!["python".into()];
        let reviewed = apply_review(&card, true, day("2024-01-10"));
        assert_eq!(reviewed.id, card.id);
        assert_eq!(reviewed.owner, card.owner);
        assert_eq!(reviewed.front, card.front);
        assert_eq!(reviewed.back, card.back);
        assert_eq!(reviewed.tags, card.tags);
        assert_eq!(reviewed.created_at, card.created_at);
    }

    #[test]
    fn review_near_the_end_of_the_calendar_saturates() {
        let card = card_in("ada", 4, "2024-01-10");
        let reviewed = apply_review(&card, true, NaiveDate::MAX);
        assert_eq!(reviewed.next_review_date, NaiveDate::MAX);
    }

    #[test]
    fn due_cards_are_ordered_by_box() {
        let cards = vec![
            card_in("ada", 3, "2024-01-10"),
            card_in("ada", 1, "2024-01-10"),
            card_in("ada", 2, "2024-01-10"),
        ];
        let due = due_cards(&cards, "ada", day("2024-01-10"));
        let boxes: Vec<u8> = due.iter().map(|c| c.leitner_box.number()).collect();
        assert_eq!(boxes, vec![1, 2, 3]);
    }

    #[test]
    fn ties_keep_input_order() {
        let cards = vec![
            card_in("ada", 2, "2024-01-01"),
            card_in("ada", 1, "2024-01-02"),
            card_in("ada", 2, "2024-01-03"),
            card_in("ada", 1, "2024-01-04"),
        ];
        let due = due_cards(&cards, "ada", day("2024-01-10"));
        let ids: Vec<&str> = due.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![cards[1].id.as_str(), cards[3].id.as_str(), cards[0].id.as_str(), cards[2].id.as_str()]);
    }

    #[test]
    fn card_due_tomorrow_shows_up_once_the_day_arrives() {
        let cards = vec![card_in("ada", 2, "2024-01-11")];
        assert!(due_cards(&cards, "ada", day("2024-01-10")).is_empty());
        assert_eq!(due_cards(&cards, "ada", day("2024-01-11")).len(), 1);
    }

    #[test]
    fn due_cards_filters_by_owner_and_date() {
        let cards = vec![
            card_in("ada", 1, "2024-01-09"),
            card_in("bo", 1, "2024-01-09"),
            card_in("ada", 4, "2024-01-10"),
            card_in("ada", 2, "2024-01-12"),
        ];
        let today = day("2024-01-10");
        let due = due_cards(&cards, "ada", today);
        assert_eq!(due.len(), 2);
        assert!(due.iter().all(|c| c.owner == "ada" && c.next_review_date <= today));
        for card in cards.iter().filter(|c| c.owner == "ada" && c.next_review_date <= today) {
            assert!(due.iter().any(|d| d.id == card.id));
        }
    }

    #[test]
    fn due_cards_is_repeatable() {
        let cards = vec![
            card_in("ada", 5, "2024-01-01"),
            card_in("ada", 2, "2024-01-05"),
            card_in("ada", 2, "2024-01-03"),
        ];
        let today = day("2024-01-10");
        let first: Vec<String> = due_cards(&cards, "ada", today).iter().map(|c| c.id.clone()).collect();
        let second: Vec<String> = due_cards(&cards, "ada", today).iter().map(|c| c.id.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn nothing_due_is_an_empty_queue() {
        let cards = vec![card_in("ada", 3, "2024-02-01")];
        assert!(due_cards(&cards, "ada", day("2024-01-10")).is_empty());
        assert!(due_cards(&[], "ada", day("2024-01-10")).is_empty());
    }

    #[test]
    fn box_counts_only_see_the_owner() {
        let cards = vec![
            card_in("ada", 1, "2024-01-01"),
            card_in("ada", 1, "2024-01-01"),
            card_in("ada", 5, "2024-01-01"),
            card_in("bo", 3, "2024-01-01"),
        ];
        assert_eq!(box_counts(&cards, "ada"), [2, 0, 0, 0, 1]);
        assert_eq!(box_counts(&cards, "bo"), [0, 0, 1, 0, 0]);
    }

    #[test]
    fn target_box_previews_both_outcomes() {
        let third = LeitnerBox::new(3).unwrap();
        assert_eq!(ReviewOutcome::Recalled.target_box(third).number(), 4);
        assert_eq!(ReviewOutcome::Forgot.target_box(third), LeitnerBox::FIRST);
    }
}
