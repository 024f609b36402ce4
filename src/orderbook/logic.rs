//! Reconciliation rules for folding diff updates into a snapshot.
//!
//! These are pure functions over [`OrderBookState`]; the manager decides
//! what to do with each [`UpdateClass`].

use crate::types::{DepthUpdate, Level, UpdateId};

use super::book::{BookSide, OrderBookState};

/// How an incoming update relates to the book's `last_update_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateClass {
    /// Entirely at or before the book's position; already reflected
    Obsolete,
    /// Range contains `last_update_id + 1`; joins the stream onto the book
    Bridging,
    /// Starts after `last_update_id + 1`; at least one event was missed
    Gap,
    /// Anything else
    InOrder,
}

/// Classify `update` against a book positioned at `last_update_id`
///
/// Rules are checked in order: obsolete, bridging, gap, in-order.
#[must_use]
pub fn classify(update: &DepthUpdate, last_update_id: UpdateId) -> UpdateClass {
    let next = last_update_id.saturating_add(1);

    if update.final_update_id <= last_update_id {
        UpdateClass::Obsolete
    } else if update.first_update_id <= next && next <= update.final_update_id {
        UpdateClass::Bridging
    } else if update.first_update_id > next {
        UpdateClass::Gap
    } else {
        UpdateClass::InOrder
    }
}

/// Apply level changes to one side of the book
///
/// A quantity that is zero, negative, non-finite or not a number removes the
/// level; anything else inserts or overwrites it with the exact string.
pub fn apply_levels(side: &mut BookSide, changes: &[Level]) {
    for (price, quantity) in changes {
        if is_live_quantity(quantity) {
            side.insert(price.clone(), quantity.clone());
        } else {
            side.remove(price);
        }
    }
}

/// Apply both sides of `update` and advance `last_update_id`
pub fn apply_update(state: &mut OrderBookState, update: &DepthUpdate) {
    apply_levels(&mut state.bids, &update.bids);
    apply_levels(&mut state.asks, &update.asks);
    state.last_update_id = update.final_update_id;
}

fn is_live_quantity(quantity: &str) -> bool {
    quantity
        .trim()
        .parse::<f64>()
        .map(|q| q.is_finite() && q > 0.0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lv(price: &str, qty: &str) -> Level {
        (price.to_string(), qty.to_string())
    }

    fn update(first: u64, last: u64) -> DepthUpdate {
        DepthUpdate::new("BTCUSDT", first, last, vec![lv("100", "1")], vec![])
    }

    #[test]
    fn test_classify_obsolete() {
        assert_eq!(classify(&update(90, 99), 100), UpdateClass::Obsolete);
        assert_eq!(classify(&update(95, 100), 100), UpdateClass::Obsolete);
    }

    #[test]
    fn test_classify_bridging() {
        assert_eq!(classify(&update(95, 101), 100), UpdateClass::Bridging);
        assert_eq!(classify(&update(101, 101), 100), UpdateClass::Bridging);
        assert_eq!(classify(&update(101, 105), 100), UpdateClass::Bridging);
    }

    #[test]
    fn test_classify_gap() {
        assert_eq!(classify(&update(102, 105), 100), UpdateClass::Gap);
        assert_eq!(classify(&update(105, 110), 100), UpdateClass::Gap);
    }

    #[test]
    fn test_classify_saturates_at_max() {
        assert_eq!(
            classify(&update(u64::MAX, u64::MAX), u64::MAX),
            UpdateClass::Obsolete
        );
    }

    #[test]
    fn test_apply_levels_insert_overwrite_remove() {
        let mut side = BookSide::default();

        apply_levels(&mut side, &[lv("100", "1.5"), lv("101", "2")]);
        assert_eq!(side.get("100").map(String::as_str), Some("1.5"));

        apply_levels(&mut side, &[lv("100", "3.25")]);
        assert_eq!(side.get("100").map(String::as_str), Some("3.25"));

        apply_levels(&mut side, &[lv("100", "0.00000000")]);
        assert!(!side.contains_key("100"));
        assert!(side.contains_key("101"));
    }

    #[test]
    fn test_apply_levels_rejects_bad_quantities() {
        let mut side = BookSide::default();
        apply_levels(&mut side, &[lv("1", "5"), lv("2", "5"), lv("3", "5"), lv("4", "5")]);

        apply_levels(
            &mut side,
            &[lv("1", "-1"), lv("2", "NaN"), lv("3", "inf"), lv("4", "abc")],
        );

        assert!(side.is_empty());
    }

    #[test]
    fn test_apply_levels_removing_missing_level_is_noop() {
        let mut side = BookSide::default();
        apply_levels(&mut side, &[lv("100", "0")]);
        assert!(side.is_empty());
    }

    #[test]
    fn test_apply_update_advances_sequence() {
        let mut state = OrderBookState::new("BTCUSDT");
        state.last_update_id = 100;

        let update = DepthUpdate::new(
            "BTCUSDT",
            101,
            104,
            vec![lv("100", "2")],
            vec![lv("101", "3")],
        );
        apply_update(&mut state, &update);

        assert_eq!(state.last_update_id, 104);
        assert_eq!(state.bids.get("100").map(String::as_str), Some("2"));
        assert_eq!(state.asks.get("101").map(String::as_str), Some("3"));
    }
}
