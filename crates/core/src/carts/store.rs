//! Cart store.
//!
//! Holds the materialised cart for the current session. Every transition runs
//! under the channel's write lock and swaps in a complete snapshot with fresh
//! totals, so readers and subscribers never see a half-applied change.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tokio::sync::watch;

use crate::{
    carts::{
        models::{CartItem, CartItemUuid, CartRow, LineState},
        totals::Totals,
    },
    context::UserUuid,
    coupons::Coupon,
    products::ProductUuid,
    stock::StockIssue,
};

/// Point-in-time view of the cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    /// Owner of the cart, if one is signed in.
    pub user: Option<UserUuid>,

    /// Lines keyed by product.
    pub items: FxHashMap<ProductUuid, CartItem>,

    /// Applied coupon, at most one.
    pub coupon: Option<Coupon>,

    /// Totals for `items` and `coupon`.
    pub totals: Totals,

    /// Stock shortfalls found by the last verification.
    pub stock_issues: SmallVec<[StockIssue; 4]>,
}

impl CartSnapshot {
    /// Line for `product`, if present.
    pub fn item(&self, product: ProductUuid) -> Option<&CartItem> {
        self.items.get(&product)
    }

    /// Line with the given row id, if present.
    pub fn find_item(&self, item: CartItemUuid) -> Option<&CartItem> {
        self.items.values().find(|line| line.uuid == item)
    }

    /// Lines ordered by product name, for display.
    pub fn lines(&self) -> Vec<&CartItem> {
        let mut lines: Vec<&CartItem> = self.items.values().collect();

        lines.sort_by(|a, b| {
            a.product
                .name
                .cmp(&b.product.name)
                .then(a.product_uuid.cmp(&b.product_uuid))
        });

        lines
    }

    /// Sum of quantities over every line.
    pub fn item_count(&self) -> u64 {
        self.items
            .values()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// True when no line is waiting on a remote write.
    pub fn is_settled(&self) -> bool {
        self.items
            .values()
            .all(|item| item.state == LineState::Committed)
    }

    fn recalculate(&mut self) {
        self.totals = Totals::calculate(self.items.values(), self.coupon.as_ref());
    }

    /// Issues only describe lines that are still in the cart.
    fn drop_orphaned_issues(&mut self) {
        let items = &self.items;

        self.stock_issues
            .retain(|issue| items.contains_key(&issue.product_uuid));
    }
}

/// In-memory cart for the current session. Does not talk to the network.
#[derive(Debug)]
pub struct CartStore {
    state: watch::Sender<Arc<CartSnapshot>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// An empty store with no user.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(CartSnapshot::default()));

        Self { state }
    }

    /// Current cart and totals.
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        Arc::clone(&self.state.borrow())
    }

    /// Receiver notified after every transition.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartSnapshot>> {
        self.state.subscribe()
    }

    /// Replace every line, e.g. after a remote reload.
    pub fn replace_all(&self, items: Vec<CartItem>) {
        self.transition(|cart| {
            cart.items = items
                .into_iter()
                .map(|item| (item.product_uuid, item))
                .collect();
            cart.drop_orphaned_issues();
        });
    }

    /// Insert or overwrite the line for the item's product.
    pub fn upsert(&self, item: CartItem) {
        self.transition(|cart| {
            cart.items.insert(item.product_uuid, item);
        });
    }

    /// Drop the line for `product`, returning it if it was present.
    pub fn remove(&self, product: ProductUuid) -> Option<CartItem> {
        let mut removed = None;

        self.transition(|cart| {
            removed = cart.items.remove(&product);
            cart.drop_orphaned_issues();
        });

        removed
    }

    /// Put a line back to how it was before an optimistic change.
    pub fn restore_line(&self, product: ProductUuid, previous: Option<CartItem>) {
        self.transition(|cart| match previous {
            Some(item) => {
                cart.items.insert(product, item);
            }
            None => {
                cart.items.remove(&product);
                cart.drop_orphaned_issues();
            }
        });
    }

    /// Mark a pending line as acknowledged, adopting the persisted row id and quantity.
    pub fn commit_line(&self, row: CartRow) {
        self.transition(|cart| {
            if let Some(item) = cart.items.get_mut(&row.product_uuid) {
                item.uuid = row.uuid;
                item.quantity = row.quantity;
                item.state = LineState::Committed;
            }
        });
    }

    /// Apply or remove the coupon. Applying replaces any previous coupon.
    pub fn set_coupon(&self, coupon: Option<Coupon>) {
        self.transition(|cart| cart.coupon = coupon);
    }

    /// Attach the result of the latest stock verification.
    pub fn set_stock_issues(&self, issues: SmallVec<[StockIssue; 4]>) {
        self.transition(|cart| cart.stock_issues = issues);
    }

    /// Empty the cart and drop the coupon in one transition.
    pub fn clear(&self) {
        self.transition(|cart| {
            cart.items.clear();
            cart.coupon = None;
            cart.stock_issues.clear();
        });
    }

    /// Discard all state and bind the store to `user`.
    pub fn reset(&self, user: Option<UserUuid>) {
        self.transition(|cart| {
            *cart = CartSnapshot {
                user,
                ..CartSnapshot::default()
            };
        });
    }

    fn transition(&self, apply: impl FnOnce(&mut CartSnapshot)) {
        self.state.send_modify(|state| {
            let cart = Arc::make_mut(state);

            apply(cart);
            cart.recalculate();
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        coupons::DiscountRule,
        products::{ProductSnapshot, ProductUuid},
    };

    use super::*;

    fn item(name: &str, unit_price: u64, quantity: u32) -> CartItem {
        CartItem {
            uuid: CartItemUuid::new(),
            product_uuid: ProductUuid::new(),
            quantity,
            unit_price,
            product: ProductSnapshot {
                name: name.to_string(),
                image: None,
                category: None,
                stock: 10,
            },
            state: LineState::Committed,
        }
    }

    fn coupon() -> Coupon {
        Coupon {
            code: "FIVER".to_string(),
            rule: DiscountRule::AmountOff(500),
            expires_at: None,
            usage_limit: None,
            times_used: 0,
            active: true,
        }
    }

    #[test]
    fn upsert_recomputes_totals() {
        let store = CartStore::new();

        store.upsert(item("Mug", 1_000, 3));

        assert_eq!(store.snapshot().totals.subtotal, 3_000);
    }

    #[test]
    fn upsert_keys_lines_by_product() {
        let store = CartStore::new();
        let first = item("Mug", 1_000, 1);
        let replacement = CartItem {
            quantity: 4,
            ..first.clone()
        };

        store.upsert(first);
        store.upsert(replacement.clone());

        let snapshot = store.snapshot();

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.item(replacement.product_uuid), Some(&replacement));
    }

    #[test]
    fn remove_twice_is_a_no_op() {
        let store = CartStore::new();
        let line = item("Mug", 1_000, 1);
        let product = line.product_uuid;

        store.upsert(line);

        assert!(store.remove(product).is_some());

        let before = store.snapshot();

        assert!(store.remove(product).is_none());
        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn removing_a_line_drops_its_stock_issue() {
        let store = CartStore::new();
        let short = item("Mug", 1_000, 4);
        let fine = item("Plate", 2_000, 1);
        let issue = StockIssue::detect(short.product_uuid, "Mug", 4, 2);

        store.upsert(short.clone());
        store.upsert(fine);
        store.set_stock_issues(issue.into_iter().collect());

        assert_eq!(store.snapshot().stock_issues.len(), 1);

        store.remove(short.product_uuid);

        assert!(store.snapshot().stock_issues.is_empty());
    }

    #[test]
    fn clear_drops_items_and_coupon_together() {
        let store = CartStore::new();
        let mut updates = store.subscribe();

        store.upsert(item("Mug", 1_000, 1));
        store.upsert(item("Plate", 2_000, 1));
        store.set_coupon(Some(coupon()));
        updates.mark_unchanged();

        store.clear();

        assert!(updates.has_changed().unwrap_or(false), "subscribers notified");

        let snapshot = store.snapshot();

        assert!(snapshot.items.is_empty());
        assert!(snapshot.coupon.is_none());
        assert_eq!(snapshot.totals, Totals::default());
    }

    #[test]
    fn coupon_is_replaced_not_stacked() {
        let store = CartStore::new();
        let mut bigger = coupon();
        bigger.code = "TENNER".to_string();
        bigger.rule = DiscountRule::AmountOff(1_000);

        store.upsert(item("Lamp", 5_000, 1));
        store.set_coupon(Some(coupon()));
        store.set_coupon(Some(bigger));

        let snapshot = store.snapshot();

        assert_eq!(snapshot.totals.discount, 1_000);
        assert_eq!(snapshot.totals.total, 4_000);

        store.set_coupon(None);

        assert_eq!(store.snapshot().totals.discount, 0);
    }

    #[test]
    fn restore_line_reverts_optimistic_change() {
        let store = CartStore::new();
        let line = item("Mug", 1_000, 2);
        let product = line.product_uuid;

        store.upsert(line.clone());

        let before = store.snapshot();

        store.upsert(line.with_pending_quantity(5));
        store.restore_line(product, Some(line));

        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn commit_line_adopts_persisted_row() {
        let store = CartStore::new();
        let line = item("Mug", 1_000, 2).with_pending_quantity(3);
        let product = line.product_uuid;
        let row = CartRow {
            uuid: CartItemUuid::new(),
            product_uuid: product,
            quantity: 3,
        };

        store.upsert(line);

        assert!(!store.snapshot().is_settled());

        store.commit_line(row);

        let snapshot = store.snapshot();

        assert!(snapshot.is_settled());
        assert_eq!(snapshot.item(product).map(|item| item.uuid), Some(row.uuid));
    }

    #[test]
    fn snapshots_are_unaffected_by_later_transitions() {
        let store = CartStore::new();
        let earlier = store.snapshot();

        store.upsert(item("Mug", 1_000, 1));

        assert!(earlier.items.is_empty());
        assert_eq!(store.snapshot().items.len(), 1);
    }

    #[test]
    fn lines_are_sorted_by_name() {
        let store = CartStore::new();

        store.upsert(item("Plate", 2_000, 1));
        store.upsert(item("Bowl", 1_500, 1));

        let snapshot = store.snapshot();
        let names: Vec<&str> = snapshot
            .lines()
            .into_iter()
            .map(|item| item.product.name.as_str())
            .collect();

        assert_eq!(names, ["Bowl", "Plate"]);
    }
}
