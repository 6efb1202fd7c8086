//! Cart sync engine.
//!
//! Every mutation runs in three phases: a precondition check against the
//! collaborators, an optimistic change to the [`CartStore`], then the remote
//! commit. A rejected commit restores the line it touched; an accepted one is
//! followed by a reload of the authoritative cart. Concurrent calls are not
//! serialised, the reload after each commit is what converges them.

use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use smallvec::SmallVec;
use tokio::sync::broadcast;
use tracing::{Span, debug, field, info, warn};

use crate::{
    carts::{CartItem, CartItemUuid, CartRepository, CartSnapshot, CartStore, RepositoryError},
    context::{CartContext, Locale, UserUuid},
    coupons::{Coupon, CouponValidator},
    products::ProductUuid,
    stock::{StockCheck, StockError, StockOracle, StockVerification},
    sync::{
        errors::CartError,
        events::{CartEvent, CartOperation},
    },
};

/// Events buffered per listener before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

/// Sole writer of the [`CartStore`].
pub struct CartSyncEngine {
    repository: Arc<dyn CartRepository>,
    stock: Arc<dyn StockOracle>,
    coupons: Arc<dyn CouponValidator>,
    store: CartStore,
    events: broadcast::Sender<CartEvent>,
}

impl Debug for CartSyncEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSyncEngine")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl CartSyncEngine {
    /// Build an engine over the given collaborators with an empty store.
    pub fn new(
        repository: Arc<dyn CartRepository>,
        stock: Arc<dyn StockOracle>,
        coupons: Arc<dyn CouponValidator>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            repository,
            stock,
            coupons,
            store: CartStore::new(),
            events,
        }
    }

    /// Read access to the store.
    pub fn store(&self) -> &CartStore {
        &self.store
    }

    /// Subscribe to cart events.
    pub fn events(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Replace the local cart with the user's persisted cart, then verify stock.
    ///
    /// # Errors
    ///
    /// - [`CartError::LoginRequired`] without a user.
    /// - [`CartError::CartLoadFailed`] when the read fails; the store keeps its last state.
    #[tracing::instrument(
        name = "cart.engine.load_cart",
        skip(self, ctx),
        fields(user_uuid = field::Empty, lines = field::Empty),
        err
    )]
    pub async fn load_cart(&self, ctx: &CartContext) -> Result<Arc<CartSnapshot>, CartError> {
        let user = require_user(ctx)?;

        Span::current().record("user_uuid", field::display(user));

        self.bind_user(user);

        if let Err(source) = self.reload(user, &ctx.locale).await {
            warn!(error = %source, "cart load failed, keeping last known state");

            self.emit(CartEvent::LoadFailed { user });

            return Err(CartError::CartLoadFailed(source));
        }

        let snapshot = self.store.snapshot();

        Span::current().record("lines", snapshot.items.len());

        Ok(snapshot)
    }

    /// Add `quantity` of `product`, merging into an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::LoginRequired`] without a user.
    /// - [`CartError::InvalidQuantity`] for a zero quantity.
    /// - [`CartError::StockUnavailable`] when the increment, or the merged line, exceeds stock.
    /// - [`CartError::ProductNotFound`] / [`CartError::StockCheckFailed`] from the stock check.
    /// - [`CartError::RemoteCommitFailed`] when the write fails; the line is restored.
    #[tracing::instrument(
        name = "cart.engine.add_item",
        skip(self, ctx),
        fields(user_uuid = ?ctx.user),
        err
    )]
    pub async fn add_item(
        &self,
        ctx: &CartContext,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        let user = require_user(ctx)?;

        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        self.bind_user(user);

        let check = self.check_stock(product, quantity).await?;
        let previous = self.store.snapshot().item(product).cloned();

        let (line, requested) = match &previous {
            Some(existing) => {
                let requested = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::InvalidQuantity)?;

                let merged = self.check_stock(product, requested).await?;

                (refreshed(existing, &merged, requested), requested)
            }
            None => (CartItem::pending(&check.product, quantity), quantity),
        };

        self.store.upsert(line);

        match self.repository.upsert_item(user, product, requested).await {
            Ok(row) => {
                self.store.commit_line(row);

                info!(quantity = row.quantity, "committed cart line");

                self.emit(CartEvent::ItemAdded {
                    product,
                    quantity: row.quantity,
                });
            }
            Err(source) => {
                return Err(self.roll_back(CartOperation::Add, product, previous, requested, source));
            }
        }

        self.reconcile(user, &ctx.locale).await;

        Ok(self.store.snapshot())
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::LoginRequired`] without a user.
    /// - [`CartError::ItemNotFound`] when no line has this row id.
    /// - [`CartError::StockUnavailable`] when `quantity` exceeds stock.
    /// - [`CartError::ProductNotFound`] / [`CartError::StockCheckFailed`] from the stock check.
    /// - [`CartError::RemoteCommitFailed`] when the write fails; the line is restored.
    #[tracing::instrument(
        name = "cart.engine.update_quantity",
        skip(self, ctx),
        fields(user_uuid = ?ctx.user),
        err
    )]
    pub async fn update_quantity(
        &self,
        ctx: &CartContext,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        let user = require_user(ctx)?;

        if quantity == 0 {
            return self.remove_item(ctx, item).await;
        }

        self.bind_user(user);

        let previous = self
            .store
            .snapshot()
            .find_item(item)
            .cloned()
            .ok_or(CartError::ItemNotFound(item))?;

        let product = previous.product_uuid;
        let check = self.check_stock(product, quantity).await?;

        self.store.upsert(refreshed(&previous, &check, quantity));

        match self.repository.update_quantity(user, item, quantity).await {
            Ok(row) => {
                self.store.commit_line(row);

                info!(quantity = row.quantity, "committed cart line");

                self.emit(CartEvent::QuantityUpdated {
                    product,
                    quantity: row.quantity,
                });
            }
            Err(source) => {
                return Err(self.roll_back(
                    CartOperation::UpdateQuantity,
                    product,
                    Some(previous),
                    quantity,
                    source,
                ));
            }
        }

        self.reconcile(user, &ctx.locale).await;

        Ok(self.store.snapshot())
    }

    /// Remove a line. Removing a line that is not there does nothing.
    ///
    /// # Errors
    ///
    /// - [`CartError::LoginRequired`] without a user.
    /// - [`CartError::RemoteCommitFailed`] when the delete fails; the line is put back and
    ///   the cart reloaded.
    #[tracing::instrument(
        name = "cart.engine.remove_item",
        skip(self, ctx),
        fields(user_uuid = ?ctx.user),
        err
    )]
    pub async fn remove_item(
        &self,
        ctx: &CartContext,
        item: CartItemUuid,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        let user = require_user(ctx)?;

        self.bind_user(user);

        let Some(previous) = self.store.snapshot().find_item(item).cloned() else {
            debug!("line already absent");

            return Ok(self.store.snapshot());
        };

        let product = previous.product_uuid;
        let quantity = previous.quantity;

        self.store.remove(product);

        match self.repository.delete_item(user, item).await {
            Ok(rows_affected) => {
                if rows_affected == 0 {
                    debug!("row was already deleted remotely");
                }

                info!("removed cart line");

                self.emit(CartEvent::ItemRemoved { product });
            }
            Err(source) => {
                let error = self.roll_back(
                    CartOperation::Remove,
                    product,
                    Some(previous),
                    quantity,
                    source,
                );

                self.reconcile(user, &ctx.locale).await;

                return Err(error);
            }
        }

        self.reconcile(user, &ctx.locale).await;

        Ok(self.store.snapshot())
    }

    /// Delete every persisted line, then empty the cart and drop the coupon.
    ///
    /// # Errors
    ///
    /// - [`CartError::LoginRequired`] without a user.
    /// - [`CartError::RemoteCommitFailed`] when the bulk delete fails; the cart is untouched.
    #[tracing::instrument(
        name = "cart.engine.clear_cart",
        skip(self, ctx),
        fields(user_uuid = ?ctx.user, rows_affected = field::Empty),
        err
    )]
    pub async fn clear_cart(&self, ctx: &CartContext) -> Result<Arc<CartSnapshot>, CartError> {
        let user = require_user(ctx)?;

        self.bind_user(user);

        let rows_affected = self.repository.delete_all(user).await.map_err(|source| {
            warn!(error = %source, "bulk delete failed, cart left unchanged");

            CartError::RemoteCommitFailed(source)
        })?;

        Span::current().record("rows_affected", rows_affected);

        self.store.clear();

        info!("cleared cart");

        self.emit(CartEvent::Cleared { user });

        Ok(self.store.snapshot())
    }

    /// Validate `code` and apply it, replacing any previous coupon.
    ///
    /// # Errors
    ///
    /// - [`CartError::CouponInvalid`], [`CartError::CouponExpired`] or
    ///   [`CartError::CouponLimitReached`] when the coupon is rejected.
    /// - [`CartError::CouponLookupFailed`] when the coupon store is unreachable.
    #[tracing::instrument(name = "cart.engine.apply_coupon", skip(self), err)]
    pub async fn apply_coupon(&self, code: &str) -> Result<Arc<CartSnapshot>, CartError> {
        let Some(code) = Coupon::normalise_code(code) else {
            return Err(CartError::CouponInvalid(code.trim().to_string()));
        };

        let coupon = self
            .coupons
            .validate(code.clone())
            .await
            .map_err(|error| CartError::from_coupon(code.clone(), error))?;

        self.store.set_coupon(Some(coupon));

        info!(coupon_code = %code, "applied coupon");

        self.emit(CartEvent::CouponApplied { code });

        Ok(self.store.snapshot())
    }

    /// Drop the applied coupon. Local only; always succeeds.
    pub fn remove_coupon(&self) -> Arc<CartSnapshot> {
        self.store.set_coupon(None);

        self.emit(CartEvent::CouponRemoved);

        self.store.snapshot()
    }

    /// Check the persisted cart against current stock and attach any issues.
    ///
    /// Run before committing a checkout.
    ///
    /// # Errors
    ///
    /// - [`CartError::LoginRequired`] without a user.
    /// - [`CartError::StockCheckFailed`] when stock cannot be read.
    #[tracing::instrument(
        name = "cart.engine.verify_stock",
        skip(self, ctx),
        fields(user_uuid = ?ctx.user, issues = field::Empty),
        err
    )]
    pub async fn verify_stock(&self, ctx: &CartContext) -> Result<StockVerification, CartError> {
        let user = require_user(ctx)?;

        let verification = self
            .stock
            .verify_all(user, ctx.locale.clone())
            .await
            .map_err(CartError::StockCheckFailed)?;

        Span::current().record("issues", verification.issues.len());

        self.attach_issues(&verification);

        Ok(verification)
    }

    /// Discard local state. Persisted rows are kept for the next login.
    pub fn logout(&self) {
        self.store.reset(None);

        self.emit(CartEvent::LoggedOut);
    }

    /// Start from an empty cart when the store belongs to someone else.
    fn bind_user(&self, user: UserUuid) {
        if self.store.snapshot().user != Some(user) {
            debug!(user_uuid = %user, "binding cart store to user");

            self.store.reset(Some(user));
        }
    }

    async fn check_stock(
        &self,
        product: ProductUuid,
        requested: u32,
    ) -> Result<StockCheck, CartError> {
        let check = self
            .stock
            .check_stock(product, requested)
            .await
            .map_err(|error| match error {
                StockError::ProductNotFound(product) => CartError::ProductNotFound(product),
                unavailable @ StockError::Unavailable(_) => {
                    CartError::StockCheckFailed(unavailable)
                }
            })?;

        if !check.available {
            debug!(
                requested,
                current_stock = check.current_stock,
                "stock check rejected quantity"
            );

            return Err(CartError::StockUnavailable {
                product,
                requested,
                available: check.current_stock,
            });
        }

        Ok(check)
    }

    /// Undo an optimistic change to one line and translate the remote failure.
    fn roll_back(
        &self,
        operation: CartOperation,
        product: ProductUuid,
        previous: Option<CartItem>,
        requested: u32,
        source: RepositoryError,
    ) -> CartError {
        self.store.restore_line(product, previous);

        warn!(error = %source, %operation, product_uuid = %product, "rolled back cart line");

        self.emit(CartEvent::RolledBack { operation, product });

        match source {
            RepositoryError::InsufficientStock { available } => CartError::StockUnavailable {
                product,
                requested,
                available,
            },
            source => CartError::RemoteCommitFailed(source),
        }
    }

    /// Pull authoritative state after a successful commit. Failure is logged, not returned.
    async fn reconcile(&self, user: UserUuid, locale: &Locale) {
        if let Err(source) = self.reload(user, locale).await {
            warn!(error = %source, "reconciling reload failed");

            self.emit(CartEvent::ReconcileFailed { user });
        }
    }

    async fn reload(&self, user: UserUuid, locale: &Locale) -> Result<(), RepositoryError> {
        let items = self.repository.load_items(user, locale.clone()).await?;

        if self.store.snapshot().user != Some(user) {
            debug!(user_uuid = %user, "store changed owner during reload, discarding rows");

            return Ok(());
        }

        let lines = items.len();

        self.store.replace_all(items);

        self.emit(CartEvent::Loaded { user, lines });

        match self.stock.verify_all(user, locale.clone()).await {
            Ok(verification) => self.attach_issues(&verification),
            Err(source) => {
                warn!(error = %source, "stock verification after load failed");

                self.store.set_stock_issues(SmallVec::new());
            }
        }

        Ok(())
    }

    fn attach_issues(&self, verification: &StockVerification) {
        self.store.set_stock_issues(verification.issues.clone());

        if !verification.is_ok() {
            self.emit(CartEvent::StockIssuesDetected {
                issues: verification.issues.clone(),
            });
        }
    }

    fn emit(&self, event: CartEvent) {
        if self.events.send(event).is_err() {
            debug!("no cart event listeners");
        }
    }
}

fn require_user(ctx: &CartContext) -> Result<UserUuid, CartError> {
    ctx.user.ok_or(CartError::LoginRequired)
}

/// Pending copy of `line` at `quantity`, with price and product fields from a fresh stock read.
fn refreshed(line: &CartItem, check: &StockCheck, quantity: u32) -> CartItem {
    CartItem {
        unit_price: check.product.price,
        product: check.product.snapshot.clone(),
        ..line.with_pending_quantity(quantity)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        BoxError,
        carts::{CartRow, LineState, MockCartRepository},
        coupons::{CouponError, MockCouponValidator},
        products::{ProductDetails, ProductSnapshot},
        stock::MockStockOracle,
        test::{signed_in, signed_out},
    };

    use super::*;

    fn engine(
        repository: MockCartRepository,
        stock: MockStockOracle,
        coupons: MockCouponValidator,
    ) -> CartSyncEngine {
        CartSyncEngine::new(Arc::new(repository), Arc::new(stock), Arc::new(coupons))
    }

    fn lamp(uuid: ProductUuid, stock: u32) -> ProductDetails {
        ProductDetails {
            uuid,
            price: 2_500,
            snapshot: ProductSnapshot {
                name: "Desk Lamp".to_string(),
                image: None,
                category: Some("Lighting".to_string()),
                stock,
            },
        }
    }

    fn line(product: ProductUuid, quantity: u32) -> CartItem {
        CartItem {
            uuid: CartItemUuid::new(),
            product_uuid: product,
            quantity,
            unit_price: 2_500,
            product: lamp(product, 5).snapshot,
            state: LineState::Committed,
        }
    }

    fn offline() -> BoxError {
        "connection reset by peer".into()
    }

    fn drain(events: &mut broadcast::Receiver<CartEvent>) -> Vec<CartEvent> {
        let mut seen = Vec::new();

        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }

        seen
    }

    #[tokio::test]
    async fn mutations_without_a_user_require_login() {
        let engine = engine(
            MockCartRepository::new(),
            MockStockOracle::new(),
            MockCouponValidator::new(),
        );
        let ctx = signed_out();
        let product = ProductUuid::new();
        let item = CartItemUuid::new();

        let results = [
            engine.load_cart(&ctx).await.map(|_| ()),
            engine.add_item(&ctx, product, 1).await.map(|_| ()),
            engine.update_quantity(&ctx, item, 2).await.map(|_| ()),
            engine.remove_item(&ctx, item).await.map(|_| ()),
            engine.clear_cart(&ctx).await.map(|_| ()),
            engine.verify_stock(&ctx).await.map(|_| ()),
        ];

        for result in results {
            assert!(
                matches!(result, Err(CartError::LoginRequired)),
                "expected LoginRequired, got {result:?}"
            );
        }

        assert!(engine.store().snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn unavailable_stock_never_reaches_the_repository() {
        let product = ProductUuid::new();
        let mut repository = MockCartRepository::new();
        let mut stock = MockStockOracle::new();

        stock
            .expect_check_stock()
            .once()
            .withf(move |uuid, requested| *uuid == product && *requested == 2)
            .returning(move |uuid, requested| Ok(StockCheck::evaluate(lamp(uuid, 1), requested)));

        repository.expect_upsert_item().never();
        repository.expect_load_items().never();

        let engine = engine(repository, stock, MockCouponValidator::new());
        let result = engine.add_item(&signed_in(), product, 2).await;

        assert!(
            matches!(
                result,
                Err(CartError::StockUnavailable {
                    requested: 2,
                    available: 1,
                    ..
                })
            ),
            "expected StockUnavailable, got {result:?}"
        );
        assert!(engine.store().snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn stock_lookup_failure_changes_nothing() {
        let mut repository = MockCartRepository::new();
        let mut stock = MockStockOracle::new();

        stock
            .expect_check_stock()
            .once()
            .returning(|_, _| Err(StockError::Unavailable(offline())));

        repository.expect_upsert_item().never();

        let engine = engine(repository, stock, MockCouponValidator::new());
        let result = engine.add_item(&signed_in(), ProductUuid::new(), 1).await;

        assert!(
            matches!(result, Err(CartError::StockCheckFailed(_))),
            "expected StockCheckFailed, got {result:?}"
        );
        assert!(result.is_err_and(|error| error.is_connectivity()));
        assert!(engine.store().snapshot().items.is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_reported() {
        let product = ProductUuid::new();
        let mut stock = MockStockOracle::new();

        stock
            .expect_check_stock()
            .once()
            .returning(|uuid, _| Err(StockError::ProductNotFound(uuid)));

        let engine = engine(MockCartRepository::new(), stock, MockCouponValidator::new());
        let result = engine.add_item(&signed_in(), product, 1).await;

        assert!(
            matches!(result, Err(CartError::ProductNotFound(uuid)) if uuid == product),
            "expected ProductNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn refused_conditional_write_rolls_back_as_stock_unavailable() {
        let product = ProductUuid::new();
        let mut repository = MockCartRepository::new();
        let mut stock = MockStockOracle::new();

        stock
            .expect_check_stock()
            .once()
            .returning(|uuid, requested| Ok(StockCheck::evaluate(lamp(uuid, 5), requested)));

        // Another shopper took the stock between the check and the write.
        repository
            .expect_upsert_item()
            .once()
            .returning(|_, _, _| Err(RepositoryError::InsufficientStock { available: 1 }));

        repository.expect_load_items().never();

        let engine = engine(repository, stock, MockCouponValidator::new());
        let mut events = engine.events();
        let result = engine.add_item(&signed_in(), product, 2).await;

        assert!(
            matches!(
                result,
                Err(CartError::StockUnavailable {
                    requested: 2,
                    available: 1,
                    ..
                })
            ),
            "expected StockUnavailable, got {result:?}"
        );
        assert!(engine.store().snapshot().items.is_empty());
        assert_eq!(
            drain(&mut events),
            [CartEvent::RolledBack {
                operation: CartOperation::Add,
                product,
            }]
        );
    }

    #[tokio::test]
    async fn failed_reconcile_keeps_the_committed_line() -> TestResult {
        let product = ProductUuid::new();
        let ctx = signed_in();
        let user = ctx.user.ok_or("signed in context has a user")?;
        let row = CartRow {
            uuid: CartItemUuid::new(),
            product_uuid: product,
            quantity: 1,
        };

        let mut repository = MockCartRepository::new();
        let mut stock = MockStockOracle::new();

        stock
            .expect_check_stock()
            .once()
            .returning(|uuid, requested| Ok(StockCheck::evaluate(lamp(uuid, 5), requested)));

        stock.expect_verify_all().never();

        repository
            .expect_upsert_item()
            .once()
            .withf(move |owner, uuid, quantity| *owner == user && *uuid == product && *quantity == 1)
            .return_once(move |_, _, _| Ok(row));

        repository
            .expect_load_items()
            .once()
            .returning(|_, _| Err(RepositoryError::storage(offline())));

        let engine = engine(repository, stock, MockCouponValidator::new());
        let mut events = engine.events();
        let snapshot = engine.add_item(&ctx, product, 1).await?;

        let line = snapshot.item(product).ok_or("line should be present")?;

        assert_eq!(line.uuid, row.uuid);
        assert_eq!(line.state, LineState::Committed);
        assert_eq!(snapshot.totals.subtotal, 2_500);
        assert_eq!(
            drain(&mut events),
            [
                CartEvent::ItemAdded {
                    product,
                    quantity: 1
                },
                CartEvent::ReconcileFailed { user },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn coupon_lookup_failure_keeps_current_coupon() {
        let mut coupons = MockCouponValidator::new();

        coupons
            .expect_validate()
            .once()
            .withf(|code| code == "SAVE10")
            .returning(|_| Err(CouponError::Lookup(offline())));

        let engine = engine(MockCartRepository::new(), MockStockOracle::new(), coupons);
        let result = engine.apply_coupon(" save10 ").await;

        assert!(
            matches!(result, Err(CartError::CouponLookupFailed(_))),
            "expected CouponLookupFailed, got {result:?}"
        );
        assert!(engine.store().snapshot().coupon.is_none());
    }

    #[tokio::test]
    async fn blank_coupon_code_is_invalid_without_a_lookup() {
        let mut coupons = MockCouponValidator::new();

        coupons.expect_validate().never();

        let engine = engine(MockCartRepository::new(), MockStockOracle::new(), coupons);
        let result = engine.apply_coupon("   ").await;

        assert!(
            matches!(result, Err(CartError::CouponInvalid(ref code)) if code.is_empty()),
            "expected CouponInvalid, got {result:?}"
        );
    }

    #[tokio::test]
    async fn clear_failure_leaves_store_untouched() -> TestResult {
        let product = ProductUuid::new();
        let mut repository = MockCartRepository::new();
        let mut stock = MockStockOracle::new();

        stock
            .expect_check_stock()
            .returning(|uuid, requested| Ok(StockCheck::evaluate(lamp(uuid, 5), requested)));

        stock
            .expect_verify_all()
            .returning(|_, _| Ok(StockVerification::default()));

        repository.expect_upsert_item().once().returning(|_, product, quantity| {
            Ok(CartRow {
                uuid: CartItemUuid::new(),
                product_uuid: product,
                quantity,
            })
        });

        repository
            .expect_load_items()
            .once()
            .returning(|_, _| Err(RepositoryError::storage(offline())));

        repository
            .expect_delete_all()
            .once()
            .returning(|_| Err(RepositoryError::storage(offline())));

        let engine = engine(repository, stock, MockCouponValidator::new());
        let ctx = signed_in();

        engine.add_item(&ctx, product, 2).await?;

        let before = engine.store().snapshot();
        let mut events = engine.events();
        let result = engine.clear_cart(&ctx).await;

        assert!(
            matches!(result, Err(CartError::RemoteCommitFailed(_))),
            "expected RemoteCommitFailed, got {result:?}"
        );
        assert_eq!(*engine.store().snapshot(), *before);
        assert!(drain(&mut events).is_empty(), "nothing to roll back");

        Ok(())
    }

    #[tokio::test]
    async fn failed_remove_reloads_after_rolling_back() -> TestResult {
        let product = ProductUuid::new();
        let ctx = signed_in();
        let user = ctx.user.ok_or("signed in context has a user")?;
        let existing = line(product, 2);
        let item = existing.uuid;

        let mut repository = MockCartRepository::new();
        let mut stock = MockStockOracle::new();

        // Initial load, then the reload after the rollback.
        repository
            .expect_load_items()
            .times(2)
            .returning(move |_, _| Ok(vec![existing.clone()]));

        repository
            .expect_delete_item()
            .once()
            .withf(move |owner, uuid| *owner == user && *uuid == item)
            .returning(|_, _| Err(RepositoryError::storage(offline())));

        stock
            .expect_verify_all()
            .times(2)
            .returning(|_, _| Ok(StockVerification::default()));

        let engine = engine(repository, stock, MockCouponValidator::new());
        let loaded = engine.load_cart(&ctx).await?;
        let mut events = engine.events();
        let result = engine.remove_item(&ctx, item).await;

        assert!(
            matches!(result, Err(CartError::RemoteCommitFailed(_))),
            "expected RemoteCommitFailed, got {result:?}"
        );
        assert_eq!(*engine.store().snapshot(), *loaded);
        assert_eq!(
            drain(&mut events),
            [
                CartEvent::RolledBack {
                    operation: CartOperation::Remove,
                    product,
                },
                CartEvent::Loaded { user, lines: 1 },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn refused_quantity_update_rolls_back_as_stock_unavailable() -> TestResult {
        let product = ProductUuid::new();
        let ctx = signed_in();
        let existing = line(product, 2);
        let item = existing.uuid;

        let mut repository = MockCartRepository::new();
        let mut stock = MockStockOracle::new();

        repository
            .expect_load_items()
            .once()
            .returning(move |_, _| Ok(vec![existing.clone()]));

        stock
            .expect_verify_all()
            .once()
            .returning(|_, _| Ok(StockVerification::default()));

        stock
            .expect_check_stock()
            .once()
            .withf(move |uuid, requested| *uuid == product && *requested == 4)
            .returning(|uuid, requested| Ok(StockCheck::evaluate(lamp(uuid, 5), requested)));

        // Stock dropped between the check and the conditional write.
        repository
            .expect_update_quantity()
            .once()
            .withf(move |_, uuid, quantity| *uuid == item && *quantity == 4)
            .returning(|_, _, _| Err(RepositoryError::InsufficientStock { available: 3 }));

        let engine = engine(repository, stock, MockCouponValidator::new());
        let before = engine.load_cart(&ctx).await?;
        let mut events = engine.events();
        let result = engine.update_quantity(&ctx, item, 4).await;

        assert!(
            matches!(
                result,
                Err(CartError::StockUnavailable {
                    requested: 4,
                    available: 3,
                    ..
                })
            ),
            "expected StockUnavailable, got {result:?}"
        );
        assert_eq!(*engine.store().snapshot(), *before);
        assert_eq!(
            drain(&mut events),
            [CartEvent::RolledBack {
                operation: CartOperation::UpdateQuantity,
                product,
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn stock_verification_uses_the_callers_locale() -> TestResult {
        let ctx = CartContext::authenticated(UserUuid::new(), Locale::new("AR"));
        let mut repository = MockCartRepository::new();
        let mut stock = MockStockOracle::new();

        repository
            .expect_load_items()
            .once()
            .withf(|_, locale| locale.as_str() == "ar")
            .returning(|_, _| Ok(Vec::new()));

        stock
            .expect_verify_all()
            .times(2)
            .withf(|_, locale| locale.as_str() == "ar")
            .returning(|_, _| Ok(StockVerification::default()));

        let engine = engine(repository, stock, MockCouponValidator::new());

        engine.load_cart(&ctx).await?;

        let verification = engine.verify_stock(&ctx).await?;

        assert!(verification.is_ok());

        Ok(())
    }
}
