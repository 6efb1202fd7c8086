//! Cart facade
//!
//! Thin entry point for presentation code. It forwards to the
//! [`CartSyncEngine`] and adds read helpers over the current snapshot; it
//! holds no state of its own.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::{
    carts::{CartItemUuid, CartRepository, CartSnapshot, Totals},
    context::CartContext,
    coupons::CouponValidator,
    products::ProductUuid,
    stock::{StockOracle, StockVerification},
    sync::{CartError, CartEvent, CartSyncEngine},
};

/// Cart operations for one session.
#[derive(Debug, Clone)]
pub struct CartFacade {
    engine: Arc<CartSyncEngine>,
}

impl CartFacade {
    /// Build a facade, and its engine, over the given collaborators.
    pub fn new(
        repository: Arc<dyn CartRepository>,
        stock: Arc<dyn StockOracle>,
        coupons: Arc<dyn CouponValidator>,
    ) -> Self {
        Self::from_engine(Arc::new(CartSyncEngine::new(repository, stock, coupons)))
    }

    /// Wrap an existing engine.
    pub fn from_engine(engine: Arc<CartSyncEngine>) -> Self {
        Self { engine }
    }

    /// Load the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::load_cart`].
    pub async fn load(&self, ctx: &CartContext) -> Result<Arc<CartSnapshot>, CartError> {
        self.engine.load_cart(ctx).await
    }

    /// Add `quantity` of a product.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::add_item`].
    pub async fn add_item(
        &self,
        ctx: &CartContext,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        self.engine.add_item(ctx, product, quantity).await
    }

    /// Add a single unit of a product.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::add_item`].
    pub async fn add_one(
        &self,
        ctx: &CartContext,
        product: ProductUuid,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        self.engine.add_item(ctx, product, 1).await
    }

    /// Set a line's quantity; zero removes it.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::update_quantity`].
    pub async fn update_quantity(
        &self,
        ctx: &CartContext,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        self.engine.update_quantity(ctx, item, quantity).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::remove_item`].
    pub async fn remove_item(
        &self,
        ctx: &CartContext,
        item: CartItemUuid,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        self.engine.remove_item(ctx, item).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::clear_cart`].
    pub async fn clear(&self, ctx: &CartContext) -> Result<Arc<CartSnapshot>, CartError> {
        self.engine.clear_cart(ctx).await
    }

    /// Apply a coupon code.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::apply_coupon`].
    pub async fn apply_coupon(&self, code: &str) -> Result<Arc<CartSnapshot>, CartError> {
        self.engine.apply_coupon(code).await
    }

    /// Remove the applied coupon.
    pub fn remove_coupon(&self) -> Arc<CartSnapshot> {
        self.engine.remove_coupon()
    }

    /// Verify stock for every line before checkout.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::verify_stock`].
    pub async fn verify_for_checkout(
        &self,
        ctx: &CartContext,
    ) -> Result<StockVerification, CartError> {
        self.engine.verify_stock(ctx).await
    }

    /// Drop local cart state.
    pub fn logout(&self) {
        self.engine.logout();
    }

    /// Current cart.
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        self.engine.store().snapshot()
    }

    /// Receiver notified on every cart change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartSnapshot>> {
        self.engine.store().subscribe()
    }

    /// Receiver for cart events.
    pub fn events(&self) -> broadcast::Receiver<CartEvent> {
        self.engine.events()
    }

    /// Current totals.
    pub fn totals(&self) -> Totals {
        self.snapshot().totals
    }

    /// Units across all lines, for a cart badge.
    pub fn item_count(&self) -> u64 {
        self.snapshot().item_count()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.snapshot().items.len()
    }

    /// Quantity of `product` in the cart, zero when absent.
    pub fn quantity_of(&self, product: ProductUuid) -> u32 {
        self.snapshot()
            .item(product)
            .map_or(0, |item| item.quantity)
    }

    /// Whether `product` has a line in the cart.
    pub fn contains(&self, product: ProductUuid) -> bool {
        self.snapshot().item(product).is_some()
    }
}
