use std::sync::Arc;

use ordergate_core::DomainResult;
use ordergate_fulfillment::{
    FulfillmentOutcome, FulfillmentService, OrderPage, OrderPatch, OrderRequest, OrderStore,
};
use ordergate_infra::MemoryStore;
use ordergate_sales::{Order, OrderId};

type MemoryFulfillment = FulfillmentService<Arc<MemoryStore>, Arc<MemoryStore>, Arc<MemoryStore>>;

/// Store + flow wiring shared by all handlers.
pub struct AppServices {
    store: Arc<MemoryStore>,
    fulfillment: MemoryFulfillment,
}

/// In-memory wiring (the only backend today). Persistent stores plug in here
/// once one exists.
pub fn build_services() -> AppServices {
    AppServices::over(Arc::new(MemoryStore::new()))
}

impl AppServices {
    pub fn over(store: Arc<MemoryStore>) -> Self {
        let fulfillment = FulfillmentService::new(store.clone(), store.clone(), store.clone());
        Self { store, fulfillment }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    // -------------------------
    // CRUD pass-throughs
    // -------------------------

    pub fn orders_list(&self, page: u32, per_page: u32) -> DomainResult<OrderPage> {
        self.store.list(page, per_page)
    }

    pub fn orders_get(&self, id: OrderId) -> DomainResult<Order> {
        self.store.get(id)
    }

    pub fn orders_update(&self, id: OrderId, patch: OrderPatch) -> DomainResult<Order> {
        self.store.update(id, patch)
    }

    pub fn orders_delete(&self, id: OrderId) -> DomainResult<()> {
        self.store.delete(id)
    }

    // -------------------------
    // Flow entrypoints
    // -------------------------

    pub fn create_order(&self, request: &OrderRequest) -> DomainResult<Order> {
        self.fulfillment.create_order(request)
    }

    pub fn fulfill(&self, request: &OrderRequest) -> DomainResult<FulfillmentOutcome> {
        self.fulfillment.fulfill(request)
    }
}
