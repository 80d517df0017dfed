//! Route definitions for the Depot inventory API

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public, `/auth/me` protected)
        .nest("/auth", auth_routes(state))
        // Protected routes
        .nest("/products", product_routes(state))
        .nest("/warehouses", warehouse_routes(state))
        .nest("/stock", stock_routes(state))
        .nest("/receipts", receipt_routes(state))
        .nest("/deliveries", delivery_routes(state))
        .nest("/transfers", transfer_routes(state))
        .nest("/ledger", ledger_routes(state))
        .nest("/dashboard", dashboard_routes(state))
}

/// Authentication routes
fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .merge(protected)
}

/// Product catalogue routes (protected)
fn product_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/active", get(handlers::list_active_products))
        .route("/search", get(handlers::search_products))
        .route("/sku/:sku", get(handlers::get_product_by_sku))
        .route(
            "/category/:category",
            get(handlers::list_products_by_category),
        )
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:id/permanent", delete(handlers::delete_product_permanently))
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
}

/// Warehouse routes (protected)
fn warehouse_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route("/active", get(handlers::list_active_warehouses))
        .route(
            "/:id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
}

/// Stock level routes (protected)
fn stock_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock).post(handlers::upsert_stock))
        .route("/low", get(handlers::list_low_stock))
        .route("/adjust", put(handlers::adjust_stock))
        .route(
            "/warehouse/:warehouse_id",
            get(handlers::list_stock_by_warehouse),
        )
        .route("/product/:product_id", get(handlers::list_stock_by_product))
        .route(
            "/product/:product_id/total",
            get(handlers::get_product_total),
        )
        .route(
            "/product/:product_id/warehouse/:warehouse_id",
            get(handlers::get_stock),
        )
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
}

/// Goods receipt routes (protected)
fn receipt_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_receipts).post(handlers::create_receipt),
        )
        .route("/status/:status", get(handlers::list_receipts_by_status))
        .route(
            "/warehouse/:warehouse_id",
            get(handlers::list_receipts_by_warehouse),
        )
        .route(
            "/:id",
            get(handlers::get_receipt).delete(handlers::delete_receipt),
        )
        .route("/:id/validate", put(handlers::validate_receipt))
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
}

/// Delivery order routes (protected)
fn delivery_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_deliveries).post(handlers::create_delivery),
        )
        .route("/status/:status", get(handlers::list_deliveries_by_status))
        .route(
            "/warehouse/:warehouse_id",
            get(handlers::list_deliveries_by_warehouse),
        )
        .route(
            "/:id",
            get(handlers::get_delivery).delete(handlers::delete_delivery),
        )
        .route("/:id/validate", put(handlers::validate_delivery))
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
}

/// Internal transfer routes (protected)
fn transfer_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route("/status/:status", get(handlers::list_transfers_by_status))
        .route(
            "/from-warehouse/:warehouse_id",
            get(handlers::list_transfers_from_warehouse),
        )
        .route(
            "/to-warehouse/:warehouse_id",
            get(handlers::list_transfers_to_warehouse),
        )
        .route(
            "/product/:product_id",
            get(handlers::list_transfers_by_product),
        )
        .route(
            "/:id",
            get(handlers::get_transfer).delete(handlers::delete_transfer),
        )
        .route("/:id/complete", put(handlers::complete_transfer))
        .route("/:id/cancel", put(handlers::cancel_transfer))
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
}

/// Stock ledger routes (protected, read only)
fn ledger_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_ledger))
        .route("/date-range", get(handlers::list_ledger_in_range))
        .route("/product/:product_id", get(handlers::list_ledger_by_product))
        .route(
            "/product/:product_id/warehouse/:warehouse_id",
            get(handlers::list_ledger_for_pair),
        )
        .route(
            "/product/:product_id/warehouse/:warehouse_id/verify",
            get(handlers::verify_ledger_for_pair),
        )
        .route(
            "/warehouse/:warehouse_id",
            get(handlers::list_ledger_by_warehouse),
        )
        .route(
            "/change-type/:change_type",
            get(handlers::list_ledger_by_change_type),
        )
        .route("/user/:user_id", get(handlers::list_ledger_by_user))
        .route(
            "/reference/:reference_id",
            get(handlers::list_ledger_by_reference),
        )
        .route("/:id", get(handlers::get_ledger_entry))
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/stock-value", get(handlers::get_stock_value))
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
}
