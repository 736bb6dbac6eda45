mod deactivate_item;
mod get_active_items;

use actix_web::web;
use deactivate_item::deactivate_item_controller;
use get_active_items::get_active_items_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/items/active", web::get().to(get_active_items_controller));
    cfg.route(
        "/items/{kind}/{itemId}/deactivate",
        web::put().to(deactivate_item_controller),
    );
}
