mod get_devices;
mod subscribe_device;
mod unsubscribe_device;

use actix_web::web;
use get_devices::get_devices_controller;
use subscribe_device::subscribe_device_controller;
use unsubscribe_device::unsubscribe_device_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/devices", web::post().to(subscribe_device_controller));
    cfg.route("/devices", web::delete().to(unsubscribe_device_controller));
    cfg.route("/devices", web::get().to(get_devices_controller));
}
