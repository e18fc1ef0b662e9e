//! Background and outbound services for the node tracker.

pub mod inventory;
pub mod mqtt_subscriber;
