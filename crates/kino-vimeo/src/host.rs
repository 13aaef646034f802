//! Host framework contract
//!
//! The player framework owns the DOM and the event bus; the tech only asks
//! it to emit notifications and to decorate the container element.

use crate::types::TechEvent;

/// Container class added to every element hosting a Vimeo tech
pub const CONTAINER_CLASS: &str = "vjs-vimeo";

/// Container class added on platforms that refuse unmuted autoplay
pub const MOBILE_CONTAINER_CLASS: &str = "vjs-vimeo-mobile";

/// Callbacks into the host framework
pub trait TechHost {
    /// Emit a media notification (`play`, `timeupdate`, ...)
    fn trigger(&self, event: TechEvent);

    /// Tell the host the tech can accept commands
    fn trigger_ready(&self);

    fn set_poster(&self, _url: &str) {}

    fn add_container_class(&self, _class: &str) {}

    fn remove_container_class(&self, _class: &str) {}

    /// Detach the tech element from the page
    fn remove_element(&self) {}
}
