/*!
 * The connection status element.
 *
 * A fixed-position box in the bottom right corner. It is invisible unless it
 * carries the `active` class; the state class (online, offline, slow) picks its
 * colours.
 */

use crate::app_config::MonitorConfig;
use crate::dom::{DocumentTree, NodeId, Selector};

/// Class making the status element visible
pub const ACTIVE_CLASS: &str = "active";

/// Initial message of a freshly created status element
pub const CHECKING_MESSAGE: &str = "Checking connection...";

const STATUS_CSS: &str = "
.connection-status-container { position: fixed; bottom: 20px; right: 20px; z-index: 9999; transition: opacity 0.3s ease-in-out; opacity: 0; }
.connection-status-container.active { opacity: 1; }
.connection-status-content { padding: 8px 16px; border-radius: 4px; display: flex; align-items: center; box-shadow: 0 2px 5px rgba(0,0,0,0.2); font-size: 0.9rem; max-width: 300px; }
.connection-status-container i { margin-right: 8px; }
.connection-online { background-color: #d4edda; color: #155724; }
.connection-offline { background-color: #f8d7da; color: #721c24; }
.connection-slow { background-color: #fff3cd; color: #856404; }
";

/// Find the status element, creating it (and its stylesheet) when missing
pub fn ensure_status_element<D: DocumentTree + ?Sized>(doc: &mut D, config: &MonitorConfig) -> Option<NodeId> {
    let selector = Selector::parse(&config.status_element);
    if let Some(existing) = doc.query(&selector) {
        return Some(existing);
    }

    let body = doc.body()?;

    let container = doc.create_element("div");
    doc.set_attr(container, "id", config.status_element.trim_start_matches('#'));
    doc.set_attr(container, "class", "connection-status-container");

    let content = doc.create_element("div");
    doc.set_attr(content, "class", "connection-status-content");
    let icon = doc.create_element("i");
    doc.set_attr(icon, "class", "fas fa-wifi");
    let message = doc.create_element("span");
    doc.set_attr(message, "class", "connection-message");
    doc.set_text_content(message, CHECKING_MESSAGE);

    doc.append_child(content, icon);
    doc.append_child(content, message);
    doc.append_child(container, content);

    if let Some(head) = doc.head() {
        let style = doc.create_element("style");
        doc.set_text_content(style, STATUS_CSS);
        doc.append_child(head, style);
    }
    doc.append_child(body, container);

    Some(container)
}

/// Apply a state class and message to the status element and show it.
/// Returns false when the element is missing.
pub fn show_status<D: DocumentTree + ?Sized>(doc: &mut D, config: &MonitorConfig, state_class: &str, message: &str) -> bool {
    let Some(element) = doc.query(&Selector::parse(&config.status_element)) else {
        return false;
    };

    for class in [&config.online_class, &config.offline_class, &config.slow_class] {
        doc.remove_class(element, class);
    }
    doc.add_class(element, state_class);

    if let Some(message_el) = doc.query_within(element, &Selector::parse(".connection-message")) {
        doc.set_text_content(message_el, message);
    }

    doc.add_class(element, ACTIVE_CLASS);
    true
}

/// Hide the status element
pub fn hide_status<D: DocumentTree + ?Sized>(doc: &mut D, config: &MonitorConfig) {
    if let Some(element) = doc.query(&Selector::parse(&config.status_element)) {
        doc.remove_class(element, ACTIVE_CLASS);
    }
}
