/*!
 * # Livestock Client
 *
 * Client-side presentation layer of a livestock health web application.
 *
 * ## Features
 *
 * - Connectivity monitoring with a self-hiding status indicator
 * - Client-side page translation with temporary and permanent language choices
 * - Breed and disease prediction uploads with result rendering
 * - Disease alert API access, alert filtering, toasts and auto-refresh
 *
 * The browser is modelled abstractly so every behaviour runs without one:
 * documents implement `dom::DocumentTree`, browser state lives in
 * `browser::BrowserSession`, and the server is reached through
 * `transport::Transport`.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `connection`: Connection monitor and status indicator
 * - `translation`: Page translation:
 *   - `translation::core`: Translation endpoint client
 *   - `translation::cache`: Caching of translations
 *   - `translation::preference`: Current language resolution
 *   - `translation::page`: Page translator
 * - `predict`: Prediction form submission
 * - `alerts`: Disease alert client, filters, toasts and auto-refresh
 * - `render`: HTML rendering of collaborator responses
 * - `dom`: Document tree abstraction and in-memory implementation
 * - `browser`: Session storage, cookies, location and navigation intents
 * - `transport`: HTTP transport trait, reqwest implementation and mock
 * - `tasks`: Cancellable background tasks
 * - `language_utils`: Language names and code validation
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alerts;
pub mod app_config;
pub mod browser;
pub mod connection;
pub mod dom;
pub mod errors;
pub mod language_utils;
pub mod predict;
pub mod render;
pub mod tasks;
pub mod translation;
pub mod transport;

// Re-export main types for easier usage
pub use alerts::{AutoRefresh, DiseaseAlertsClient};
pub use app_config::Config;
pub use browser::{BrowserSession, NavigationIntent, SharedBrowser};
pub use connection::{ConnectionMonitor, ConnectionState, NetworkSignal};
pub use dom::{DocumentTree, MemoryDocument, SharedDocument};
pub use errors::{ApiError, AppError, ConfigError, TransportError};
pub use language_utils::get_language_name;
pub use predict::{PredictionClient, PredictionKind, PredictionOutcome};
pub use translation::PageTranslator;
pub use transport::{HttpTransport, MockTransport, Transport};
