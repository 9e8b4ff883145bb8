/*!
 * Client-side page translation.
 *
 * `PageTranslator` owns the page's language state. It translates elements
 * marked with `data-translate`, retranslates every visible text node when the
 * user picks a temporary language, and hands permanent choices to the server
 * as a form submission.
 *
 * Page-wide passes are tagged with a generation number. Starting a new pass
 * (or disposing the translator) makes older passes stale; a stale pass stops
 * at its next checkpoint without writing anything further.
 */

use futures::future::join_all;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use super::core::TranslationClient;
use super::preference::{
    EXPIRE_TEMP_LANGUAGE_COOKIE, LanguagePreference, OverrideScope, TEMP_LANGUAGE_KEY,
};
use crate::app_config::TranslatorConfig;
use crate::browser::{NavigationIntent, SharedBrowser};
use crate::dom::{
    DocumentTree, MemoryDocument, NodeId, NodeKind, Selector, SharedDocument, TextExtractor,
    VisibleTextExtractor,
};
use crate::language_utils::get_language_name;
use crate::tasks::ScheduledTask;
use crate::transport::Transport;

/// Text of the banner shown while a page-wide pass runs
pub const TRANSLATING_BANNER_TEXT: &str = "Translating page...";

/// Attribute set on the document root once navigation links are translated
pub const TRANSLATION_COMPLETE_ATTR: &str = "data-translation-complete";

const BANNER_CLASSES: &str = "position-fixed top-0 start-0 w-100 text-white text-center py-2";
const CHECK_ICON_CLASSES: &str = "bi bi-check-circle-fill ms-2 text-success";

/// Completion banner and the task that will remove it
struct BannerSlot {
    node: NodeId,
    removal: ScheduledTask,
}

/// Clears the navigation pass flag when the pass ends or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Translates page content and manages the current language
pub struct PageTranslator<T, D = MemoryDocument> {
    client: TranslationClient<T>,
    document: SharedDocument<D>,
    browser: SharedBrowser,
    config: TranslatorConfig,
    extractor: Box<dyn TextExtractor>,
    preference: Mutex<LanguagePreference>,
    /// Generation of the newest page-wide pass
    generation: AtomicU64,
    /// Navigation link pass currently running
    completion_in_flight: AtomicBool,
    banner: Mutex<Option<BannerSlot>>,
}

impl<T, D> PageTranslator<T, D>
where
    T: Transport,
    D: DocumentTree + Send + 'static,
{
    /// Create a translator for a page, resolving its current language
    pub fn new(transport: T, document: SharedDocument<D>, browser: SharedBrowser, config: TranslatorConfig) -> Self {
        let preference = {
            let doc = document.lock();
            let browser = browser.lock();
            LanguagePreference::resolve(&browser, &*doc, &config.default_language)
        };
        info!("Translator initialized with language: {}", preference.current);

        Self {
            client: TranslationClient::new(transport, &config),
            document,
            browser,
            config,
            extractor: Box::new(VisibleTextExtractor::default()),
            preference: Mutex::new(preference),
            generation: AtomicU64::new(0),
            completion_in_flight: AtomicBool::new(false),
            banner: Mutex::new(None),
        }
    }

    /// Replace the text node extraction strategy
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Current language code
    pub fn current_language(&self) -> String {
        self.preference.lock().current.clone()
    }

    /// Current language and override scope
    pub fn preference(&self) -> LanguagePreference {
        self.preference.lock().clone()
    }

    /// Translation endpoint client
    pub fn client(&self) -> &TranslationClient<T> {
        &self.client
    }

    /// Translate text into `target` (the current language when `None`)
    pub async fn translate(&self, text: &str, target: Option<&str>, source: &str) -> String {
        let target = match target {
            Some(target) => target.to_string(),
            None => self.current_language(),
        };
        self.client.translate(text, &target, source).await
    }

    /// Translate every element carrying `data-translate` into the current
    /// language, one request at a time
    pub async fn translate_page(&self) {
        let marked: Vec<(NodeId, String)> = {
            let doc = self.document.lock();
            doc.query_all(&Selector::parse("[data-translate]"))
                .into_iter()
                .filter_map(|node| doc.attr(node, "data-translate").map(|key| (node, key.to_string())))
                .collect()
        };
        if marked.is_empty() {
            return;
        }

        let source = self.config.source_language.clone();
        for (node, key) in marked {
            let translated = self.translate(&key, None, &source).await;
            let mut doc = self.document.lock();
            if doc.is_attached(node) {
                doc.set_text_content(node, &translated);
            }
        }
    }

    /// Switch language, either permanently through the server or temporarily
    /// for this browsing session
    pub async fn change_language(&self, new_language: &str, is_permanent: bool) {
        let old_language = self.current_language();
        if old_language == new_language {
            debug!("Language already set to {}", new_language);
            return;
        }

        if is_permanent {
            let mut browser = self.browser.lock();
            browser.remove_session_item(TEMP_LANGUAGE_KEY);
            browser.set_cookie(EXPIRE_TEMP_LANGUAGE_COOKIE);
            let next = browser.location().to_string();
            browser.navigate(NavigationIntent::SubmitForm {
                method: "POST".to_string(),
                action: self.config.language_set_endpoint.clone(),
                fields: vec![
                    ("language".to_string(), new_language.to_string()),
                    ("next".to_string(), next),
                ],
            });
            self.preference.lock().scope = OverrideScope::Permanent;
            info!("Submitting permanent language change to {}", new_language);
            return;
        }

        info!("Changing language temporarily to: {}", new_language);
        *self.preference.lock() = LanguagePreference {
            current: new_language.to_string(),
            scope: OverrideScope::Session,
        };

        {
            let mut browser = self.browser.lock();
            browser.set_session_item(TEMP_LANGUAGE_KEY, new_language);
            browser.set_cookie(&format!("{}={}; path=/", TEMP_LANGUAGE_KEY, new_language));
        }

        {
            // Codes inside dropdown items name the options, not the current language
            let mut doc = self.document.lock();
            let option = Selector::parse(".dropdown-item");
            for indicator in doc.query_all(&Selector::parse(".language-code")) {
                if doc.closest(indicator, &option).is_none() {
                    doc.set_text_content(indicator, new_language);
                }
            }
        }

        self.update_language_dropdown_state(new_language);
        self.translate_all_page_content(&old_language).await;
    }

    /// Mark the dropdown entry for `language` as active and update the
    /// dropdown toggles
    pub fn update_language_dropdown_state(&self, language: &str) {
        let mut doc = self.document.lock();
        let code_selector = Selector::parse(".language-code");
        let icon_selector = Selector::parse(".bi-check-circle-fill");

        for item in doc.query_all(&Selector::parse(".dropdown-item")) {
            let Some(code) = doc.query_within(item, &code_selector) else {
                continue;
            };
            let icon = doc.query_within(item, &icon_selector);

            if doc.text_content(code).trim() == language {
                doc.add_class(item, "active");
                if icon.is_none() {
                    let icon = doc.create_element("i");
                    doc.set_attr(icon, "class", CHECK_ICON_CLASSES);
                    doc.append_child(item, icon);
                }
            } else {
                doc.remove_class(item, "active");
                if let Some(icon) = icon {
                    doc.detach(icon);
                }
            }
        }

        let name = get_language_name(language);
        for toggle in doc.query_all(&Selector::parse(".dropdown-toggle")) {
            if let Some(code) = doc.query_within(toggle, &code_selector) {
                doc.set_text_content(code, language);
            }
            if let Some(&last) = doc.children(toggle).last() {
                if doc.kind(last) == NodeKind::Text {
                    doc.set_node_text(last, &format!(" {}", name));
                }
            }
        }
    }

    /// Retranslate all visible text, placeholders and image alt texts from
    /// `source` into the current language
    pub async fn translate_all_page_content(&self, source: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let target = self.current_language();

        let units: Vec<(NodeId, String)> = {
            let doc = self.document.lock();
            match doc.body() {
                Some(body) => self
                    .extractor
                    .extract(&*doc, body)
                    .into_iter()
                    .filter_map(|node| doc.node_text(node).map(|text| (node, text.trim().to_string())))
                    .collect(),
                None => Vec::new(),
            }
        };
        let loading = self.append_banner("bg-primary", TRANSLATING_BANNER_TEXT);

        let finished = self.translate_units(generation, &units, &target, source).await
            && self.translate_attribute(generation, "input[placeholder], textarea[placeholder]", "placeholder", &target, source).await
            && self.translate_attribute(generation, "img[alt]", "alt", &target, source).await;

        if let Some(node) = loading {
            self.document.lock().detach(node);
        }

        if finished {
            let message = format!("Page translated to {}", get_language_name(&target));
            self.show_completion_banner(&message);
            info!("{}", message);
        } else {
            debug!("Discarding stale translation pass {}", generation);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Batched text node translation; false once the pass went stale
    async fn translate_units(&self, generation: u64, units: &[(NodeId, String)], target: &str, source: &str) -> bool {
        for batch in units.chunks(self.config.batch_size.max(1)) {
            let translations = join_all(
                batch
                    .iter()
                    .map(|(_, text)| self.client.translate(text, target, source)),
            )
            .await;

            if !self.is_current(generation) {
                return false;
            }

            let mut doc = self.document.lock();
            for ((node, text), translated) in batch.iter().zip(translations) {
                if translated.is_empty() || !doc.is_attached(*node) {
                    continue;
                }
                if let Some(current) = doc.node_text(*node) {
                    let replaced = current.replacen(text.as_str(), &translated, 1);
                    doc.set_node_text(*node, &replaced);
                }
            }
        }
        true
    }

    /// Sequential attribute translation; false once the pass went stale
    async fn translate_attribute(&self, generation: u64, selector: &str, attr: &str, target: &str, source: &str) -> bool {
        let elements: Vec<(NodeId, String)> = {
            let doc = self.document.lock();
            doc.query_all(&Selector::parse(selector))
                .into_iter()
                .filter_map(|node| doc.attr(node, attr).map(|value| (node, value.to_string())))
                .filter(|(_, value)| !value.trim().is_empty())
                .collect()
        };

        for (node, value) in elements {
            let translated = self.client.translate(&value, target, source).await;
            if !self.is_current(generation) {
                return false;
            }
            self.document.lock().set_attr(node, attr, &translated);
        }
        true
    }

    fn append_banner(&self, background: &str, text: &str) -> Option<NodeId> {
        let mut doc = self.document.lock();
        let body = doc.body()?;
        let banner = doc.create_element("div");
        doc.set_attr(banner, "class", &format!("{} {}", BANNER_CLASSES, background));
        doc.set_attr(banner, "style", "z-index: 9999;");
        doc.set_text_content(banner, text);
        doc.append_child(body, banner);
        Some(banner)
    }

    fn show_completion_banner(&self, message: &str) {
        let Some(node) = self.append_banner("bg-success", message) else {
            return;
        };

        let document = self.document.clone();
        let removal = ScheduledTask::after(
            "translation-banner",
            Duration::from_millis(self.config.banner_ms),
            move || async move {
                document.lock().detach(node);
            },
        );

        let previous = self.banner.lock().replace(BannerSlot { node, removal });
        if let Some(mut previous) = previous {
            previous.removal.cancel();
            self.document.lock().detach(previous.node);
        }
    }

    /// Drop the temporary override and ask for a reload
    pub fn reset_temporary_language(&self) {
        {
            let mut browser = self.browser.lock();
            browser.remove_session_item(TEMP_LANGUAGE_KEY);
            browser.set_cookie(EXPIRE_TEMP_LANGUAGE_COOKIE);
            browser.navigate(NavigationIntent::Reload);
        }
        self.preference.lock().scope = OverrideScope::None;
        info!("Temporary language override cleared");
    }

    /// Translate sidebar and navbar links once per page load
    ///
    /// # Returns
    /// * `bool` - Whether a pass ran and marked the page complete
    pub async fn force_complete_translation(&self) -> bool {
        let already_complete = {
            let doc = self.document.lock();
            doc.attr(doc.root(), TRANSLATION_COMPLETE_ATTR).is_some()
        };
        if already_complete || self.completion_in_flight.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _in_flight = InFlightGuard(&self.completion_in_flight);

        let links: Vec<(NodeId, String)> = {
            let doc = self.document.lock();
            let dropdown = Selector::parse(".language-dropdown");
            doc.query_all(&Selector::parse(".sidebar-link, .navbar .nav-link"))
                .into_iter()
                .filter(|&link| doc.closest(link, &dropdown).is_none())
                .map(|link| (link, doc.text_content(link).trim().to_string()))
                .filter(|(_, text)| !text.is_empty())
                .collect()
        };

        if links.is_empty() {
            return false;
        }

        info!("Forcing complete page translation of {} links", links.len());
        let target = self.current_language();
        let translations = join_all(
            links
                .iter()
                .map(|(_, text)| self.client.translate(text, &target, &self.config.source_language)),
        )
        .await;

        {
            let mut doc = self.document.lock();
            for ((link, _), translated) in links.iter().zip(translations) {
                if translated.is_empty() {
                    continue;
                }
                let replacement = format!(" {}", translated.trim());
                for child in doc.children(*link) {
                    let is_text = doc.kind(child) == NodeKind::Text
                        && doc.node_text(child).is_some_and(|t| !t.trim().is_empty());
                    if is_text {
                        doc.set_node_text(child, &replacement);
                    }
                }
            }
            let root = doc.root();
            doc.set_attr(root, TRANSLATION_COMPLETE_ATTR, "true");
        }

        info!("Complete page translation finished");
        true
    }

    /// Page load bootstrap: restore the dropdown for a temporary override,
    /// translate marked elements and, after a short delay, the navigation
    pub async fn initialize_page(&self) {
        let temporary = self
            .browser
            .lock()
            .session_item(TEMP_LANGUAGE_KEY)
            .map(str::to_string);
        if let Some(language) = temporary {
            self.update_language_dropdown_state(&language);
        }

        let delay = Duration::from_millis(self.config.force_translation_delay_ms);
        tokio::join!(self.translate_page(), async {
            tokio::time::sleep(delay).await;
            self.force_complete_translation().await;
        });
    }

    /// Cancel owned timers and invalidate any running pass
    pub fn dispose(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(mut slot) = self.banner.lock().take() {
            slot.removal.cancel();
            debug!("Cancelled pending removal of the completion banner");
        }
    }
}
