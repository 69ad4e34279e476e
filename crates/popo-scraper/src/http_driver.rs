//! Static-document browsing driver over HTTP.
//!
//! Every page is fetched with reqwest and queried with `scraper`. Following a
//! link fetches its target into a new browsing context. Documents are
//! server-rendered, so an element that is absent once the page has loaded
//! will never appear and waits resolve immediately.

use crate::config::ScrapeConfig;
use async_trait::async_trait;
use popo_core::ports::{
    BrowserDriver, BrowserSession, ContextHandle, ContextTarget, Locator, NodeHandle,
};
use popo_core::{Error, Result};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Opens [`HttpSession`]s sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpDriver {
    client: reqwest::Client,
}

impl HttpDriver {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.page_load_timeout())
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BrowserDriver for HttpDriver {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>> {
        Ok(Box::new(HttpSession::new(self.client.clone())))
    }
}

#[derive(Debug)]
struct Document {
    url: Url,
    html: String,
}

#[derive(Debug)]
struct Node {
    context: ContextHandle,
    text: String,
    href: Option<String>,
}

/// One browsing session: an ordered list of loaded documents.
#[derive(Debug)]
pub struct HttpSession {
    client: reqwest::Client,
    contexts: Vec<Document>,
    nodes: Vec<Node>,
    current: Option<ContextHandle>,
    closed: bool,
}

impl HttpSession {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            contexts: Vec::new(),
            nodes: Vec::new(),
            current: None,
            closed: false,
        }
    }

    /// The context made current by the last load or switch.
    pub fn current_context(&self) -> Option<ContextHandle> {
        self.current
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::SessionUnavailable("session is closed".to_string()));
        }
        Ok(())
    }

    fn document(&self, context: ContextHandle) -> Result<&Document> {
        self.contexts
            .get(context.index())
            .ok_or_else(|| Error::UnknownContext(context.to_string()))
    }

    fn node(&self, handle: &NodeHandle) -> Result<&Node> {
        self.nodes
            .get(handle.id)
            .filter(|node| node.context == handle.context)
            .ok_or_else(|| Error::UnknownContext(format!("no node {} in {}", handle.id, handle.context)))
    }

    async fn open_context(&mut self, url: Url) -> Result<ContextHandle> {
        debug!(url = %url, "Fetching document");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Navigation(format!("{url}: {e}")))?;

        // Redirects land on the final URL; relative links resolve against it.
        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        self.contexts.push(Document {
            url: final_url,
            html,
        });
        Ok(ContextHandle::new(self.contexts.len() - 1))
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn load_page(&mut self, url: &str) -> Result<ContextHandle> {
        self.ensure_open()?;
        let url = Url::parse(url).map_err(|e| Error::Navigation(format!("invalid URL '{url}': {e}")))?;
        let context = self.open_context(url).await?;
        self.current = Some(context);
        Ok(context)
    }

    async fn wait_until_actionable(
        &mut self,
        context: ContextHandle,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<NodeHandle> {
        self.ensure_open()?;
        let found = locate(&self.document(context)?.html, locator)?.ok_or_else(|| {
            Error::ElementNotFound {
                locator: locator.to_string(),
            }
        })?;

        self.nodes.push(Node {
            context,
            text: found.text,
            href: found.href,
        });
        Ok(NodeHandle {
            context,
            id: self.nodes.len() - 1,
        })
    }

    async fn activate(&mut self, node: &NodeHandle) -> Result<()> {
        self.ensure_open()?;
        let href = self.node(node)?.href.clone().ok_or(Error::NotALink)?;
        let base = &self.document(node.context)?.url;
        let target = base
            .join(&href)
            .map_err(|e| Error::Navigation(format!("cannot resolve '{href}' against {base}: {e}")))?;
        self.open_context(target).await?;
        Ok(())
    }

    fn switch_context(&mut self, target: ContextTarget) -> Result<ContextHandle> {
        self.ensure_open()?;
        let index = match target {
            ContextTarget::Index(index) if index < self.contexts.len() => index,
            ContextTarget::Index(index) => {
                return Err(Error::UnknownContext(format!("ctx#{index}")));
            }
            ContextTarget::MostRecent => self
                .contexts
                .len()
                .checked_sub(1)
                .ok_or_else(|| Error::UnknownContext("no open contexts".to_string()))?,
        };
        let handle = ContextHandle::new(index);
        self.current = Some(handle);
        Ok(handle)
    }

    async fn text_of(&mut self, node: &NodeHandle) -> Result<String> {
        self.ensure_open()?;
        Ok(self.node(node)?.text.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.contexts.clear();
        self.nodes.clear();
        self.current = None;
        self.closed = true;
        Ok(())
    }
}

/// An element found by a locator, detached from its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub text: String,
    pub href: Option<String>,
}

/// Find the first actionable element matching `locator` in `html`.
///
/// An element is actionable when it has visible text or is a link.
pub fn locate(html: &str, locator: &Locator) -> Result<Option<Located>> {
    let document = Html::parse_document(html);

    let found = match locator {
        Locator::Css { selector, contains } => {
            let selector = parse_selector(selector)?;
            let needle = contains.as_deref().map(normalize_text).map(|s| s.to_lowercase());
            document
                .select(&selector)
                .map(located)
                .filter(Located::is_actionable)
                .find(|el| match &needle {
                    Some(needle) => el.text.to_lowercase().contains(needle.as_str()),
                    None => true,
                })
        }
        Locator::AfterHeading {
            heading,
            heading_text,
            target,
        } => {
            let heading = parse_selector(heading)?;
            let target = parse_selector(target)?;
            let needle = normalize_text(heading_text).to_lowercase();
            after_heading(&document, &heading, &needle, &target)
        }
    };
    Ok(found)
}

fn after_heading(
    document: &Html,
    heading: &Selector,
    needle: &str,
    target: &Selector,
) -> Option<Located> {
    let anchor = document
        .select(heading)
        .find(|el| element_text(el).to_lowercase().contains(needle))?;

    // Elements following the heading in document order, excluding its own
    // descendants.
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .skip_while(|el| el.id() != anchor.id())
        .skip(1)
        .filter(|el| !el.ancestors().any(|a| a.id() == anchor.id()))
        .filter(|el| target.matches(el))
        .map(located)
        .find(Located::is_actionable)
}

impl Located {
    fn is_actionable(&self) -> bool {
        !self.text.is_empty() || self.href.is_some()
    }
}

fn located(el: ElementRef<'_>) -> Located {
    Located {
        text: element_text(&el),
        href: el.value().attr("href").map(str::to_string),
    }
}

fn element_text(el: &ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<Vec<_>>().join(" "))
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::Config(format!("invalid selector '{selector}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <article>
            <h2>Reporte del monitoreo</h2>
            <a href="/otro">Ver más</a>
            <a href="/articulos/reporte-popo">  Continuar
                leyendo </a>
          </article>
        </body></html>"#;

    const REPORT_PAGE: &str = r#"
        <html><body>
          <h4>Semáforo de alerta volcánica <b></b></h4>
          <div><p><b>Amarillo Fase 2</b></p></div>
          <h4>Dirección de la pluma</h4>
          <div><p>Hacia el <b>noreste</b></p></div>
        </body></html>"#;

    #[test]
    fn test_css_with_text_filter() {
        let locator = Locator::css_containing("article a", "continuar leyendo");
        let found = locate(SEARCH_PAGE, &locator).unwrap().unwrap();
        assert_eq!(found.text, "Continuar leyendo");
        assert_eq!(found.href.as_deref(), Some("/articulos/reporte-popo"));
    }

    #[test]
    fn test_css_without_match() {
        let locator = Locator::css("div.article-body");
        assert_eq!(locate(SEARCH_PAGE, &locator).unwrap(), None);
    }

    #[test]
    fn test_after_heading_skips_heading_descendants() {
        let locator = Locator::after_heading("h4", "Semáforo de alerta volcánica", "b");
        let found = locate(REPORT_PAGE, &locator).unwrap().unwrap();
        assert_eq!(found.text, "Amarillo Fase 2");

        let locator = Locator::after_heading("h4", "Dirección de la pluma", "p b");
        let found = locate(REPORT_PAGE, &locator).unwrap().unwrap();
        assert_eq!(found.text, "noreste");
    }

    #[test]
    fn test_after_missing_heading() {
        let locator = Locator::after_heading("h4", "Sismos", "b");
        assert_eq!(locate(REPORT_PAGE, &locator).unwrap(), None);
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let err = locate(SEARCH_PAGE, &Locator::css("a[")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_switch_without_contexts() {
        let mut session = HttpSession::new(reqwest::Client::new());
        assert!(matches!(
            session.switch_context(ContextTarget::MostRecent),
            Err(Error::UnknownContext(_))
        ));
        assert!(session.current_context().is_none());
    }

    #[tokio::test]
    async fn test_closed_session_refuses_work() {
        let mut session = HttpSession::new(reqwest::Client::new());
        session.close().await.unwrap();
        let err = session.load_page("http://localhost/").await.unwrap_err();
        assert!(matches!(err, Error::SessionUnavailable(_)));
    }
}
