use crate::cdp::CdpClient;
use crate::error::{E2eError, Result};
use crate::locator::Locator;
use crate::session::{ElementHandle, Session};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_LOAD_POLL: Duration = Duration::from_millis(100);

/// Page-side registry mapping handle ids to elements. Reset by every
/// navigation because it lives on `window`; detached entries are pruned on
/// each query.
const REGISTRY: &str =
    "(window.__e2eHandles || (window.__e2eHandles = { next: 0, map: new Map() }))";

/// Registers every match of `locator` and returns the new handle ids
fn query_script(locator: &Locator) -> String {
    format!(
        r#"(() => {{
            const reg = {REGISTRY};
            for (const [key, node] of reg.map) {{
                if (!node.isConnected) reg.map.delete(key);
            }}
            return {query}.map(el => {{
                const id = String(reg.next++);
                reg.map.set(id, el);
                return id;
            }});
        }})()"#,
        query = locator.to_js_query()
    )
}

/// A [`Session`] driving one Chrome tab over the DevTools Protocol
pub struct ChromeSession {
    cdp: CdpClient,
}

impl ChromeSession {
    /// Open a fresh tab on the Chrome instance at `host:port`
    pub async fn open(host: &str, port: u16) -> Result<Self> {
        info!("Opening Chrome session on {}:{}", host, port);
        let cdp = CdpClient::new(host, port);
        let tab = cdp.create_tab(Some("about:blank")).await?;
        if let Err(e) = cdp.connect_to_tab(&tab).await {
            // nobody else can release the tab once open fails
            cdp.disconnect().await;
            if let Err(close_err) = cdp.close_tab(&tab.id).await {
                warn!("Failed to close tab {} after setup error: {}", tab.id, close_err);
            }
            return Err(e);
        }
        info!("Connected to tab: {}", tab.id);
        Ok(Self { cdp })
    }

    async fn wait_for_page_load(&self) -> Result<()> {
        let loaded = timeout(PAGE_LOAD_TIMEOUT, async {
            loop {
                let state = self.cdp.evaluate_js("document.readyState").await?;
                if state.as_str() == Some("complete") {
                    return Ok::<(), E2eError>(());
                }
                sleep(PAGE_LOAD_POLL).await;
            }
        })
        .await;

        match loaded {
            Ok(result) => result,
            Err(_) => Err(E2eError::Timeout {
                timeout: PAGE_LOAD_TIMEOUT.as_millis() as u64,
            }),
        }
    }

    /// Evaluate `body` with `el` bound to the handle's element. The body's
    /// value comes back as `value`; a detached element reports `StaleElement`.
    async fn with_element(&self, handle: &ElementHandle, body: &str) -> Result<Value> {
        let id = Value::String(handle.id.clone()).to_string();
        let script = format!(
            r#"(() => {{
                const el = {REGISTRY}.map.get({id});
                if (!el || !el.isConnected) return {{ stale: true }};
                return {{ stale: false, value: (() => {{ {body} }})() }};
            }})()"#
        );

        let result = self.cdp.evaluate_js(&script).await?;
        if result.get("stale").and_then(|v| v.as_bool()).unwrap_or(true) {
            return Err(E2eError::stale_element(format!("handle {}", handle.id)));
        }
        Ok(result.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn element_bool(&self, handle: &ElementHandle, body: &str) -> Result<bool> {
        Ok(self
            .with_element(handle, body)
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    /// Set a form control's value through the native setter so that
    /// framework-controlled inputs see the change.
    async fn set_value(&self, handle: &ElementHandle, value: &str, event: &str) -> Result<()> {
        let value = Value::String(value.to_string()).to_string();
        let body = format!(
            r#"
            const proto = Object.getPrototypeOf(el);
            const desc = Object.getOwnPropertyDescriptor(proto, 'value');
            if (desc && desc.set) {{ desc.set.call(el, {value}); }} else {{ el.value = {value}; }}
            el.dispatchEvent(new Event('{event}', {{ bubbles: true }}));
            return true;
            "#
        );
        self.with_element(handle, &body).await?;
        Ok(())
    }

    async fn string_value(&self, expression: &str) -> Result<String> {
        self.cdp
            .evaluate_js(expression)
            .await?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| E2eError::cdp_protocol(format!("{} did not return a string", expression)))
    }
}

#[async_trait]
impl Session for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        info!("Navigating to: {}", url);
        self.cdp.navigate(url).await?;
        self.wait_for_page_load().await
    }

    async fn current_url(&self) -> Result<String> {
        self.string_value("window.location.href").await
    }

    async fn title(&self) -> Result<String> {
        self.string_value("document.title").await
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<ElementHandle>> {
        let ids = self.cdp.evaluate_js(&query_script(locator)).await?;
        let ids = ids
            .as_array()
            .ok_or_else(|| E2eError::cdp_protocol(format!("query {} did not return an array", locator)))?;

        Ok(ids
            .iter()
            .filter_map(|id| id.as_str())
            .map(ElementHandle::new)
            .collect())
    }

    async fn is_visible(&self, handle: &ElementHandle) -> Result<bool> {
        self.element_bool(
            handle,
            r#"
            const style = getComputedStyle(el);
            const boxed = !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
            return boxed && style.visibility !== 'hidden' && style.display !== 'none';
            "#,
        )
        .await
    }

    async fn is_enabled(&self, handle: &ElementHandle) -> Result<bool> {
        self.element_bool(
            handle,
            "return !el.disabled && getComputedStyle(el).pointerEvents !== 'none';",
        )
        .await
    }

    async fn text(&self, handle: &ElementHandle) -> Result<String> {
        let value = self
            .with_element(handle, "return (el.innerText || el.textContent || '').trim();")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, handle: &ElementHandle, name: &str) -> Result<Option<String>> {
        let name = Value::String(name.to_string()).to_string();
        let value = self
            .with_element(
                handle,
                &format!(
                    "const v = el.getAttribute({name}); return v === null ? (el[{name}] ?? null) : v;"
                ),
            )
            .await?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        debug!("Clicking handle {}", handle.id);
        self.with_element(handle, "el.scrollIntoView({ block: 'center' }); el.click(); return true;")
            .await?;
        Ok(())
    }

    async fn clear(&self, handle: &ElementHandle) -> Result<()> {
        self.set_value(handle, "", "input").await
    }

    async fn send_keys(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        self.with_element(handle, "el.focus(); return true;").await?;
        self.cdp.insert_text(text).await
    }

    async fn select_by_text(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        let wanted = Value::String(text.to_string()).to_string();
        let value = self
            .with_element(
                handle,
                &format!(
                    "const opt = Array.from(el.options || []).find(o => o.text.trim() === {wanted}); return opt ? opt.value : null;"
                ),
            )
            .await?;

        let value = value.as_str().ok_or_else(|| {
            E2eError::invalid_operation(format!("no option with visible text {:?}", text))
        })?;
        self.set_value(handle, value, "change").await
    }

    async fn select_by_value(&self, handle: &ElementHandle, value: &str) -> Result<()> {
        let wanted = Value::String(value.to_string()).to_string();
        let present = self
            .element_bool(
                handle,
                &format!("return Array.from(el.options || []).some(o => o.value === {wanted});"),
            )
            .await?;
        if !present {
            return Err(E2eError::invalid_operation(format!(
                "no option with value {:?}",
                value
            )));
        }
        self.set_value(handle, value, "change").await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let data = self.cdp.screenshot("png").await?;
        BASE64
            .decode(data)
            .map_err(|e| E2eError::cdp_protocol(format!("Invalid screenshot data: {}", e)))
    }

    async fn close(&self) -> Result<()> {
        self.cdp.disconnect().await;
        if let Some(tab_id) = self.cdp.current_tab_id() {
            self.cdp.close_tab(&tab_id).await?;
            info!("Closed tab: {}", tab_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_script_prunes_detached_handles() {
        let script = query_script(&Locator::id("user-name"));
        let prune = script.find("reg.map.delete(key)").unwrap();
        let register = script.find("reg.map.set(id, el)").unwrap();

        assert!(script.contains("!node.isConnected"));
        assert!(prune < register);
        assert!(script.contains(&Locator::id("user-name").to_js_query()));
    }
}
