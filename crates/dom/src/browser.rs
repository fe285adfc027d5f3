use std::ffi::OsString;
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::{Browser, Tab};
use jobfill_core::config::BrowserConfig;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{BoundingBox, ComputedStyle, DomError, ElementId, EventKind, FormDocument, SelectOption};

/// Page-side helpers prepended to every script. Elements are remembered in a
/// window-level table so handles survive between calls without touching markup.
const PRELUDE: &str = r#"
    const refs = (window.__jobfillRefs = window.__jobfillRefs || []);
    const track = (el) => {
        let i = refs.indexOf(el);
        if (i < 0) { refs.push(el); i = refs.length - 1; }
        return i;
    };
    const get = (i) => {
        const el = refs[i];
        if (!el || !el.isConnected) { throw new Error('stale element ' + i); }
        return el;
    };
"#;

/// A launched Chrome instance
pub struct ChromeSession {
    browser: Browser,
    config: BrowserConfig,
}

impl ChromeSession {
    pub fn launch(config: &BrowserConfig) -> Result<Self, DomError> {
        let extra_args: Vec<OsString> = vec![
            OsString::from("--no-sandbox"),
            OsString::from("--disable-dev-shm-usage"),
            OsString::from("--disable-gpu"),
        ];

        let mut builder = headless_chrome::LaunchOptionsBuilder::default();
        builder
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .args(extra_args.iter().map(|a| a.as_ref()).collect());

        if let Some(path) = &config.chrome_path {
            builder.path(Some(std::path::PathBuf::from(path)));
        }

        let launch_options = builder.build().map_err(|e| DomError::Backend(e.to_string()))?;
        let browser = Browser::new(launch_options).map_err(|e| DomError::Backend(e.to_string()))?;

        Ok(Self {
            browser,
            config: config.clone(),
        })
    }

    /// Open `url` in a new tab and wait until a form control shows up
    pub async fn open(&self, url: &str) -> Result<ChromeDocument, DomError> {
        let tab = self.browser.new_tab().map_err(|e| DomError::Backend(e.to_string()))?;

        info!("navigating to {}", url);
        tab.navigate_to(url).map_err(|e| DomError::Backend(e.to_string()))?;
        tab.wait_until_navigated().map_err(|e| DomError::Backend(e.to_string()))?;

        let document = ChromeDocument::new(tab);
        let max_wait = Duration::from_secs(self.config.wait_for_content_seconds);
        let started = Instant::now();

        // application forms are frequently rendered client side after load
        loop {
            match document.query_selector(None, "input, select, textarea") {
                Ok(Some(_)) => {
                    info!("form controls present after {:?}", started.elapsed());
                    break;
                }
                Ok(None) => {}
                Err(e) => debug!("content probe failed: {}", e),
            }

            if started.elapsed() > max_wait {
                warn!("no form controls after {}s, continuing anyway", max_wait.as_secs());
                break;
            }

            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        Ok(document)
    }
}

/// A live browser tab seen through [`FormDocument`]
pub struct ChromeDocument {
    tab: Arc<Tab>,
}

impl ChromeDocument {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    /// Run `body` after the prelude. The body must `return JSON.stringify(...)`.
    fn eval<T: DeserializeOwned>(&self, body: &str) -> Result<T, DomError> {
        let script = format!("(() => {{ {PRELUDE} {body} }})()");
        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| DomError::Backend(e.to_string()))?;

        let json = result
            .value
            .and_then(|v| v.as_str().map(String::from))
            .ok_or_else(|| DomError::Backend("script returned no JSON".to_string()))?;

        serde_json::from_str(&json).map_err(|e| DomError::Backend(e.to_string()))
    }

    fn eval_on<T: DeserializeOwned>(&self, element: ElementId, body: &str) -> Result<T, DomError> {
        self.eval(&format!("const el = get({}); {}", element.0, body))
            .map_err(|e| match e {
                DomError::Backend(msg) if msg.contains("stale element") => DomError::StaleElement(element),
                other => other,
            })
    }

    fn eval_query<T: DeserializeOwned>(
        &self,
        scope: Option<ElementId>,
        selector: &str,
        body: &str,
    ) -> Result<T, DomError> {
        let root = match scope {
            Some(id) => format!("get({})", id.0),
            None => "document".to_string(),
        };
        self.eval(&format!(
            "const root = {root}; const sel = {}; {body}",
            js_string(selector)
        ))
        .map_err(|e| match e {
            DomError::Backend(msg) if msg.contains("not a valid selector") => {
                DomError::InvalidSelector(selector.to_string())
            }
            other => other,
        })
    }
}

impl FormDocument for ChromeDocument {
    fn query_selector(&self, scope: Option<ElementId>, selector: &str) -> Result<Option<ElementId>, DomError> {
        let found: Option<usize> = self.eval_query(
            scope,
            selector,
            "const el = root.querySelector(sel); return JSON.stringify(el ? track(el) : null);",
        )?;
        Ok(found.map(ElementId))
    }

    fn query_selector_all(&self, scope: Option<ElementId>, selector: &str) -> Result<Vec<ElementId>, DomError> {
        let found: Vec<usize> = self.eval_query(
            scope,
            selector,
            "return JSON.stringify(Array.from(root.querySelectorAll(sel)).map(track));",
        )?;
        Ok(found.into_iter().map(ElementId).collect())
    }

    fn tag_name(&self, element: ElementId) -> Result<String, DomError> {
        self.eval_on(element, "return JSON.stringify(el.tagName.toLowerCase());")
    }

    fn attribute(&self, element: ElementId, name: &str) -> Result<Option<String>, DomError> {
        self.eval_on(
            element,
            &format!("return JSON.stringify(el.getAttribute({}));", js_string(name)),
        )
    }

    fn text_content(&self, element: ElementId) -> Result<String, DomError> {
        self.eval_on(element, "return JSON.stringify(el.textContent || '');")
    }

    fn closest(&self, element: ElementId, selector: &str) -> Result<Option<ElementId>, DomError> {
        let found: Option<usize> = self.eval_on(
            element,
            &format!(
                "const c = el.closest({}); return JSON.stringify(c ? track(c) : null);",
                js_string(selector)
            ),
        )?;
        Ok(found.map(ElementId))
    }

    fn current_value(&self, element: ElementId) -> Result<String, DomError> {
        self.eval_on(
            element,
            "return JSON.stringify('value' in el && el.value != null ? String(el.value) : '');",
        )
    }

    fn is_checked(&self, element: ElementId) -> Result<bool, DomError> {
        self.eval_on(element, "return JSON.stringify(!!el.checked);")
    }

    fn options(&self, element: ElementId) -> Result<Vec<SelectOption>, DomError> {
        self.eval_on(
            element,
            r#"return JSON.stringify(Array.from(el.options || []).map(o => ({
                value: o.value,
                text: (o.text || '').trim(),
                selected: o.selected,
            })));"#,
        )
    }

    fn is_disabled(&self, element: ElementId) -> Result<bool, DomError> {
        self.eval_on(element, "return JSON.stringify(!!el.disabled);")
    }

    fn is_read_only(&self, element: ElementId) -> Result<bool, DomError> {
        self.eval_on(element, "return JSON.stringify(!!el.readOnly);")
    }

    fn computed_style(&self, element: ElementId) -> Result<ComputedStyle, DomError> {
        self.eval_on(
            element,
            "const s = getComputedStyle(el); return JSON.stringify({ display: s.display, visibility: s.visibility });",
        )
    }

    fn bounding_box(&self, element: ElementId) -> Result<BoundingBox, DomError> {
        self.eval_on(
            element,
            "const r = el.getBoundingClientRect(); return JSON.stringify({ x: r.x, y: r.y, width: r.width, height: r.height });",
        )
    }

    fn focus(&mut self, element: ElementId) -> Result<(), DomError> {
        self.eval_on(element, "el.focus(); return JSON.stringify(null);")
    }

    fn blur(&mut self, element: ElementId) -> Result<(), DomError> {
        self.eval_on(element, "el.blur(); return JSON.stringify(null);")
    }

    fn click(&mut self, element: ElementId) -> Result<(), DomError> {
        self.eval_on(element, "el.click(); return JSON.stringify(null);")
    }

    fn assign_value(&mut self, element: ElementId, value: &str) -> Result<(), DomError> {
        // go through the prototype setter so framework value trackers see the write
        self.eval_on(
            element,
            &format!(
                r#"const v = {};
                const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value');
                if (desc && desc.set) {{ desc.set.call(el, v); }} else {{ el.value = v; }}
                return JSON.stringify(null);"#,
                js_string(value)
            ),
        )
    }

    fn select_option(&mut self, element: ElementId, index: usize) -> Result<(), DomError> {
        let in_range: bool = self.eval_on(
            element,
            &format!(
                "if (!el.options || {index} >= el.options.length) {{ return JSON.stringify(false); }} el.selectedIndex = {index}; return JSON.stringify(true);"
            ),
        )?;
        if in_range {
            Ok(())
        } else {
            Err(DomError::OptionOutOfRange { index })
        }
    }

    fn dispatch_event(&mut self, element: ElementId, kind: EventKind, bubbles: bool) -> Result<(), DomError> {
        self.eval_on(
            element,
            &format!(
                "el.dispatchEvent(new Event({}, {{ bubbles: {bubbles} }})); return JSON.stringify(null);",
                js_string(kind.as_str())
            ),
        )
    }
}

/// Quote `s` as a JavaScript string literal
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("input[name='a']"), r#""input[name='a']""#);
        assert_eq!(js_string(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(js_string("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn test_prelude_defines_helpers() {
        assert!(PRELUDE.contains("const track"));
        assert!(PRELUDE.contains("const get"));
        assert!(PRELUDE.contains("window.__jobfillRefs"));
    }
}
