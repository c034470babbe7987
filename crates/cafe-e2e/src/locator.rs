// Element references - lazily resolved descriptors for page elements
//
// An ElementRef names an element and says how to find it. It holds no
// reference to a page, so catalogs can hand them out freely; resolution to a
// live playwright_rs::Locator happens in PageSession at the moment an action
// runs.

use serde::Serialize;
use std::fmt;

/// How an element is found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Selector {
    /// CSS selector (e.g., `.product-item .product-item-name a`)
    Css(String),
    /// Innermost element whose whitespace-normalized text equals the value
    Text(String),
    /// Element carrying `data-testid="value"`
    TestId(String),
}

impl Selector {
    /// Selector string in Playwright's selector syntax.
    pub fn to_playwright(&self) -> String {
        match self {
            Selector::Css(css) => css.clone(),
            Selector::Text(text) => format!("text={}", quote(text)),
            Selector::TestId(id) => format!("[data-testid={}]", quote(id)),
        }
    }
}

/// Page-side statement block turning a serialized `target` ElementRef into
/// `found`, the matching elements in DOM order. Mirrors Playwright's
/// resolution: exact text compares normalized `textContent` and keeps the
/// innermost match.
pub(crate) const RESOLVE_TARGETS: &str = r#"
  const { selector, index } = target;
  const normalize = (s) => s.replace(/\s+/g, ' ').trim();
  let found;
  if (selector.kind === 'css') {
    found = Array.from(document.querySelectorAll(selector.value));
  } else if (selector.kind === 'testId') {
    found = Array.from(document.querySelectorAll(`[data-testid="${CSS.escape(selector.value)}"]`));
  } else {
    const wanted = normalize(selector.value);
    const matches = Array.from(document.querySelectorAll('body *')).filter(
      (el) => el.tagName !== 'SCRIPT' && el.tagName !== 'STYLE' && normalize(el.textContent) === wanted);
    found = matches.filter((el) => !matches.some((other) => other !== el && el.contains(other)));
  }
  if (index !== null && index !== undefined) {
    const el = found.at(index);
    found = el ? [el] : [];
  }
"#;

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A named, possibly indexed reference to zero or more page elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRef {
    name: String,
    selector: Selector,
    /// nth match; negative values count from the end
    index: Option<i32>,
}

impl ElementRef {
    /// Creates a reference matching every element the selector finds.
    pub fn new(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
            index: None,
        }
    }

    pub fn css(name: impl Into<String>, css: impl Into<String>) -> Self {
        Self::new(name, Selector::Css(css.into()))
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, Selector::Text(text.into()))
    }

    pub fn test_id(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(name, Selector::TestId(id.into()))
    }

    /// Catalog name used in logs and error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn index(&self) -> Option<i32> {
        self.index
    }

    /// Reference to the first match.
    pub fn first(&self) -> ElementRef {
        self.nth(0)
    }

    /// Reference to the last match.
    pub fn last(&self) -> ElementRef {
        self.nth(-1)
    }

    /// Reference to the nth match (0-indexed, negative from the end).
    pub fn nth(&self, index: i32) -> ElementRef {
        let name = match index {
            0 => format!("{} (first)", self.name),
            -1 => format!("{} (last)", self.name),
            i => format!("{} #{}", self.name, i),
        };
        ElementRef {
            name,
            selector: self.selector.clone(),
            index: Some(index),
        }
    }

    /// Full selector string including the nth suffix, as Playwright reports it.
    pub fn to_playwright(&self) -> String {
        match self.index {
            Some(i) => format!("{} >> nth={}", self.selector.to_playwright(), i),
            None => self.selector.to_playwright(),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
