use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Strategy used to find elements in a rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    Id,
    ClassName,
    Css,
    Xpath,
    Name,
    TagName,
    LinkText,
}

impl By {
    pub fn as_str(&self) -> &'static str {
        match self {
            By::Id => "id",
            By::ClassName => "class",
            By::Css => "css",
            By::Xpath => "xpath",
            By::Name => "name",
            By::TagName => "tag",
            By::LinkText => "link",
        }
    }
}

/// How to find one or more elements: a strategy plus a selector string.
///
/// Locators are plain values. Two locators with equal fields are
/// interchangeable, and page objects declare theirs as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub strategy: By,
    pub value: Cow<'static, str>,
}

impl Locator {
    pub const fn from_static(strategy: By, value: &'static str) -> Self {
        Self {
            strategy,
            value: Cow::Borrowed(value),
        }
    }

    pub fn new(strategy: By, value: impl Into<Cow<'static, str>>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<Cow<'static, str>>) -> Self {
        Self::new(By::Id, value)
    }

    pub fn class_name(value: impl Into<Cow<'static, str>>) -> Self {
        Self::new(By::ClassName, value)
    }

    pub fn css(value: impl Into<Cow<'static, str>>) -> Self {
        Self::new(By::Css, value)
    }

    pub fn xpath(value: impl Into<Cow<'static, str>>) -> Self {
        Self::new(By::Xpath, value)
    }

    /// JavaScript expression evaluating to an array of the matching elements
    /// in document order.
    pub fn to_js_query(&self) -> String {
        // serde_json gives a correctly escaped JS string literal
        let value = serde_json::Value::String(self.value.to_string()).to_string();
        match self.strategy {
            By::Id => format!(
                "(() => {{ const el = document.getElementById({value}); return el ? [el] : []; }})()"
            ),
            By::ClassName => format!("Array.from(document.getElementsByClassName({value}))"),
            By::Css => format!("Array.from(document.querySelectorAll({value}))"),
            By::Name => format!("Array.from(document.getElementsByName({value}))"),
            By::TagName => format!("Array.from(document.getElementsByTagName({value}))"),
            By::LinkText => format!(
                "Array.from(document.querySelectorAll('a')).filter(a => a.textContent.trim() === {value})"
            ),
            By::Xpath => format!(
                r#"(() => {{
                    const snap = document.evaluate({value}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                    const out = [];
                    for (let i = 0; i < snap.snapshotLength; i++) {{
                        const node = snap.snapshotItem(i);
                        if (node.nodeType === Node.ELEMENT_NODE) out.push(node);
                    }}
                    return out;
                }})()"#
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const LOGIN_BUTTON: Locator = Locator::from_static(By::Id, "login-button");

    #[test]
    fn test_structural_identity() {
        let dynamic = Locator::id(format!("login-{}", "button"));
        assert_eq!(LOGIN_BUTTON, dynamic);

        let mut set = HashSet::new();
        set.insert(LOGIN_BUTTON);
        assert!(set.contains(&dynamic));
        assert_ne!(LOGIN_BUTTON, Locator::css("login-button"));
    }

    #[test]
    fn test_display() {
        assert_eq!(LOGIN_BUTTON.to_string(), "id=login-button");
        assert_eq!(
            Locator::css("h3[data-test='error']").to_string(),
            "css=h3[data-test='error']"
        );
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(Locator::class_name("title")).unwrap();
        assert_eq!(json["strategy"], "class_name");
        assert_eq!(json["value"], "title");

        let back: Locator = serde_json::from_value(json).unwrap();
        assert_eq!(back, Locator::class_name("title"));
    }

    #[test]
    fn test_js_query_escapes_value() {
        let query = Locator::css("h3[data-test=\"error\"]").to_js_query();
        assert!(query.contains(r#"querySelectorAll("h3[data-test=\"error\"]")"#));

        let query = Locator::id("add-to-cart-test.allthethings()-t-shirt-(red)").to_js_query();
        assert!(query.contains("getElementById(\"add-to-cart-test.allthethings()-t-shirt-(red)\")"));
    }

    #[test]
    fn test_js_query_per_strategy() {
        assert!(Locator::class_name("cart_item").to_js_query().contains("getElementsByClassName"));
        assert!(Locator::xpath("//div/h3").to_js_query().contains("ORDERED_NODE_SNAPSHOT_TYPE"));
        assert!(Locator::new(By::Name, "user").to_js_query().contains("getElementsByName"));
        assert!(Locator::new(By::TagName, "select").to_js_query().contains("getElementsByTagName"));
        assert!(Locator::new(By::LinkText, "Logout").to_js_query().contains("textContent.trim()"));
    }
}
