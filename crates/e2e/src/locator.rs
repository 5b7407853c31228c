//! Element locators

use std::borrow::Cow;
use std::fmt;
use thirtyfour::By;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    Id,
    Css,
    XPath,
    Name,
    Tag,
    ClassName,
}

impl LocatorKind {
    fn as_str(&self) -> &'static str {
        match self {
            LocatorKind::Id => "id",
            LocatorKind::Css => "css selector",
            LocatorKind::XPath => "xpath",
            LocatorKind::Name => "name",
            LocatorKind::Tag => "tag name",
            LocatorKind::ClassName => "class name",
        }
    }
}

/// A way of finding an element; static locators are `const`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    kind: LocatorKind,
    value: Cow<'static, str>,
}

impl Locator {
    pub const fn id(value: &'static str) -> Self {
        Self::borrowed(LocatorKind::Id, value)
    }

    pub const fn css(value: &'static str) -> Self {
        Self::borrowed(LocatorKind::Css, value)
    }

    pub const fn xpath(value: &'static str) -> Self {
        Self::borrowed(LocatorKind::XPath, value)
    }

    pub const fn name(value: &'static str) -> Self {
        Self::borrowed(LocatorKind::Name, value)
    }

    pub const fn tag(value: &'static str) -> Self {
        Self::borrowed(LocatorKind::Tag, value)
    }

    pub const fn class_name(value: &'static str) -> Self {
        Self::borrowed(LocatorKind::ClassName, value)
    }

    const fn borrowed(kind: LocatorKind, value: &'static str) -> Self {
        Self {
            kind,
            value: Cow::Borrowed(value),
        }
    }

    /// A locator built at runtime, e.g. `rad_<sauce>`
    pub fn dynamic(kind: LocatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Cow::Owned(value.into()),
        }
    }

    pub fn kind(&self) -> LocatorKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn by(&self) -> By {
        let value = self.value.as_ref();
        match self.kind {
            LocatorKind::Id => By::Id(value),
            LocatorKind::Css => By::Css(value),
            LocatorKind::XPath => By::XPath(value),
            LocatorKind::Name => By::Name(value),
            LocatorKind::Tag => By::Tag(value),
            LocatorKind::ClassName => By::ClassName(value),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, \"{}\")", self.kind.as_str(), self.value)
    }
}

/// A locator with a label, used in fallback chains and logs
#[derive(Debug, Clone)]
pub struct NamedLocator {
    pub name: &'static str,
    pub locator: Locator,
}

impl NamedLocator {
    pub const fn new(name: &'static str, locator: Locator) -> Self {
        Self { name, locator }
    }
}
