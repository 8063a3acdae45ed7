//! XML element tree produced by the parser

/// Parsed XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// XML element. Attributes are validated by the parser but not kept.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Child elements in document order, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        })
    }

    /// An element with no child elements
    pub fn is_leaf(&self) -> bool {
        self.elements().next().is_none()
    }

    /// Concatenated text content, or `None` if the element holds no text
    pub fn text(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for child in &self.children {
            if let Content::Text(value) = child {
                text.get_or_insert_with(String::new).push_str(value);
            }
        }
        text
    }
}
