//! Value tree to XML document

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::decode::DEFAULT_ITEM_TAG;
use crate::error::Result;
use crate::value::Value;
use crate::xml::writer::XmlWriter;

/// Root element used when none is configured
pub const DEFAULT_ROOT_TAG: &str = "root";

/// Settings read by every [`XmlRenderer::render`] call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    pub root_tag_name: String,
    pub item_tag_name: String,
    /// Name sequence items after their parent tag minus its last character
    pub override_item_tag_name: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            root_tag_name: DEFAULT_ROOT_TAG.to_string(),
            item_tag_name: DEFAULT_ITEM_TAG.to_string(),
            override_item_tag_name: false,
        }
    }
}

impl RendererConfig {
    pub fn with_root_tag_name(mut self, tag: impl Into<String>) -> Self {
        self.root_tag_name = tag.into();
        self
    }

    pub fn with_item_tag_name(mut self, tag: impl Into<String>) -> Self {
        self.item_tag_name = tag.into();
        self
    }

    pub fn override_item_tag_name(mut self, enabled: bool) -> Self {
        self.override_item_tag_name = enabled;
        self
    }
}

/// How sequence items are laid out
#[derive(Clone, Copy, Debug)]
pub(crate) enum ItemTags<'c> {
    /// Every item wrapped in its own element
    Wrapped {
        item_tag: &'c str,
        from_parent: bool,
    },
    /// Items written back to back with no element of their own
    Bare,
}

/// Recursive emission shared by the XML and SOAP renderers
#[derive(Clone, Copy, Debug)]
pub(crate) struct TreeWalker<'c> {
    items: ItemTags<'c>,
}

impl<'c> TreeWalker<'c> {
    pub(crate) const fn new(items: ItemTags<'c>) -> Self {
        Self { items }
    }

    /// Emit `value` as the content of the element named `parent`
    pub(crate) fn write(&self, writer: &mut XmlWriter, value: &Value, parent: &str) -> Result<()> {
        match value {
            Value::Sequence(items) => match self.items {
                ItemTags::Wrapped { .. } => {
                    let tag = self.item_tag(parent);
                    for item in items {
                        writer.start_element(&tag, &[])?;
                        self.write(writer, item, &tag)?;
                        writer.end_element(&tag);
                    }
                }
                ItemTags::Bare => {
                    for item in items {
                        self.write(writer, item, parent)?;
                    }
                }
            },
            Value::Mapping(entries) => {
                for (key, value) in entries {
                    writer.start_element(key, &[])?;
                    self.write(writer, value, key)?;
                    writer.end_element(key);
                }
            }
            Value::Null => {}
            Value::Scalar(scalar) => writer.characters(&scalar.to_text())?,
        }
        Ok(())
    }

    fn item_tag<'p>(&self, parent: &'p str) -> Cow<'p, str>
    where
        'c: 'p,
    {
        let ItemTags::Wrapped {
            item_tag,
            from_parent,
        } = self.items
        else {
            return Cow::Borrowed(parent);
        };
        if !from_parent {
            return Cow::Borrowed(item_tag);
        }

        let mut chars = parent.chars();
        chars.next_back();
        let singular = chars.as_str();
        if singular.is_empty() {
            Cow::Borrowed(item_tag)
        } else {
            trace!(parent, item = singular, "overriding item tag");
            Cow::Owned(singular.to_string())
        }
    }
}

/// Renders value trees as XML documents
#[derive(Clone, Debug, Default)]
pub struct XmlRenderer {
    config: RendererConfig,
}

impl XmlRenderer {
    pub const MEDIA_TYPE: &'static str = "application/xml";
    pub const FORMAT: &'static str = "xml";
    pub const CHARSET: &'static str = "utf-8";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Serialize `value` under the configured root tag.
    ///
    /// A null value renders as empty text rather than a document.
    pub fn render(&self, value: &Value) -> Result<String> {
        if value.is_null() {
            return Ok(String::new());
        }

        let root = self.config.root_tag_name.as_str();
        debug!(root, "rendering xml");

        let mut writer = XmlWriter::with_capacity(256);
        writer.start_document();
        writer.start_element(root, &[])?;
        self.walker().write(&mut writer, value, root)?;
        writer.end_element(root);

        let output = writer.end_document();
        debug!(bytes = output.len(), "rendered xml");
        Ok(output)
    }

    fn walker(&self) -> TreeWalker<'_> {
        TreeWalker::new(ItemTags::Wrapped {
            item_tag: &self.config.item_tag_name,
            from_parent: self.config.override_item_tag_name,
        })
    }
}

/// Render with the default configuration
pub fn to_xml_string(value: &Value) -> Result<String> {
    XmlRenderer::new().render(value)
}
