//! Page mutation commands.
//!
//! Effects describe what should change on the page as a list of
//! [`DomCommand`]s; the host applies them. This keeps every effect testable
//! without a browser.

/// Opaque handle to a page element, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// Presentation classes the effects toggle.
pub mod class {
    /// Added once a fade-in element has been revealed.
    pub const VISIBLE: &str = "visible";
    /// Present on open accordion items.
    pub const IS_OPEN: &str = "is-open";
    /// Present while a glitch burst is running.
    pub const IS_GLITCHING: &str = "is-glitching";
}

/// A single page mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomCommand {
    /// Add a class.
    AddClass {
        /// Target.
        element: ElementId,
        /// Class name.
        class: &'static str,
    },
    /// Remove a class.
    RemoveClass {
        /// Target.
        element: ElementId,
        /// Class name.
        class: &'static str,
    },
    /// Set an attribute.
    SetAttribute {
        /// Target.
        element: ElementId,
        /// Attribute name.
        name: &'static str,
        /// New value.
        value: String,
    },
    /// Set an inline style property (custom properties included).
    SetStyle {
        /// Target.
        element: ElementId,
        /// Property name.
        property: &'static str,
        /// New value.
        value: String,
    },
    /// Replace the element's text.
    SetText {
        /// Target.
        element: ElementId,
        /// New text.
        text: String,
    },
    /// Replace the element's children with trusted markup.
    SetMarkup {
        /// Target.
        element: ElementId,
        /// Markup generated by this crate family, never user input.
        markup: String,
    },
}

impl DomCommand {
    /// Element this command targets.
    #[must_use]
    pub fn element(&self) -> ElementId {
        match self {
            Self::AddClass { element, .. }
            | Self::RemoveClass { element, .. }
            | Self::SetAttribute { element, .. }
            | Self::SetStyle { element, .. }
            | Self::SetText { element, .. }
            | Self::SetMarkup { element, .. } => *element,
        }
    }
}

/// Commands collected during one frame.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<DomCommand>,
}

impl CommandBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class.
    pub fn add_class(&mut self, element: ElementId, class: &'static str) {
        self.commands.push(DomCommand::AddClass { element, class });
    }

    /// Removes a class.
    pub fn remove_class(&mut self, element: ElementId, class: &'static str) {
        self.commands.push(DomCommand::RemoveClass { element, class });
    }

    /// Adds or removes a class.
    pub fn toggle_class(&mut self, element: ElementId, class: &'static str, on: bool) {
        if on {
            self.add_class(element, class);
        } else {
            self.remove_class(element, class);
        }
    }

    /// Sets an attribute.
    pub fn set_attribute(
        &mut self,
        element: ElementId,
        name: &'static str,
        value: impl Into<String>,
    ) {
        self.commands.push(DomCommand::SetAttribute {
            element,
            name,
            value: value.into(),
        });
    }

    /// Sets an inline style property.
    pub fn set_style(
        &mut self,
        element: ElementId,
        property: &'static str,
        value: impl Into<String>,
    ) {
        self.commands.push(DomCommand::SetStyle {
            element,
            property,
            value: value.into(),
        });
    }

    /// Replaces an element's text.
    pub fn set_text(&mut self, element: ElementId, text: impl Into<String>) {
        self.commands.push(DomCommand::SetText {
            element,
            text: text.into(),
        });
    }

    /// Replaces an element's children with generated markup.
    pub fn set_markup(&mut self, element: ElementId, markup: impl Into<String>) {
        self.commands.push(DomCommand::SetMarkup {
            element,
            markup: markup.into(),
        });
    }

    /// Number of pending commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Pending commands, in emission order.
    #[must_use]
    pub fn commands(&self) -> &[DomCommand] {
        &self.commands
    }

    /// Takes every pending command, leaving the buffer empty.
    pub fn drain(&mut self) -> std::vec::Drain<'_, DomCommand> {
        self.commands.drain(..)
    }
}
