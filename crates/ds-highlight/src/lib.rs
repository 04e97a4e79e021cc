//! Modifier-gated hover and click highlighting over a markable host tree.
//!
//! The [`Highlighter`] never owns node content. It only adds and removes its
//! own classes and click-marker attribute, so every side effect can be undone
//! by [`Highlighter::disable`].

use ds_core::DomspyError;
use ds_core::DomspyResult;
use ds_core::SharedLogger;
use ds_dom::MarkableTree;
use ds_dom::NodeId;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

const COMPONENT: &str = "highlighter";
const DEFAULT_TRANSIENT_CLASS: &str = "domspy-highlight";
const DEFAULT_PERSISTED_CLASS: &str = "domspy-persisted";
const DEFAULT_CLICK_MARKER: &str = "data-domspy-click";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    pub transient_class: String,
    pub persisted_class: String,
    /// Attribute set on nodes that currently carry a click handler.
    pub click_marker_attribute: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            transient_class: DEFAULT_TRANSIENT_CLASS.to_owned(),
            persisted_class: DEFAULT_PERSISTED_CLASS.to_owned(),
            click_marker_attribute: DEFAULT_CLICK_MARKER.to_owned(),
        }
    }
}

impl HighlightConfig {
    pub fn validate(&self) -> DomspyResult<()> {
        for (field, value) in [
            ("transient_class", &self.transient_class),
            ("persisted_class", &self.persisted_class),
            ("click_marker_attribute", &self.click_marker_attribute),
        ] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(DomspyError::new(
                    "config.highlight_name_invalid",
                    format!("{field} must be a single non-empty token, got `{value}`"),
                ));
            }
        }

        if self.transient_class == self.persisted_class {
            return Err(DomspyError::new(
                "config.highlight_classes_conflict",
                "transient and persisted classes must differ",
            ));
        }

        Ok(())
    }
}

/// Discrete input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightEvent {
    ModifierDown,
    ModifierUp,
    PointerMove(NodeId),
    Click(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightPhase {
    Disabled,
    Idle,
    Hover,
}

/// Per-node highlight sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMark {
    Plain,
    Transient,
    Persisted,
}

/// Payload reported when a click leaves a node persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEvent {
    pub outer_markup: String,
    pub tag_name: String,
    pub id: String,
    pub class_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// The host must suppress the event's default action and propagation.
    pub default_prevented: bool,
    pub selection: Option<SelectionEvent>,
}

pub struct Highlighter {
    config: HighlightConfig,
    logger: SharedLogger,
    active: bool,
    hover_mode: bool,
    key_listeners: bool,
    transient: Option<NodeId>,
    persisted: BTreeSet<NodeId>,
    handlers: BTreeSet<NodeId>,
}

impl Highlighter {
    pub fn new(config: HighlightConfig, logger: SharedLogger) -> Self {
        Self {
            config,
            logger,
            active: false,
            hover_mode: false,
            key_listeners: false,
            transient: None,
            persisted: BTreeSet::new(),
            handlers: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn phase(&self) -> HighlightPhase {
        match (self.active, self.hover_mode) {
            (false, _) => HighlightPhase::Disabled,
            (true, false) => HighlightPhase::Idle,
            (true, true) => HighlightPhase::Hover,
        }
    }

    pub fn is_in_highlight_mode(&self) -> bool {
        self.hover_mode
    }

    pub fn has_key_listeners(&self) -> bool {
        self.key_listeners
    }

    pub fn transient(&self) -> Option<NodeId> {
        self.transient
    }

    pub fn persisted(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.persisted.iter().copied()
    }

    pub fn has_click_handler(&self, node: NodeId) -> bool {
        self.handlers.contains(&node)
    }

    pub fn mark_of(&self, node: NodeId) -> NodeMark {
        if self.persisted.contains(&node) {
            NodeMark::Persisted
        } else if self.transient == Some(node) {
            NodeMark::Transient
        } else {
            NodeMark::Plain
        }
    }

    /// Installs the modifier listeners. Nothing is marked until hover mode.
    pub fn enable(&mut self) {
        self.active = true;
        self.key_listeners = true;
        self.logger.info(COMPONENT, "highlighting enabled");
    }

    /// Drops every handler and mark, then removes the key listeners.
    pub fn disable<T: MarkableTree + ?Sized>(&mut self, tree: &mut T) {
        self.active = false;
        self.hover_mode = false;
        for node in std::mem::take(&mut self.handlers) {
            self.remove_marker(tree, node);
        }
        self.clear_all_highlights(tree);
        self.key_listeners = false;
        self.logger.info(COMPONENT, "highlighting disabled");
    }

    /// Removes transient and persisted marks; listeners and handlers stay.
    pub fn clear_all_highlights<T: MarkableTree + ?Sized>(&mut self, tree: &mut T) {
        if let Some(node) = self.transient.take() {
            self.remove_class(tree, node, &self.config.transient_class);
        }

        for node in std::mem::take(&mut self.persisted) {
            self.remove_class(tree, node, &self.config.persisted_class);
        }
    }

    pub fn handle<T: MarkableTree + ?Sized>(
        &mut self,
        tree: &mut T,
        event: HighlightEvent,
    ) -> EventOutcome {
        match event {
            HighlightEvent::ModifierDown => {
                if self.active && self.key_listeners && !self.hover_mode {
                    self.hover_mode = true;
                    self.logger.debug(COMPONENT, "hover mode engaged");
                }
                EventOutcome::default()
            }
            HighlightEvent::ModifierUp => {
                if self.key_listeners {
                    self.leave_hover_mode(tree);
                }
                EventOutcome::default()
            }
            HighlightEvent::PointerMove(node) => {
                if self.active && self.hover_mode {
                    self.pointer_move(tree, node);
                }
                EventOutcome::default()
            }
            HighlightEvent::Click(node) => {
                if self.active && self.hover_mode {
                    self.click(tree, node)
                } else {
                    EventOutcome::default()
                }
            }
        }
    }

    fn leave_hover_mode<T: MarkableTree + ?Sized>(&mut self, tree: &mut T) {
        self.hover_mode = false;
        if let Some(node) = self.transient.take() {
            self.remove_class(tree, node, &self.config.transient_class);
        }
        for node in std::mem::take(&mut self.handlers) {
            self.remove_marker(tree, node);
        }
        self.logger.debug(COMPONENT, "hover mode released");
    }

    fn pointer_move<T: MarkableTree + ?Sized>(&mut self, tree: &mut T, node: NodeId) {
        if let Some(previous) = self.transient {
            if previous != node {
                self.remove_class(tree, previous, &self.config.transient_class);
                self.detach_handler(tree, previous);
                self.transient = None;
            }
        }

        if self.persisted.contains(&node) {
            return;
        }

        self.add_class(tree, node, &self.config.transient_class);
        self.attach_handler(tree, node);
        self.transient = Some(node);
    }

    fn click<T: MarkableTree + ?Sized>(&mut self, tree: &mut T, node: NodeId) -> EventOutcome {
        match self.mark_of(node) {
            NodeMark::Plain => EventOutcome::default(),
            NodeMark::Persisted => {
                self.persisted.remove(&node);
                self.remove_class(tree, node, &self.config.persisted_class);
                self.detach_handler(tree, node);
                self.logger
                    .debug(COMPONENT, &format!("node {} unpersisted", node.raw()));
                EventOutcome {
                    default_prevented: true,
                    selection: None,
                }
            }
            NodeMark::Transient => {
                self.remove_class(tree, node, &self.config.transient_class);
                self.transient = None;
                self.persisted.insert(node);
                self.add_class(tree, node, &self.config.persisted_class);
                self.logger
                    .debug(COMPONENT, &format!("node {} persisted", node.raw()));
                EventOutcome {
                    default_prevented: true,
                    selection: self.selection(tree, node),
                }
            }
        }
    }

    fn selection<T: MarkableTree + ?Sized>(&self, tree: &T, node: NodeId) -> Option<SelectionEvent> {
        let describe = || -> DomspyResult<SelectionEvent> {
            let class_name = tree
                .class_name(node)?
                .split_ascii_whitespace()
                .filter(|token| {
                    *token != self.config.transient_class && *token != self.config.persisted_class
                })
                .collect::<Vec<_>>()
                .join(" ");
            Ok(SelectionEvent {
                outer_markup: tree.outer_html(node)?,
                tag_name: tree.tag_name(node)?,
                id: tree.element_id(node)?,
                class_name,
            })
        };

        match describe() {
            Ok(event) => Some(event),
            Err(error) => {
                self.logger.warn(
                    COMPONENT,
                    &format!("could not describe selected node {}: {error}", node.raw()),
                );
                None
            }
        }
    }

    fn attach_handler<T: MarkableTree + ?Sized>(&mut self, tree: &mut T, node: NodeId) {
        self.handlers.insert(node);
        if let Err(error) = tree.set_attribute(node, &self.config.click_marker_attribute, "true") {
            self.report(node, &error);
        }
    }

    fn detach_handler<T: MarkableTree + ?Sized>(&mut self, tree: &mut T, node: NodeId) {
        if self.handlers.remove(&node) {
            self.remove_marker(tree, node);
        }
    }

    fn remove_marker<T: MarkableTree + ?Sized>(&self, tree: &mut T, node: NodeId) {
        if let Err(error) = tree.remove_attribute(node, &self.config.click_marker_attribute) {
            self.report(node, &error);
        }
    }

    fn add_class<T: MarkableTree + ?Sized>(&self, tree: &mut T, node: NodeId, class: &str) {
        if let Err(error) = tree.add_class(node, class) {
            self.report(node, &error);
        }
    }

    fn remove_class<T: MarkableTree + ?Sized>(&self, tree: &mut T, node: NodeId, class: &str) {
        if let Err(error) = tree.remove_class(node, class) {
            self.report(node, &error);
        }
    }

    fn report(&self, node: NodeId, error: &DomspyError) {
        self.logger
            .warn(COMPONENT, &format!("mark update on node {} failed: {error}", node.raw()));
    }
}
