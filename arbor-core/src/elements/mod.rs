//! Element Factories
//!
//! Thin constructors over an [`ElementTarget`]: each one creates a single
//! element, applies its attributes in order, resolves a slot as its content
//! and hands the element back, ready to be used as a pre-built node inside
//! another slot.
//!
//! Live bindings inside an element belong to the element. They are released
//! when the render target disposes it, which happens when the content that
//! contains the element is replaced or released.
//!
//! ```rust
//! use std::sync::Arc;
//! use arbor_core::elements::{attributes, Elements};
//! use arbor_core::compose::Slot;
//! use arbor_core::reactive::Cell;
//! use arbor_core::tree::MemoryTarget;
//!
//! let target = Arc::new(MemoryTarget::new());
//! let ui = Elements::new(Arc::clone(&target));
//! let name = Cell::new("world");
//!
//! let greeting = ui.p(vec![Slot::text("hello "), Slot::from(&name)], &attributes([("class", "greeting")]));
//! ui.composer().resolve(&target.body(), Slot::node(greeting));
//! assert_eq!(target.text_content(&target.body()), "hello world");
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

use crate::compose::{Composer, Slot};
use crate::reactive::{Cell, Subscription};
use crate::tree::ElementTarget;

/// Element attributes, applied in insertion order.
pub type Attributes = IndexMap<String, String>;

/// Build an attribute map from key/value pairs.
pub fn attributes<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

const CENTERED: &str = "text-align: center; margin: auto; width: fit-content";

/// Prefix of the identifiers [`Elements::labeled_input`] derives.
pub const INPUT_ID_PREFIX: &str = "arbor-input-";

/// A cell an input element follows.
#[derive(Debug, Clone, Copy)]
pub enum InputBinding<'a> {
    /// The `value` attribute follows the cell.
    Value(&'a Cell<String>),

    /// The `checked` attribute is present while the cell holds `true`.
    Checked(&'a Cell<bool>),
}

impl<'a> From<&'a Cell<String>> for InputBinding<'a> {
    fn from(cell: &'a Cell<String>) -> Self {
        InputBinding::Value(cell)
    }
}

impl<'a> From<&'a Cell<bool>> for InputBinding<'a> {
    fn from(cell: &'a Cell<bool>) -> Self {
        InputBinding::Checked(cell)
    }
}

/// Element constructors bound to one render target.
pub struct Elements<R: ElementTarget> {
    composer: Composer<R>,
}

impl<R: ElementTarget> Clone for Elements<R> {
    fn clone(&self) -> Self {
        Self {
            composer: self.composer.clone(),
        }
    }
}

impl<R: ElementTarget> Elements<R> {
    /// Create factories with a fresh composer over `target`.
    pub fn new(target: Arc<R>) -> Self {
        Self {
            composer: Composer::new(target),
        }
    }

    /// Share an existing composer.
    pub fn with_composer(composer: Composer<R>) -> Self {
        Self { composer }
    }

    /// The composer that resolves element content.
    pub fn composer(&self) -> &Composer<R> {
        &self.composer
    }

    fn target(&self) -> &R {
        self.composer.target()
    }

    fn apply(&self, node: &R::Node, attrs: &Attributes, reserved: &[&str]) {
        for (key, value) in attrs {
            if reserved.contains(&key.as_str()) {
                warn!(key = %key, "attribute is set through its own parameter, ignored");
                continue;
            }
            self.target().set_attribute(node, key, value);
        }
    }

    /// Resolve `slot` into `node`; its bindings belong to `node`.
    fn fill(&self, node: &R::Node, slot: impl Into<Slot<R::Node>>) {
        let attached = self.composer.attach(node, slot);
        self.composer.adopt(node, attached);
    }

    /// Unsubscribe when `node` is disposed.
    fn own(&self, node: &R::Node, subscription: Subscription) {
        self.target()
            .on_dispose(node, Box::new(move || subscription.unsubscribe()));
    }

    /// Any element: `<name>` with `slot` as its content.
    pub fn tag(&self, name: &str, slot: impl Into<Slot<R::Node>>, attrs: &Attributes) -> R::Node {
        let node = self.target().create_element(name);
        self.apply(&node, attrs, &[]);
        self.fill(&node, slot);
        node
    }

    /// A `div`.
    pub fn div(&self, slot: impl Into<Slot<R::Node>>, attrs: &Attributes) -> R::Node {
        self.tag("div", slot, attrs)
    }

    /// A paragraph.
    pub fn p(&self, slot: impl Into<Slot<R::Node>>, attrs: &Attributes) -> R::Node {
        self.tag("p", slot, attrs)
    }

    /// A `span`.
    pub fn span(&self, slot: impl Into<Slot<R::Node>>, attrs: &Attributes) -> R::Node {
        self.tag("span", slot, attrs)
    }

    /// `h1` through `h6`. Other levels are logged and created anyway.
    pub fn heading(&self, level: u8, slot: impl Into<Slot<R::Node>>, attrs: &Attributes) -> R::Node {
        if !(1..=6).contains(&level) {
            warn!(level, "heading level outside h1..h6");
        }
        self.tag(&format!("h{level}"), slot, attrs)
    }

    /// A div that centers its content. Its centering style follows any
    /// `style` given in `attrs`.
    pub fn center(&self, slot: impl Into<Slot<R::Node>>, attrs: &Attributes) -> R::Node {
        let node = self.target().create_element("div");
        self.apply(&node, attrs, &["style"]);
        let style = match attrs.get("style") {
            Some(style) => format!("{}; {CENTERED}", style.trim_end_matches(';')),
            None => CENTERED.to_string(),
        };
        self.target().set_attribute(&node, "style", &style);
        self.fill(&node, slot);
        node
    }

    /// An anchor to `href`, opening in a new tab when `new_tab` is set.
    pub fn link(
        &self,
        href: &str,
        slot: impl Into<Slot<R::Node>>,
        new_tab: bool,
        attrs: &Attributes,
    ) -> R::Node {
        let node = self.target().create_element("a");
        self.target().set_attribute(&node, "href", href);
        if new_tab {
            self.target().set_attribute(&node, "target", "_blank");
        }
        self.apply(&node, attrs, &["href"]);
        self.fill(&node, slot);
        node
    }

    /// An image. Images have no content.
    pub fn image(&self, src: &str, attrs: &Attributes) -> R::Node {
        let node = self.target().create_element("img");
        self.target().set_attribute(&node, "src", src);
        self.apply(&node, attrs, &["src"]);
        node
    }

    /// A detached leaf, for use as a pre-built node.
    pub fn text(&self, value: impl std::fmt::Display) -> R::Node {
        self.target().create_leaf(&value.to_string())
    }

    /// A button. Click handling is left to the caller's render target.
    pub fn button(&self, slot: impl Into<Slot<R::Node>>, attrs: &Attributes) -> R::Node {
        let node = self.target().create_element("button");
        self.apply(&node, attrs, &["onclick"]);
        self.fill(&node, slot);
        node
    }

    /// An `<input type=kind>`, optionally following a cell.
    ///
    /// The binding runs one way: the cell drives the element. A
    /// [`InputBinding::Checked`] binding on an input that is neither a
    /// checkbox nor a radio button is logged and applied anyway.
    pub fn input(&self, kind: &str, attrs: &Attributes, bind: Option<InputBinding<'_>>) -> R::Node {
        let node = self.target().create_element("input");
        self.target().set_attribute(&node, "type", kind);
        self.apply(&node, attrs, &[]);

        let target = Arc::clone(self.composer.target());
        let bound = node.clone();
        let subscription = match bind {
            None => return node,
            Some(InputBinding::Value(cell)) => {
                self.target().set_attribute(&node, "value", &cell.get());
                cell.subscribe(move |value| target.set_attribute(&bound, "value", value))
            }
            Some(InputBinding::Checked(cell)) => {
                if !matches!(kind, "checkbox" | "radio") {
                    warn!(kind, "checked binding on an input that cannot be checked");
                }
                set_checked(self.target(), &node, cell.get());
                cell.subscribe(move |checked| set_checked(&*target, &bound, *checked))
            }
        };
        self.own(&node, subscription);
        node
    }

    /// A label followed by an input, as a two-node sequence.
    ///
    /// Without an `id` in `attrs` the input gets one derived from the label
    /// text, and the label's `for` points at it either way.
    pub fn labeled_input(
        &self,
        label: &str,
        kind: &str,
        attrs: &Attributes,
        bind: Option<InputBinding<'_>>,
    ) -> Slot<R::Node> {
        let mut attrs = attrs.clone();
        let id = attrs
            .entry("id".to_string())
            .or_insert_with(|| input_id(label))
            .clone();

        let label_node = self.target().create_element("label");
        self.target().set_attribute(&label_node, "for", &id);
        self.fill(&label_node, label);

        let input = self.input(kind, &attrs, bind);
        Slot::Many(vec![Slot::node(label_node), Slot::node(input)])
    }

    /// A div that is displayed only while `condition` holds.
    ///
    /// The content is rendered once and stays attached; only the div's
    /// `style` follows the cell.
    pub fn show_if(&self, condition: &Cell<bool>, slot: impl Into<Slot<R::Node>>) -> R::Node {
        let node = self.target().create_element("div");
        self.target()
            .set_attribute(&node, "style", display(condition.get()));

        let target = Arc::clone(self.composer.target());
        let styled = node.clone();
        let subscription = condition.subscribe(move |visible| {
            target.set_attribute(&styled, "style", display(*visible));
        });
        self.own(&node, subscription);

        self.fill(&node, slot);
        node
    }
}

fn set_checked<R: ElementTarget>(target: &R, node: &R::Node, checked: bool) {
    if checked {
        target.set_attribute(node, "checked", "");
    } else {
        target.remove_attribute(node, "checked");
    }
}

/// Identifier for an input labeled `label`: lowercase, whitespace as `_`.
fn input_id(label: &str) -> String {
    let slug: String = label
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{INPUT_ID_PREFIX}{}", slug.to_lowercase())
}

fn display(visible: bool) -> &'static str {
    if visible {
        "display: block"
    } else {
        "display: none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{MemoryTarget, RenderTarget};

    fn setup() -> (Arc<MemoryTarget>, Elements<MemoryTarget>) {
        let target = Arc::new(MemoryTarget::new());
        let ui = Elements::new(Arc::clone(&target));
        (target, ui)
    }

    #[test]
    fn div_applies_attributes_and_content() {
        let (target, ui) = setup();
        let div = ui.div("inside", &attributes([("class", "box"), ("id", "main")]));

        assert_eq!(target.tag(&div).as_deref(), Some("div"));
        assert_eq!(target.attribute(&div, "class").as_deref(), Some("box"));
        assert_eq!(target.attribute(&div, "id").as_deref(), Some("main"));
        assert_eq!(target.texts(&div), vec!["inside"]);
        assert_eq!(target.parent(&div), None);
    }

    #[test]
    fn elements_nest_as_prebuilt_nodes() {
        let (target, ui) = setup();
        let none = Attributes::new();
        let item = ui.span("item", &none);
        let list = ui.tag("ul", Slot::node(item), &none);

        assert_eq!(target.parent(&item), Some(list));
        assert_eq!(target.text_content(&list), "item");
    }

    #[test]
    fn heading_levels() {
        let (target, ui) = setup();
        let none = Attributes::new();
        assert_eq!(target.tag(&ui.heading(2, "Title", &none)).as_deref(), Some("h2"));
        // Out of range still builds an element.
        assert_eq!(target.tag(&ui.heading(9, "Odd", &none)).as_deref(), Some("h9"));
    }

    #[test]
    fn link_sets_href_and_target() {
        let (target, ui) = setup();
        let link = ui.link(
            "https://example.com",
            "example",
            true,
            &attributes([("href", "https://ignored.example"), ("rel", "noopener")]),
        );

        assert_eq!(target.attribute(&link, "href").as_deref(), Some("https://example.com"));
        assert_eq!(target.attribute(&link, "target").as_deref(), Some("_blank"));
        assert_eq!(target.attribute(&link, "rel").as_deref(), Some("noopener"));

        let same_tab = ui.link("/home", "home", false, &Attributes::new());
        assert_eq!(target.attribute(&same_tab, "target"), None);
    }

    #[test]
    fn center_merges_style() {
        let (target, ui) = setup();
        let plain = ui.center("x", &Attributes::new());
        assert_eq!(target.attribute(&plain, "style").as_deref(), Some(CENTERED));

        let styled = ui.center("y", &attributes([("style", "color: red;")]));
        assert_eq!(
            target.attribute(&styled, "style"),
            Some(format!("color: red; {CENTERED}"))
        );
    }

    #[test]
    fn image_has_src_and_no_children() {
        let (target, ui) = setup();
        let img = ui.image("shrek.png", &attributes([("alt", "ogre")]));
        assert_eq!(target.attribute(&img, "src").as_deref(), Some("shrek.png"));
        assert_eq!(target.attribute(&img, "alt").as_deref(), Some("ogre"));
        assert!(target.children(&img).is_empty());
    }

    #[test]
    fn text_is_detached_leaf() {
        let (target, ui) = setup();
        let leaf = ui.text(12);
        assert_eq!(target.parent(&leaf), None);
        assert_eq!(target.text_content(&leaf), "12");
    }

    #[test]
    fn show_if_follows_condition() {
        let (target, ui) = setup();
        let visible = Cell::new(false);
        let region = ui.show_if(&visible, "secret");

        assert_eq!(target.attribute(&region, "style").as_deref(), Some("display: none"));
        assert_eq!(target.texts(&region), vec!["secret"]);

        visible.set(true);
        assert_eq!(target.attribute(&region, "style").as_deref(), Some("display: block"));
    }

    #[test]
    fn button_ignores_onclick_attribute() {
        let (target, ui) = setup();
        let button = ui.button("go", &attributes([("onclick", "alert(1)"), ("class", "primary")]));

        assert_eq!(target.tag(&button).as_deref(), Some("button"));
        assert_eq!(target.attribute(&button, "onclick"), None);
        assert_eq!(target.attribute(&button, "class").as_deref(), Some("primary"));
        assert_eq!(target.texts(&button), vec!["go"]);
    }

    #[test]
    fn input_value_follows_cell() {
        let (target, ui) = setup();
        let name = Cell::new(String::from("shrek"));
        let input = ui.input("text", &attributes([("placeholder", "name")]), Some((&name).into()));

        assert_eq!(target.attribute(&input, "type").as_deref(), Some("text"));
        assert_eq!(target.attribute(&input, "value").as_deref(), Some("shrek"));

        name.set("fiona".to_string());
        assert_eq!(target.attribute(&input, "value").as_deref(), Some("fiona"));
    }

    #[test]
    fn checkbox_checked_follows_cell() {
        let (target, ui) = setup();
        let agreed = Cell::new(false);
        let input = ui.input("checkbox", &Attributes::new(), Some((&agreed).into()));
        assert_eq!(target.attribute(&input, "checked"), None);

        agreed.set(true);
        assert_eq!(target.attribute(&input, "checked").as_deref(), Some(""));

        agreed.set(false);
        assert_eq!(target.attribute(&input, "checked"), None);
    }

    #[test]
    fn unbound_input_has_no_value() {
        let (target, ui) = setup();
        let input = ui.input("email", &Attributes::new(), None);
        assert_eq!(target.attribute(&input, "value"), None);
        assert_eq!(target.pending_dispose_count(), 0);
    }

    #[test]
    fn labeled_input_derives_id() {
        let (target, ui) = setup();
        let body = target.body();
        let slot = ui.labeled_input("Your Name", "text", &Attributes::new(), None);
        ui.composer().resolve(&body, slot);

        let children = target.children(&body);
        let &[label, input] = children.as_slice() else {
            panic!("expected a label and an input");
        };
        assert_eq!(target.tag(&label).as_deref(), Some("label"));
        assert_eq!(target.text_content(&label), "Your Name");
        assert_eq!(target.attribute(&label, "for").as_deref(), Some("arbor-input-your_name"));
        assert_eq!(target.find_by_id("arbor-input-your_name"), Some(input));
    }

    #[test]
    fn labeled_input_keeps_given_id() {
        let (target, ui) = setup();
        let body = target.body();
        let slot = ui.labeled_input("Email", "email", &attributes([("id", "mail")]), None);
        ui.composer().resolve(&body, slot);

        let label = target.children(&body)[0];
        assert_eq!(target.attribute(&label, "for").as_deref(), Some("mail"));
        assert!(target.find_by_id("mail").is_some());
    }

    #[test]
    fn disposing_element_releases_its_bindings() {
        let (target, ui) = setup();
        let count = Cell::new(0i32);
        let visible = Cell::new(true);
        let text = Cell::new(String::new());

        let p = ui.p(Slot::from(&count), &Attributes::new());
        let shown = ui.show_if(&visible, "x");
        let input = ui.input("text", &Attributes::new(), Some((&text).into()));
        assert_eq!(count.subscriber_count(), 1);
        assert_eq!(visible.subscriber_count(), 1);
        assert_eq!(text.subscriber_count(), 1);

        for node in [p, shown, input] {
            target.dispose(&node);
        }
        assert_eq!(count.subscriber_count(), 0);
        assert_eq!(visible.subscriber_count(), 0);
        assert_eq!(text.subscriber_count(), 0);
        assert_eq!(target.pending_dispose_count(), 0);
        assert_eq!(target.node_count(), 1);
    }

    #[test]
    fn nested_element_bindings_follow_outer_cell() {
        let (target, ui) = setup();
        let body = target.body();
        let inner = Cell::new(1i32);
        let view: Cell<Slot<crate::tree::MemoryNode>> = Cell::new(Slot::Absent);
        ui.composer().resolve(&body, &view);

        for _ in 0..5 {
            view.set(Slot::node(ui.div(Slot::from(&inner), &Attributes::new())));
        }
        assert_eq!(inner.subscriber_count(), 1);

        inner.set(2);
        assert_eq!(target.text_content(&body), "2");
    }

    #[test]
    fn reactive_content_inside_element() {
        let (target, ui) = setup();
        let count = Cell::new(0i32);
        let p = ui.p(vec![Slot::text("count: "), Slot::from(&count)], &Attributes::new());

        count.set(3);
        assert_eq!(target.texts(&p), vec!["count: ", "3"]);
    }
}
