use std::collections::HashMap;

use deck_core::{CardRef, Page};
use tracing::debug;

use crate::embed::{image_data_url, placeholder_data_url};
use crate::error::{Result, SheetError};
use crate::library::ImageLibrary;
use crate::svg::Element;
use crate::template::{Template, is_label};

const TEMPLATE_COLOR: &str = "#008080";
const FILLED_COLOR: &str = "#000000";

/// Fills template copies with planned pages. Image data URLs are read once
/// per run and reused across pages.
pub struct PageComposer<'a> {
    template: &'a Template,
    library: &'a ImageLibrary,
    placeholder: String,
    cache: HashMap<(usize, usize), String>,
}

impl<'a> PageComposer<'a> {
    pub fn new(template: &'a Template, library: &'a ImageLibrary) -> Result<Self> {
        Ok(PageComposer {
            template,
            library,
            placeholder: placeholder_data_url()?,
            cache: HashMap::new(),
        })
    }

    pub fn compose(&mut self, page: &Page) -> Result<String> {
        let template = self.template;
        let mut doc = template.document().clone();
        for (slot, card) in template.slots().iter().zip(&page.slots) {
            let (label, href) = match card {
                CardRef::Card(pos) => {
                    let label = self.label(pos.set, pos.card)?;
                    (label, self.data_url(pos.set, pos.card)?.to_string())
                }
                CardRef::Placeholder => (String::new(), self.placeholder.clone()),
            };
            let Some(group) = doc.element_mut(&slot.path) else {
                continue;
            };
            fill_slot(group, &label, &href);
        }
        doc.to_svg_string()
    }

    fn label(&self, set: usize, card: usize) -> Result<String> {
        self.library
            .image(set, card)
            .map(|i| i.label.clone())
            .ok_or_else(|| missing(set, card))
    }

    fn data_url(&mut self, set: usize, card: usize) -> Result<&str> {
        if !self.cache.contains_key(&(set, card)) {
            let entry = self.library.image(set, card).ok_or_else(|| missing(set, card))?;
            debug!(image = %entry.path.display(), "embedding image");
            let url = image_data_url(&entry.path)?;
            self.cache.insert((set, card), url);
        }
        Ok(self.cache.get(&(set, card)).map_or("", String::as_str))
    }
}

fn missing(set: usize, card: usize) -> SheetError {
    SheetError::Template(format!("planned card {card} of set {set} has no image"))
}

fn fill_slot(group: &mut Element, label: &str, href: &str) {
    for child in group.elements_mut() {
        if is_label(child) {
            fill_label(child, label);
        } else if child.is("image") {
            let key = if child.has_attr("xlink:href") {
                "xlink:href"
            } else {
                "href"
            };
            child.set_attr(key, href);
        }
    }
}

/// Writes into the first `tspan` and recolours the first child. A bare
/// `<text>` only gets its content replaced.
fn fill_label(text: &mut Element, label: &str) {
    if !text.elements().any(|e| e.is("tspan")) {
        text.set_text(label);
        return;
    }
    if let Some(tspan) = text.elements_mut().find(|e| e.is("tspan")) {
        tspan.set_text(label);
    }
    if let Some(first) = text.elements_mut().next()
        && let Some(style) = first.attr("style").filter(|s| s.contains(TEMPLATE_COLOR))
    {
        first.set_attr("style", &style.replace(TEMPLATE_COLOR, FILLED_COLOR));
    }
}
