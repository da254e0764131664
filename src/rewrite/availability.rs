//! Availability annotation rewriting.
//!
//! The generator emits human-readable availability lists in two places:
//! inline sentences (`p.availability em`) and bare section-level lists
//! (`.section-availability`). Both are comma-separated platform tokens,
//! optionally suffixed `-plugin`. Two tokens get special treatment: the
//! web target (`clay-web`) triggers the product filter and the native
//! target (`clay-native`) decides how the surviving token is displayed.
//!
//! Each rule is a standalone function over the parsed token list so the
//! branching stays independently testable.

use crate::dom::Dom;

const ALL_PLATFORMS: &str = "all platforms";
const ALL_TARGETS_PHRASE: &str = "Available on all targets";
const ON_PREFIX: &str = "Available on ";
const WITH_PREFIX: &str = "Available with ";

const WEB_TARGET: &str = "clay-web";
const NATIVE_TARGET: &str = "clay-native";
const PLUGIN_SUFFIX: &str = "-plugin";
const PRODUCT: &str = "clay";

/// A parsed comma-separated availability list.
///
/// Flags are detected on the raw hyphenated tokens; `tokens` holds the
/// display forms (hyphens replaced with spaces), in input order.
struct TargetList {
    tokens: Vec<String>,
    has_plugin: bool,
    has_web: bool,
    has_native: bool,
}

impl TargetList {
    fn parse(list: &str) -> TargetList {
        let mut tokens = Vec::new();
        let mut has_plugin = false;
        let mut has_web = false;
        let mut has_native = false;
        for raw in list.split(',') {
            let raw = raw.trim();
            has_plugin |= raw.ends_with(PLUGIN_SUFFIX);
            has_web |= raw == WEB_TARGET;
            has_native |= raw == NATIVE_TARGET;
            tokens.push(raw.replace('-', " "));
        }
        TargetList {
            tokens,
            has_plugin,
            has_web,
            has_native,
        }
    }
}

/// Product filter, applied when the web target is listed.
///
/// Only non-plugin product tokens equal to the web target survive, and the
/// survivor is shown as the bare product name when the native target is
/// also listed (available everywhere the product runs).
fn filter_product_targets(list: &TargetList) -> Vec<String> {
    let web_display = WEB_TARGET.replace('-', " ");
    let product_prefix = format!("{PRODUCT} ");
    list.tokens
        .iter()
        .filter(|token| {
            !token.ends_with(" plugin")
                && token.starts_with(&product_prefix)
                && **token == web_display
        })
        .map(|_| {
            if list.has_native {
                PRODUCT.to_string()
            } else {
                web_display.clone()
            }
        })
        .collect()
}

/// Collapse the exact unordered pair {elements plugin, ui plugin} to the
/// ui plugin alone; the elements plugin ships inside it. Any other plugin
/// combination passes through unchanged.
fn collapse_plugin_pair(tokens: Vec<String>) -> Vec<String> {
    let is_pair = tokens.len() == 2
        && tokens.iter().any(|t| t == "elements plugin")
        && tokens.iter().any(|t| t == "ui plugin");
    if is_pair {
        vec!["ui plugin".to_string()]
    } else {
        tokens
    }
}

/// Rewrite one inline availability sentence.
///
/// Returns `None` when the text matches neither recognized form and must
/// be left alone.
fn rewrite_inline_text(text: &str) -> Option<String> {
    let text = text.trim();
    if text.contains(ALL_PLATFORMS) {
        return Some(ALL_TARGETS_PHRASE.to_string());
    }
    let rest = text.strip_prefix(ON_PREFIX)?;
    let list = TargetList::parse(rest);
    if list.has_web {
        Some(format!(
            "{ON_PREFIX}{}",
            filter_product_targets(&list).join(", ")
        ))
    } else if list.has_plugin {
        let tokens = collapse_plugin_pair(list.tokens);
        Some(format!("{WITH_PREFIX}{}", tokens.join(", ")))
    } else {
        Some(format!("{ON_PREFIX}{}", list.tokens.join(", ")))
    }
}

/// Rewrite one section-level availability list. No prefix sentence and no
/// plugin collapsing in this form; an empty result is allowed.
fn rewrite_section_text(text: &str) -> String {
    let list = TargetList::parse(text.trim());
    if list.has_web {
        filter_product_targets(&list).join(", ")
    } else {
        list.tokens.join(", ")
    }
}

/// Rewrite every inline annotation: each `em` under a `p.availability`.
pub fn rewrite_inline(dom: &mut Dom) {
    let paragraphs = dom.select(dom.document(), |d, id| {
        d.tag(id) == Some("p") && d.has_class(id, "availability")
    });
    for paragraph in paragraphs {
        let emphases = dom.select(paragraph, |d, id| d.tag(id) == Some("em"));
        for em in emphases {
            if let Some(replacement) = rewrite_inline_text(&dom.text(em)) {
                dom.set_text(em, &replacement);
            }
        }
    }
}

/// Rewrite every section-level annotation (`.section-availability`).
pub fn rewrite_sections(dom: &mut Dom) {
    let sections = dom.select(dom.document(), |d, id| {
        d.has_class(id, "section-availability")
    });
    for section in sections {
        let replacement = rewrite_section_text(&dom.text(section));
        dom.set_text(section, &replacement);
    }
}
