use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::catalog::ActionCatalog;
use crate::error::DescriptorError;

pub const ACTION_TAG: &str = "Action";
pub const SCHEME_TAG: &str = "ActionProperties";
pub const DEFAULT_SCHEME: &str = "Default";

const NAME_ATTR: &str = "name";
const SHORTCUT_ATTR: &str = "shortcut";
const SCHEME_ATTR: &str = "scheme";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Reads the descriptor at `input`, unbinds every action and writes the
/// result to `output`. `input` is never modified.
///
/// The document type declaration is carried over verbatim. Comments and
/// processing instructions are not.
pub fn rewrite_descriptor(
    input: &Path,
    output: &Path,
    catalog: &ActionCatalog,
) -> Result<(), DescriptorError> {
    let source = fs::read_to_string(input).map_err(|source| DescriptorError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let mut root = Element::parse(source.as_bytes()).map_err(|err| DescriptorError::Parse {
        path: input.to_path_buf(),
        detail: err.to_string(),
    })?;

    rewrite_element(&mut root, catalog);
    write_atomically(&root, doctype_of(&source), output)?;

    debug!(
        input = %input.display(),
        output = %output.display(),
        actions = catalog.len(),
        "rewrote keybinding descriptor"
    );
    Ok(())
}

/// Clears the shortcut of every `Action` in the tree, then puts one empty
/// binding per catalog entry at the front of the first `ActionProperties`
/// block, creating a `Default` block as the root's first child if none exists.
pub fn rewrite_element(root: &mut Element, catalog: &ActionCatalog) {
    clear_shortcuts(root);

    let entries = catalog
        .names()
        .iter()
        .map(|name| XMLNode::Element(unbound_action(name)))
        .collect::<Vec<_>>();

    match find_first_mut(root, SCHEME_TAG) {
        Some(block) => {
            block.children.splice(0..0, entries);
        }
        None => {
            let mut block = Element::new(SCHEME_TAG);
            block
                .attributes
                .insert(SCHEME_ATTR.to_string(), DEFAULT_SCHEME.to_string());
            block.children = entries;
            root.children.insert(0, XMLNode::Element(block));
        }
    }
}

fn clear_shortcuts(element: &mut Element) {
    if element.name == ACTION_TAG {
        element
            .attributes
            .insert(SHORTCUT_ATTR.to_string(), String::new());
    }
    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            clear_shortcuts(child);
        }
    }
}

fn find_first_mut<'a>(element: &'a mut Element, tag: &str) -> Option<&'a mut Element> {
    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            if child.name == tag {
                return Some(child);
            }
            if let Some(found) = find_first_mut(child, tag) {
                return Some(found);
            }
        }
    }
    None
}

/// The `<!DOCTYPE ...>` declaration in the prolog of `source`, if any.
fn doctype_of(source: &str) -> Option<&str> {
    let start = source.find("<!DOCTYPE")?;
    let in_prolog = source[..start]
        .match_indices('<')
        .all(|(at, _)| matches!(source[at + 1..].chars().next(), Some('?' | '!')));
    if !in_prolog {
        return None;
    }

    let rest = &source[start..];
    // An internal subset may contain '>' of its own.
    let search_from = match (rest.find('['), rest.find('>')) {
        (Some(open), Some(close)) if open < close => open + rest[open..].find(']')?,
        _ => 0,
    };
    let end = search_from + rest[search_from..].find('>')?;
    Some(&rest[..=end])
}

fn unbound_action(name: &str) -> Element {
    let mut action = Element::new(ACTION_TAG);
    action
        .attributes
        .insert(SHORTCUT_ATTR.to_string(), String::new());
    action
        .attributes
        .insert(NAME_ATTR.to_string(), name.to_string());
    action
}

// Written next to the destination and renamed over it, so a failure never
// leaves a truncated descriptor at `output`.
fn write_atomically(
    root: &Element,
    doctype: Option<&str>,
    output: &Path,
) -> Result<(), DescriptorError> {
    let write_error = |detail: String| DescriptorError::Write {
        path: output.to_path_buf(),
        detail,
    };

    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(parent).map_err(|err| write_error(err.to_string()))?;

    let mut prolog = format!("{XML_DECLARATION}\n");
    if let Some(doctype) = doctype {
        prolog.push_str(doctype);
        prolog.push('\n');
    }
    staged
        .write_all(prolog.as_bytes())
        .map_err(|err| write_error(err.to_string()))?;

    let config = EmitterConfig::new()
        .perform_indent(true)
        .write_document_declaration(false);
    root.write_with_config(&mut staged, config)
        .map_err(|err| write_error(err.to_string()))?;
    staged
        .write_all(b"\n")
        .and_then(|()| staged.flush())
        .map_err(|err| write_error(err.to_string()))?;

    staged
        .persist(output)
        .map_err(|err| write_error(err.error.to_string()))?;
    Ok(())
}
