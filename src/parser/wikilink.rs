//! Human-readable theorem titles from wiki links
//!
//! Links look like `[[Page name]]`, `[[Page name]]s` (plural carried outside
//! the brackets) or `[[Target|Displayed text]]`.

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// Pick the title for a piped link
///
/// The target wins unless it points at a section (`#`) or the link does not
/// contain the lowercase word "theorem", in which case the displayed text is used.
fn choose_piped(inner: &str, target: &str, displayed: &str) -> String {
    if target.contains('#') || !inner.contains("theorem") {
        displayed.to_string()
    } else {
        target.to_string()
    }
}

/// Title derived from a single wiki link
pub fn title_from_link(link: &str) -> String {
    let link = link.trim();
    let stripped = link.strip_prefix(OPEN).unwrap_or(link);
    let (inner, suffix) = stripped.split_once(CLOSE).unwrap_or((stripped, ""));

    let mut title = match inner.split_once('|') {
        Some((target, displayed)) => choose_piped(inner, target.trim(), displayed.trim()),
        None => inner.trim().to_string(),
    };
    if suffix == "s" {
        title.push('s');
    }
    title
}

/// Title of a theorem: derived from its first (canonical) wiki link
pub fn derive_title(wikipedia_links: &[String]) -> Option<String> {
    wikipedia_links.first().map(|link| title_from_link(link))
}
