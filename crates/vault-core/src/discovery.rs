//! Person page discovery

use serde_yaml::Value;
use vault_model::Document;
use vault_store::parse_frontmatter;

const PERSON_TAGS: &[&str] = &["person", "people"];
const PERSON_KEYS: &[&str] = &["name", "personId"];

/// Whether a people-directory candidate is a person page
///
/// True when the frontmatter carries a person signal, or when it fails to
/// parse (so the problem gets reported). Notes without frontmatter are not
/// person pages.
#[must_use]
pub fn is_person_document(document: &Document) -> bool {
    let fm = match parse_frontmatter(&document.content) {
        Ok(Some(fm)) => fm,
        Ok(None) => return false,
        Err(_) => return true,
    };

    let tagged = match fm.get("tags") {
        Some(Value::String(tag)) => PERSON_TAGS.contains(&tag.as_str()),
        Some(Value::Sequence(_)) => PERSON_TAGS.iter().any(|t| fm.has_tag(t)),
        _ => false,
    };
    tagged
        || PERSON_KEYS.iter().any(|k| fm.contains_key(k))
        || fm.get_path("reminders.listName").is_some()
}
