use scraper::{Html, Selector};
use serde_json::{Map, Value};

/// Pick a featured image: explicit field, then first attachment, then the
/// first `<img>` in the content.
pub fn resolve_featured_image(
    explicit: Option<&str>,
    attachments: Option<&Map<String, Value>>,
    content: Option<&str>,
) -> Option<String> {
    explicit
        .filter(|url| !url.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| attachments.and_then(first_attachment_url))
        .or_else(|| content.and_then(first_img_src))
}

/// First attachment carrying a `URL`, in ascending attachment-id order.
pub fn first_attachment_url(attachments: &Map<String, Value>) -> Option<String> {
    let mut entries: Vec<(&String, &Value)> = attachments.iter().collect();
    // Attachment keys are numeric ids; non-numeric keys go last.
    entries.sort_by_key(|(key, _)| (key.parse::<u64>().unwrap_or(u64::MAX), key.as_str()));

    entries.into_iter().find_map(|(_, attachment)| {
        attachment
            .get("URL")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(ToOwned::to_owned)
    })
}

/// `src` of the first `<img>` tag in an HTML fragment.
pub fn first_img_src(html: &str) -> Option<String> {
    let selector = Selector::parse("img[src]").ok()?;
    let fragment = Html::parse_fragment(html);

    fragment
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| !src.is_empty())
        .map(ToOwned::to_owned)
}
