//! Markdown templates for appended location facts.

/// Sentence placed between the model's answer and the location list.
pub const LOCATIONS_INTRO: &str = "Here are some relevant locations in the Bay Area:";

/// Closing line pointing readers at the map.
pub const LOCATIONS_OUTRO: &str =
    "You can find these and more locations on our interactive map page!";

/// One record. Optional contact lines are appended separately.
pub const LOCATION_BLOCK: &str = "- **{name}** in {city}
  - Address: {address}
  - Type: {type}";

pub const PHONE_LINE: &str = "\n  - Phone: {phone}";

pub const WEBSITE_LINE: &str = "\n  - Website: {website}";

/// Simple template interpolation.
///
/// Replaces `{key}` with the corresponding value in a single left-to-right
/// pass; substituted values are never scanned again. Unknown placeholders are
/// left as written.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (close, *value))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
