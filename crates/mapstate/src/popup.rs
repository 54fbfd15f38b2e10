use geocoding::Place;
use serde::Serialize;

/// DOM id of the "Add" button inside a rendered popup.
pub const ADD_BUTTON_ID: &str = "customButton";

/// Context entries shown under a looked-up place: innermost region, then
/// locality, place and region. Index 1 (usually the postcode) is skipped.
pub const LOOKUP_CONTEXT_INDICES: [usize; 4] = [0, 2, 3, 4];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: String,
    pub body: String,
    pub add_button: bool,
}

impl Popup {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            add_button: true,
        }
    }

    /// Popup of a search-result marker: localized name over the full place name.
    pub fn for_search_result(place: &Place, lang: &str) -> Self {
        Self::new(place.localized_text(lang), place.place_name.clone())
    }

    /// Popup of a clicked point.
    pub fn for_lookup(title: impl Into<String>, place: &Place) -> Self {
        Self::new(title, lookup_summary(place))
    }

    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<h6 class=\"popup-title\">{}</h6><p class=\"popup-text text-muted\">{}</p>",
            escape_html(&self.title),
            escape_html(&self.body)
        );
        if self.add_button {
            html.push_str(&format!(
                "<button id=\"{ADD_BUTTON_ID}\" class=\"custom-button\">Add</button>"
            ));
        }
        html
    }
}

/// `context[0], context[2], context[3], context[4]` joined by `", "`.
/// Missing entries are skipped.
pub fn lookup_summary(place: &Place) -> String {
    LOOKUP_CONTEXT_INDICES
        .iter()
        .filter_map(|&i| place.context_text(i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
