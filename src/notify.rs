//! Rendering of new postings for the terminal.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use posting_listener::source::Posting;

const TEMPLATE_NAME: &str = "notification";

/// Template data for rendering one posting.
#[derive(Serialize)]
struct NotificationData<'a> {
    owner: &'a str,
    id: &'a str,
    title: &'a str,
    price: &'a str,
    link: &'a str,
    published: String,
}

impl<'a> NotificationData<'a> {
    fn new(owner: &'a str, posting: &'a Posting) -> Self {
        Self {
            owner,
            id: &posting.id,
            title: &posting.title,
            price: &posting.price,
            link: &posting.link,
            published: posting.published_display(),
        }
    }
}

/// Renders postings with a precompiled Handlebars template.
///
/// Output is plain text, so HTML escaping is disabled.
pub struct Notifier {
    registry: Handlebars<'static>,
}

impl Notifier {
    /// Compiles `template`.
    ///
    /// # Errors
    ///
    /// Returns the template error if `template` does not compile.
    pub fn new(template: &str) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(TEMPLATE_NAME, template)?;
        Ok(Self { registry })
    }

    /// Renders one posting found for `owner`.
    ///
    /// # Errors
    ///
    /// Returns the render error if a helper fails.
    pub fn render(&self, owner: &str, posting: &Posting) -> Result<String, RenderError> {
        self.registry
            .render(TEMPLATE_NAME, &NotificationData::new(owner, posting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use posting_listener::config::defaults;

    fn posting() -> Posting {
        let published = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(14, 5, 0))
            .unwrap();
        Posting::new("7712345678")
            .with_title("2016 Acura MDX & tech pkg")
            .with_price("$18,500")
            .with_link("https://sfbay.craigslist.org/sby/cto/d/acura-mdx/7712345678.html")
            .with_published_at(published)
    }

    #[test]
    fn default_template_lists_every_field() {
        let notifier = Notifier::new(defaults::TEMPLATE).unwrap();

        let text = notifier.render("default", &posting()).unwrap();

        assert_eq!(
            text,
            "Title: 2016 Acura MDX & tech pkg\n\
             Price: $18,500\n\
             Link: https://sfbay.craigslist.org/sby/cto/d/acura-mdx/7712345678.html\n\
             Date: 2024-03-09 14:05\n"
        );
    }

    #[test]
    fn custom_template_sees_owner_and_id() {
        let notifier = Notifier::new("{{owner}}:{{id}}").unwrap();

        assert_eq!(notifier.render("alice", &posting()).unwrap(), "alice:7712345678");
    }

    #[test]
    fn missing_fields_render_as_unknown() {
        let notifier = Notifier::new("{{price}} / {{published}}").unwrap();

        let text = notifier.render("bob", &Posting::new("1")).unwrap();

        assert_eq!(text, "unknown / unknown");
    }

    #[test]
    fn broken_template_is_rejected() {
        assert!(Notifier::new("{{#each}}").is_err());
    }
}
