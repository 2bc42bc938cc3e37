//! Form counting and login-form detection

use crate::analyzer::document::{exists_within, Document, Query};
use scraper::ElementRef;

/// Form attribute keywords that suggest a login form (matched case-insensitively)
const LOGIN_KEYWORDS: [&str; 5] = ["login", "signin", "sign-in", "auth", "authenticate"];

/// Input `name` fragments that suggest a credential field (matched case-sensitively)
const USER_FIELD_FRAGMENTS: [&str; 3] = ["user", "login", "email"];

/// Form statistics for one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormSummary {
    pub form_count: usize,
    pub has_login_form: bool,
}

/// Counts forms and flags whether any of them looks like a login form
pub fn analyze_forms(document: &Document) -> FormSummary {
    let forms = document.find_all(&Query::tag("form"));

    FormSummary {
        form_count: forms.len(),
        has_login_form: forms.iter().any(|form| is_login_form(*form)),
    }
}

/// Login-form heuristic for a single form
///
/// A form is a login form when it has a password input and at least one
/// other signal:
///
/// - an `input[type=email]`
/// - an input whose `name` contains `user`, `login` or `email`
/// - a login keyword in the form's `action`, `class` or `id`
pub fn is_login_form(form: ElementRef<'_>) -> bool {
    let has_password = exists_within(form, &Query::tag("input").attr_eq("type", "password"));
    if !has_password {
        return false;
    }

    let has_email = exists_within(form, &Query::tag("input").attr_eq("type", "email"));
    let has_user_field = USER_FIELD_FRAGMENTS
        .iter()
        .any(|fragment| exists_within(form, &Query::tag("input").attr_contains("name", fragment)));

    has_email || has_user_field || has_login_keyword(form)
}

fn has_login_keyword(form: ElementRef<'_>) -> bool {
    let element = form.value();
    ["action", "class", "id"]
        .iter()
        .filter_map(|attr| element.attr(attr))
        .map(str::to_lowercase)
        .any(|value| LOGIN_KEYWORDS.iter().any(|keyword| value.contains(keyword)))
}
