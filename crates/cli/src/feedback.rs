//! Operator feedback for unresolved fields.
//!
//! For every field a run left unresolved the operator may type a CSS
//! selector. The value it yields on the rendered root page is previewed and,
//! once confirmed, the selector is stored as an override for the domain and
//! the record is re-resolved from the evidence already gathered.

use anyhow::Context;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use ngoscope_core::{Extraction, OverrideStore, Pipeline};
use owo_colors::OwoColorize;

use crate::echo::{print_error, print_info, print_success, print_warning};

/// Ask for selectors for each unresolved field of `extraction`.
pub fn review(pipeline: &Pipeline, store: &dyn OverrideStore, extraction: Extraction) -> anyhow::Result<Extraction> {
    let unresolved = extraction.record.unresolved_fields();
    if unresolved.is_empty() {
        return Ok(extraction);
    }

    let Some(page) = extraction.main.clone() else {
        print_warning(&format!("{}: root page was not rendered, nothing to select from", extraction.record.website_url));
        return Ok(extraction);
    };
    let Some(domain) = page.url.host_str().map(str::to_string) else {
        print_warning(&format!("{}: local input has no domain to store overrides under", page.url));
        return Ok(extraction);
    };

    print_info(&format!("Reviewing {}", domain.bright_white()));
    let theme = ColorfulTheme::default();
    let mut overrides = store.lookup(&domain).with_context(|| format!("Failed to read overrides for {}", domain))?;
    let mut changed = false;

    for field in unresolved {
        if extraction.context.is_interactive(field) {
            print_info(&format!("{} sits behind a region selector on the site", field.key()));
        }

        loop {
            let selector: String = Input::with_theme(&theme)
                .with_prompt(format!("Selector for {} (empty to skip)", field.key()))
                .allow_empty(true)
                .interact_text()?;
            let selector = selector.trim();
            if selector.is_empty() {
                break;
            }

            match pipeline.preview_selector(&page, field, selector) {
                Ok(Some(value)) => {
                    let accept =
                        Confirm::with_theme(&theme).with_prompt(format!("Use \"{}\"?", value)).default(true).interact()?;
                    if accept {
                        store
                            .save(&domain, field, selector)
                            .with_context(|| format!("Failed to save override for {}", domain))?;
                        overrides.set(field, selector);
                        changed = true;
                        print_success(&format!("Saved {} for {}", field.key(), domain));
                        break;
                    }
                }
                Ok(None) => print_warning("Selector yields no usable value on this page"),
                Err(e) => print_error(&e.to_string()),
            }
        }
    }

    Ok(if changed { pipeline.reresolve(extraction, &overrides) } else { extraction })
}
