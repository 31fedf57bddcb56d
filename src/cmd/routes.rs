//! Route listing and static pages: `coderev routes`, `coderev privacy`.

use anyhow::Result;
use console::style;

use coderev::guard::{GuardKind, ROUTE_TABLE, Route};
use coderev::ui::{self, render_markdown};

/// The command that renders `route`, if one does.
pub fn command_for(route: &Route) -> Option<String> {
    let command = match route {
        Route::Home => return None,
        Route::Codes => "coderev browse".to_string(),
        Route::YourCode => "coderev mine".to_string(),
        Route::FullCode(slug) => format!("coderev show {}", slug),
        Route::FullPublicCode(slug) => format!("coderev show --public {}", slug),
        Route::SubmitCode => "coderev submit".to_string(),
        Route::CodeUpdate(slug) => format!("coderev edit {}", slug),
        Route::Profile => "coderev profile".to_string(),
        Route::ProfileUpdate => "coderev profile update".to_string(),
        Route::Feedback => "coderev feedback".to_string(),
        Route::Privacy => "coderev privacy".to_string(),
        Route::Login => "coderev login".to_string(),
        Route::Register => "coderev register".to_string(),
    };
    Some(command)
}

pub fn cmd_routes() -> Result<()> {
    println!();
    println!("Routes");
    println!("======");
    println!();
    for (pattern, guard, description) in ROUTE_TABLE {
        let guard_label = match guard {
            GuardKind::AuthRequired => style(guard.to_string()).yellow(),
            GuardKind::AuthRedirect => style(guard.to_string()).cyan(),
            GuardKind::Public => style(guard.to_string()).green(),
        };
        let command = Route::parse(&pattern.replace(":slug", "<slug>"))
            .and_then(|r| command_for(&r))
            .unwrap_or_default();
        println!(
            "  {:<26} {:<15} {:<26} {}",
            pattern,
            guard_label,
            description,
            style(command).dim()
        );
    }
    println!();
    Ok(())
}

const PRIVACY_POLICY: &str = "\
# Privacy Policy

Code Rev collects the information you give it: your name, email address, \
profile details, the code you submit, and the comments and ratings you write.

## How it is used

Submitted code is stored so that peers can review it and so that an AI review \
can be generated. Public submissions are visible to every user; private \
submissions are visible only to you.

## Your rights

You can update your profile with `coderev profile update`, delete any of your \
submissions with `coderev delete <slug>`, and remove your account entirely \
with `coderev profile delete`.

## Local data

This client keeps your session token and profile in `session.json` inside its \
configuration directory. `coderev logout` removes it.

## Contact

Questions about this policy can be sent with `coderev feedback`.
";

pub fn cmd_privacy() -> Result<()> {
    println!("{}", render_markdown(PRIVACY_POLICY, ui::term_width()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_resolves_to_a_route() {
        for (pattern, guard, _) in ROUTE_TABLE {
            let route = Route::parse(&pattern.replace(":slug", "x"))
                .unwrap_or_else(|| panic!("pattern {} does not parse", pattern));
            assert_eq!(route.guard(), *guard);
        }
    }

    #[test]
    fn test_command_for_detail_routes() {
        assert_eq!(
            command_for(&Route::FullPublicCode("abc".into())).as_deref(),
            Some("coderev show --public abc")
        );
        assert_eq!(command_for(&Route::Home), None);
    }
}
